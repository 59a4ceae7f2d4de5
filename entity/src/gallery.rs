use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Gallery images, the binary lives in the upload directory.

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gallery_images")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// generated file name on disk
    pub filename: String,

    /// name supplied by the uploader
    pub original_name: String,

    /// public path, `/uploads/gallery/<filename>`
    pub path: String,

    pub category: String,

    pub uploaded_by: String,

    pub upload_date: i64,

    pub is_active: bool,

    pub views: i32,

    pub likes: i32,

    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    /// data create time
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
