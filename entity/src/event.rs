use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Temple events

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// event day, unix seconds
    pub date: i64,

    pub time: Option<String>,

    pub location: Option<String>,

    #[sea_orm(column_type = "Double")]
    pub price: f64,

    pub capacity: i32,

    /// image url or upload path
    pub image: Option<String>,

    /// data create time
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
