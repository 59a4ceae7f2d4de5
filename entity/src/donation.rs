use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// donations

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "donations")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub email: Option<String>,

    pub phone: Option<String>,

    #[sea_orm(column_type = "Double")]
    pub amount: f64,

    pub purpose: String,

    pub payment_method: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,

    /// donor reference
    pub user_id: Option<String>,

    /// donation time
    pub timestamp: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
