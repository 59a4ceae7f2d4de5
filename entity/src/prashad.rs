use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(EnumIter, DeriveActiveEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "lowercase")]
pub enum Type {
    #[sea_orm(string_value = "mahaprasad")]
    Mahaprasad,
    #[sea_orm(string_value = "prashad")]
    Prashad,
}

#[derive(EnumIter, DeriveActiveEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Prashad and mahaprasad bookings

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prashad_bookings")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub r#type: Type,

    pub name: String,

    pub phone: String,

    /// mahaprasad only
    pub father_name: Option<String>,

    /// prashad delivery address
    pub village: Option<String>,
    pub pincode: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub address: Option<String>,

    pub amount: i64,

    pub status: Status,

    pub booking_date: i64,

    /// set when the booking is delivered
    pub delivery_date: Option<i64>,

    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    /// data create time
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
