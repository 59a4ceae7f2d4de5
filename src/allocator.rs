//! Sequential human readable identifiers backed by the `sequences` table.

use crate::Result;
use entity::sequence;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    Set,
};

/// Sequence used for community member ids.
pub const MEMBER_SEQUENCE: &str = "member";
pub const MEMBER_PREFIX: &str = "SC";

/// `SC` + zero padded 4 digit number.
pub fn format_id(prefix: &str, value: i64) -> String {
    format!("{}{:04}", prefix, value)
}

/// Increment the named sequence and return the new value.
///
/// The increment is a single `UPDATE value = value + 1`, so concurrent
/// callers never observe the same value. Run it inside the transaction that
/// inserts the record to keep the read consistent with the write.
pub async fn next_value<C: ConnectionTrait>(conn: &C, name: &str) -> Result<i64> {
    let res = sequence::Entity::update_many()
        .col_expr(
            sequence::Column::Value,
            Expr::col(sequence::Column::Value).add(1),
        )
        .filter(sequence::Column::Name.eq(name))
        .exec(conn)
        .await?;

    if res.rows_affected == 0 {
        // unseeded sequence, the member one is created by its migration
        let model = sequence::ActiveModel {
            name: Set(name.to_owned()),
            value: Set(1),
        }
        .insert(conn)
        .await?;
        return Ok(model.value);
    }

    let model = sequence::Entity::find_by_id(name.to_owned())
        .one(conn)
        .await?
        .ok_or(crate::Error::Str("sequence disappeared"))?;
    Ok(model.value)
}

/// Next community member id, `SC0001` on an empty store.
pub async fn next_member_id<C: ConnectionTrait>(conn: &C) -> Result<String> {
    let value = next_value(conn, MEMBER_SEQUENCE).await?;
    Ok(format_id(MEMBER_PREFIX, value))
}
