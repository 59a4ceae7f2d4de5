//! Record lifecycle and query engine shared by every record kind.
//!
//! Each kind is described by a [`Schema`] (see [`crate::kinds`]); the
//! functions here implement fetch, delete, status transitions, paginated
//! listing and aggregation once for all of them.

use crate::{now, Error, Result};
use chrono::{DateTime, Datelike};
use sea_orm::{
    sea_query::{Alias, Expr},
    ActiveEnum, ColumnTrait, Condition, ConnectionTrait, DbBackend, DbConn, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Value,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Largest page a listing returns.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Buckets of the monthly histogram.
pub const MONTHS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Asc,
    Desc,
}

/// Declarative description of one record kind.
pub struct Schema<E: EntityTrait> {
    /// name used in messages, `Member not found`
    pub label: &'static str,
    pub id: E::Column,
    pub status: Option<E::Column>,
    /// date stamped when a transition enters a milestone status
    pub milestone: Option<E::Column>,
    pub notes: Option<E::Column>,
    pub updated_at: Option<E::Column>,
    /// timestamp the monthly histogram groups by
    pub timeline: E::Column,
    /// default listing order, must end with a unique column
    pub order: &'static [(E::Column, Sort)],
    /// query keys accepted as equality filters
    pub filters: &'static [(&'static str, E::Column)],
}

/// Status enum of a record kind.
pub trait Lifecycle: ActiveEnum<Value = String> + Clone + PartialEq {
    /// Whether `self -> next` is one of the enumerated moves.
    fn can_become(&self, next: &Self) -> bool;

    /// Entering this status stamps the milestone date.
    fn is_milestone(&self) -> bool;

    fn parse(raw: Option<&str>) -> Result<Self> {
        raw.and_then(|s| Self::try_from_value(&s.to_owned()).ok())
            .ok_or_else(|| Error::Validation("Valid status is required".to_owned()))
    }
}

/// Fails with the list of empty fields.
pub fn require(fields: &[(&'static str, Option<&str>)]) -> Result<()> {
    let missing = fields
        .iter()
        .filter(|(_, v)| v.map_or(true, |s| s.trim().is_empty()))
        .map(|(k, _)| *k)
        .collect::<Vec<_>>();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

pub async fn find<E: EntityTrait>(db: &DbConn, schema: &Schema<E>, id: i32) -> Result<E::Model> {
    E::find()
        .filter(schema.id.eq(id))
        .one(db)
        .await?
        .ok_or(Error::NotFound(schema.label))
}

pub async fn delete<E: EntityTrait>(db: &DbConn, schema: &Schema<E>, id: i32) -> Result<()> {
    let res = E::delete_many().filter(schema.id.eq(id)).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(Error::NotFound(schema.label));
    }
    Ok(())
}

fn status_of<E: EntityTrait, S: Lifecycle>(model: &E::Model, col: E::Column) -> Result<S> {
    match model.get(col) {
        Value::String(Some(raw)) => Ok(S::try_from_value(&*raw)?),
        _ => Err(Error::Str("status column is not a string")),
    }
}

/// Move a record to `next`, stamping the milestone date on entry.
///
/// The update only applies if the status is still the one read before, so a
/// concurrent transition makes this call fail instead of skipping a step.
pub async fn transition<E, S>(
    db: &DbConn,
    schema: &Schema<E>,
    id: i32,
    next: S,
    notes: Option<String>,
) -> Result<E::Model>
where
    E: EntityTrait,
    S: Lifecycle,
{
    let status_col = schema
        .status
        .ok_or(Error::Str("record kind has no status"))?;
    let model = find(db, schema, id).await?;
    let current: S = status_of::<E, S>(&model, status_col)?;
    let changed = current != next;
    if changed && !current.can_become(&next) {
        return Err(Error::InvalidTransition(format!(
            "Cannot change status from {} to {}",
            current.to_value(),
            next.to_value()
        )));
    }

    let time = now() as i64;
    let mut update = E::update_many()
        .col_expr(status_col, Expr::value(next.to_value()))
        .filter(schema.id.eq(id))
        .filter(status_col.eq(current.to_value()));
    if let Some(col) = schema.milestone.filter(|_| changed && next.is_milestone()) {
        update = update.col_expr(col, Expr::value(time));
    }
    if let (Some(col), Some(notes)) = (schema.notes, notes.filter(|n| !n.trim().is_empty())) {
        update = update.col_expr(col, Expr::value(notes));
    }
    if let Some(col) = schema.updated_at {
        update = update.col_expr(col, Expr::value(time));
    }

    let res = update.exec(db).await?;
    if res.rows_affected != 1 {
        return Err(Error::InvalidTransition(format!(
            "{} status was changed by another request",
            schema.label
        )));
    }
    find(db, schema, id).await
}

/// Page and filters parsed from listing query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-indexed
    pub page: u64,
    pub limit: u64,
    pub params: HashMap<String, String>,
}

impl ListQuery {
    pub fn from_params(mut params: HashMap<String, String>, default_limit: u64) -> Self {
        let page = params
            .remove("page")
            .and_then(|p| p.parse::<u64>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);
        let limit = params
            .remove("limit")
            .and_then(|l| l.parse::<u64>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(default_limit)
            .min(MAX_PAGE_SIZE);
        Self {
            page,
            limit,
            params,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Equality filters on the whitelisted keys, the rest are ignored.
    pub fn condition<E: EntityTrait>(&self, schema: &Schema<E>) -> Condition {
        schema
            .filters
            .iter()
            .fold(Condition::all(), |cond, (key, col)| match self.get(key) {
                Some(value) => cond.add(col.eq(value.to_owned())),
                None => cond,
            })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub pages: u64,
    pub total: u64,
}

/// One page of a kind in its default order.
pub async fn list<E>(
    db: &DbConn,
    schema: &Schema<E>,
    query: &ListQuery,
    extra: Condition,
) -> Result<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Sync,
{
    let mut select = E::find().filter(query.condition(schema)).filter(extra);
    for (col, sort) in schema.order {
        select = match sort {
            Sort::Asc => select.order_by_asc(*col),
            Sort::Desc => select.order_by_desc(*col),
        };
    }

    let paginator = select.paginate(db, query.limit);
    let counts = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(query.page - 1).await?;
    Ok(Page {
        items,
        page: query.page,
        pages: counts.number_of_pages,
        total: counts.number_of_items,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    #[serde(rename = "_id")]
    pub id: Month,
    pub count: i64,
}

/// Count of the group `key`, 0 if absent.
pub fn count_of(buckets: &[Bucket], key: &str) -> i64 {
    buckets
        .iter()
        .find(|b| b.id == key)
        .map(|b| b.count)
        .unwrap_or_default()
}

pub async fn count<E: EntityTrait>(db: &DbConn, cond: Condition) -> Result<u64>
where
    E::Model: Sync,
{
    Ok(E::find().filter(cond).count(db).await?)
}

/// Record counts per value of `col`, largest first.
pub async fn group_count<E: EntityTrait>(db: &DbConn, col: E::Column) -> Result<Vec<Bucket>> {
    let rows: Vec<(String, i64)> = E::find()
        .select_only()
        .column(col)
        .column_as(col.count(), "count")
        .group_by(col)
        .into_tuple()
        .all(db)
        .await?;
    let mut buckets = rows
        .into_iter()
        .map(|(id, count)| Bucket { id, count })
        .collect::<Vec<_>>();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.id.cmp(&b.id)));
    Ok(buckets)
}

/// Group unix timestamps by (year, month), most recent first.
pub fn bucket_months(timestamps: impl IntoIterator<Item = i64>) -> Vec<MonthBucket> {
    let mut months = BTreeMap::<Month, i64>::new();
    for ts in timestamps {
        if let Some(time) = DateTime::from_timestamp(ts, 0) {
            let key = Month {
                year: time.year(),
                month: time.month(),
            };
            *months.entry(key).or_default() += 1;
        }
    }
    months
        .into_iter()
        .rev()
        .take(MONTHS)
        .map(|(id, count)| MonthBucket { id, count })
        .collect()
}

/// Monthly histogram over the kind's timeline column.
pub async fn monthly<E: EntityTrait>(db: &DbConn, schema: &Schema<E>) -> Result<Vec<MonthBucket>> {
    let timestamps: Vec<i64> = E::find()
        .select_only()
        .column(schema.timeline)
        .into_tuple()
        .all(db)
        .await?;
    Ok(bucket_months(timestamps))
}

// SUM of integers is DECIMAL on MySQL and NUMERIC for bigint on Postgres
fn sum_int_select<E: EntityTrait>(backend: DbBackend, col: E::Column) -> Select<E> {
    let int = match backend {
        DbBackend::MySql => "SIGNED",
        _ => "BIGINT",
    };
    E::find()
        .select_only()
        .column_as(Expr::expr(col.sum()).cast_as(Alias::new(int)), "total")
}

/// Sum of an integer column, 0 on an empty set.
pub async fn sum_i64<E: EntityTrait>(db: &DbConn, col: E::Column) -> Result<i64> {
    let total: Option<Option<i64>> = sum_int_select::<E>(db.get_database_backend(), col)
        .into_tuple()
        .one(db)
        .await?;
    Ok(total.flatten().unwrap_or_default())
}

/// Sum of a floating point column, 0 on an empty set.
pub async fn sum_f64<E: EntityTrait>(db: &DbConn, col: E::Column) -> Result<f64> {
    let total: Option<Option<f64>> = E::find()
        .select_only()
        .column_as(col.sum(), "total")
        .into_tuple()
        .one(db)
        .await?;
    Ok(total.flatten().unwrap_or_default())
}
