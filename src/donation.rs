use crate::{
    api,
    auth::AdminUser,
    form::DonationForm,
    record::ListQuery,
    AppState, Error,
};
use actix_web::{delete, get, post, web, Responder, Scope};
use serde_json::json;
use std::collections::HashMap;

const PAGE_SIZE: u64 = 10;

pub fn scope() -> Scope {
    web::scope("/donations")
        .service(create)
        .service(list)
        .service(total)
        .service(fetch)
        .service(remove)
}

#[post("")]
pub async fn create(
    state: web::Data<AppState>,
    data: web::Json<DonationForm>,
) -> Result<impl Responder, Error> {
    let donation = state.service.create_donation(data.into_inner()).await?;
    Ok(api::created("Donation recorded successfully", donation))
}

#[get("")]
pub async fn list(
    state: web::Data<AppState>,
    _user: AdminUser,
    query: web::Query<HashMap<String, String>>,
) -> Result<impl Responder, Error> {
    let query = ListQuery::from_params(query.into_inner(), PAGE_SIZE);
    Ok(api::list(state.service.donations(&query).await?))
}

/// totals are public, listings are not
#[get("/stats/total")]
pub async fn total(state: web::Data<AppState>) -> Result<impl Responder, Error> {
    let stats = state.service.donation_stats().await?;
    Ok(web::Json(json!({
        "success": true,
        "totalAmount": stats.total_amount,
        "data": stats,
    })))
}

#[get("/{id}")]
pub async fn fetch(
    state: web::Data<AppState>,
    _user: AdminUser,
    id: web::Path<i32>,
) -> Result<impl Responder, Error> {
    Ok(api::data(state.service.donation(*id).await?))
}

#[delete("/{id}")]
pub async fn remove(
    state: web::Data<AppState>,
    _user: AdminUser,
    id: web::Path<i32>,
) -> Result<impl Responder, Error> {
    state.service.delete_donation(*id).await?;
    Ok(api::done("Donation removed"))
}
