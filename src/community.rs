use crate::{
    api,
    auth::AdminUser,
    form::{JoinForm, StatusForm},
    record::{Lifecycle, ListQuery},
    AppState, Error,
};
use actix_web::{delete, get, patch, post, web, Responder, Scope};
use entity::member;
use serde_json::json;
use std::collections::HashMap;

const PAGE_SIZE: u64 = 10;

pub fn scope() -> Scope {
    web::scope("/community")
        .service(join)
        .service(members)
        .service(fetch)
        .service(set_status)
        .service(remove)
        .service(stats)
        .service(check_status)
}

#[post("/join")]
pub async fn join(
    state: web::Data<AppState>,
    data: web::Json<JoinForm>,
) -> Result<impl Responder, Error> {
    let request = data.into_inner().into_join()?;
    let member = state.service.join(request).await?;
    Ok(api::created(
        "Community join request submitted successfully",
        json!({
            "id": member.id,
            "memberId": member.member_id,
            "status": member.status,
            "joinDate": member.join_date,
        }),
    ))
}

/// `?status=&religion=&page=&limit=`
#[get("/members")]
pub async fn members(
    state: web::Data<AppState>,
    _user: AdminUser,
    query: web::Query<HashMap<String, String>>,
) -> Result<impl Responder, Error> {
    let query = ListQuery::from_params(query.into_inner(), PAGE_SIZE);
    Ok(api::list(state.service.members(&query).await?))
}

#[get("/members/{id}")]
pub async fn fetch(
    state: web::Data<AppState>,
    _user: AdminUser,
    id: web::Path<i32>,
) -> Result<impl Responder, Error> {
    Ok(api::data(state.service.member(*id).await?))
}

#[patch("/members/{id}/status")]
pub async fn set_status(
    state: web::Data<AppState>,
    _user: AdminUser,
    id: web::Path<i32>,
    data: web::Json<StatusForm>,
) -> Result<impl Responder, Error> {
    let StatusForm { status, notes } = data.into_inner();
    let status = member::Status::parse(status.as_deref())?;
    let member = state.service.set_member_status(*id, status, notes).await?;
    Ok(api::updated("Member status updated successfully", member))
}

#[delete("/members/{id}")]
pub async fn remove(
    state: web::Data<AppState>,
    _user: AdminUser,
    id: web::Path<i32>,
) -> Result<impl Responder, Error> {
    state.service.delete_member(*id).await?;
    Ok(api::done("Member deleted successfully"))
}

#[get("/stats/overview")]
pub async fn stats(state: web::Data<AppState>) -> Result<impl Responder, Error> {
    Ok(api::data(state.service.member_stats().await?))
}

#[get("/check-status/{email}")]
pub async fn check_status(
    state: web::Data<AppState>,
    email: web::Path<String>,
) -> Result<impl Responder, Error> {
    let member = state.service.member_by_email(&email).await?;
    Ok(api::data(json!({
        "memberId": member.member_id,
        "status": member.status,
        "joinDate": member.join_date,
        "approvedDate": member.approved_date,
    })))
}
