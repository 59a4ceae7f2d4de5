use crate::{
    api,
    auth::AdminUser,
    form::{BookingForm, StatusForm},
    record::{Lifecycle, ListQuery},
    AppState, Error,
};
use actix_web::{delete, get, patch, post, web, Responder, Scope};
use entity::prashad;
use std::collections::HashMap;

const PAGE_SIZE: u64 = 10;

pub fn scope() -> Scope {
    web::scope("/prashad")
        .service(create)
        .service(list)
        .service(stats)
        .service(fetch)
        .service(set_status)
        .service(remove)
}

#[post("")]
pub async fn create(
    state: web::Data<AppState>,
    data: web::Json<BookingForm>,
) -> Result<impl Responder, Error> {
    let booking = data.into_inner().into_booking()?;
    let message = format!("{} booking created successfully", booking.label());
    let booking = state.service.create_booking(booking).await?;
    Ok(api::created(&message, booking))
}

/// `?type=&status=&page=&limit=`
#[get("")]
pub async fn list(
    state: web::Data<AppState>,
    _user: AdminUser,
    query: web::Query<HashMap<String, String>>,
) -> Result<impl Responder, Error> {
    let query = ListQuery::from_params(query.into_inner(), PAGE_SIZE);
    Ok(api::list(state.service.bookings(&query).await?))
}

#[get("/stats/overview")]
pub async fn stats(state: web::Data<AppState>) -> Result<impl Responder, Error> {
    Ok(api::data(state.service.booking_stats().await?))
}

#[get("/{id}")]
pub async fn fetch(
    state: web::Data<AppState>,
    _user: AdminUser,
    id: web::Path<i32>,
) -> Result<impl Responder, Error> {
    Ok(api::data(state.service.booking(*id).await?))
}

/// A `deliveryDate` in the body is ignored, it is stamped on delivery.
#[patch("/{id}/status")]
pub async fn set_status(
    state: web::Data<AppState>,
    _user: AdminUser,
    id: web::Path<i32>,
    data: web::Json<StatusForm>,
) -> Result<impl Responder, Error> {
    let StatusForm { status, notes } = data.into_inner();
    let status = prashad::Status::parse(status.as_deref())?;
    let booking = state.service.set_booking_status(*id, status, notes).await?;
    Ok(api::updated("Booking status updated successfully", booking))
}

#[delete("/{id}")]
pub async fn remove(
    state: web::Data<AppState>,
    _user: AdminUser,
    id: web::Path<i32>,
) -> Result<impl Responder, Error> {
    state.service.delete_booking(*id).await?;
    Ok(api::done("Booking deleted successfully"))
}
