use crate::{
    api,
    asset::UploadForm,
    auth::AdminUser,
    form::EventForm,
    record::ListQuery,
    AppState, Error,
};
use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, Responder, Scope};
use serde_json::json;
use std::collections::HashMap;

const PAGE_SIZE: u64 = 10;

pub fn scope() -> Scope {
    web::scope("/events")
        .service(list)
        .service(create)
        .service(upload_image)
        .service(fetch)
        .service(update)
        .service(remove)
}

/// `?filter=upcoming|past|all`
#[get("")]
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> Result<impl Responder, Error> {
    let query = ListQuery::from_params(query.into_inner(), PAGE_SIZE);
    Ok(api::list(state.service.events(&query).await?))
}

#[post("")]
pub async fn create(
    state: web::Data<AppState>,
    _user: AdminUser,
    data: web::Json<EventForm>,
) -> Result<impl Responder, Error> {
    let event = state.service.create_event(data.into_inner()).await?;
    Ok(api::created("Event created successfully", event))
}

#[post("/upload-image")]
pub async fn upload_image(
    state: web::Data<AppState>,
    _user: AdminUser,
    payload: Multipart,
) -> Result<impl Responder, Error> {
    let UploadForm { files, .. } = state
        .service
        .assets()
        .read_form(payload, &["image"], 1)
        .await?;
    let file = files
        .first()
        .ok_or_else(|| Error::Validation("No image file provided".to_owned()))?;
    let stored = state.service.upload_event_image(file).await?;
    Ok(api::updated(
        "Image uploaded successfully",
        json!({
            "imageUrl": stored.path,
            "filename": stored.filename,
        }),
    ))
}

#[get("/{id}")]
pub async fn fetch(
    state: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<impl Responder, Error> {
    Ok(api::data(state.service.event(*id).await?))
}

#[put("/{id}")]
pub async fn update(
    state: web::Data<AppState>,
    _user: AdminUser,
    id: web::Path<i32>,
    data: web::Json<EventForm>,
) -> Result<impl Responder, Error> {
    let event = state.service.update_event(*id, data.into_inner()).await?;
    Ok(api::updated("Event updated successfully", event))
}

#[delete("/{id}")]
pub async fn remove(
    state: web::Data<AppState>,
    _user: AdminUser,
    id: web::Path<i32>,
) -> Result<impl Responder, Error> {
    state.service.delete_event(*id).await?;
    Ok(api::done("Event removed"))
}
