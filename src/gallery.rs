use crate::{
    api,
    asset::UploadForm,
    auth::AdminUser,
    form::{ImagePatch, Like, LikeForm},
    record::ListQuery,
    AppState, Error,
};
use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, web, Responder, Scope};
use serde_json::json;
use std::collections::HashMap;

const PAGE_SIZE: u64 = 20;

pub fn scope() -> Scope {
    web::scope("/gallery")
        .service(upload)
        .service(bulk_upload)
        .service(list)
        .service(stats)
        .service(fetch)
        .service(update)
        .service(like)
        .service(remove)
}

fn category(form: &UploadForm) -> &str {
    form.text("category").unwrap_or("temple")
}

fn uploaded_by(form: &UploadForm) -> &str {
    form.text("uploadedBy").unwrap_or("admin")
}

/// multipart with one `image` and optional `category`, `uploadedBy`
#[post("/upload")]
pub async fn upload(
    state: web::Data<AppState>,
    _user: AdminUser,
    payload: Multipart,
) -> Result<impl Responder, Error> {
    let form = state
        .service
        .assets()
        .read_form(payload, &["image"], 1)
        .await?;
    if form.files.is_empty() {
        return Err(Error::Validation("No image file provided".to_owned()));
    }
    let mut images = state
        .service
        .add_images(&form.files, category(&form), uploaded_by(&form))
        .await?;
    Ok(api::created("Image uploaded successfully", images.pop()))
}

/// multipart with up to `upload.max_files` files in `images`
#[post("/bulk-upload")]
pub async fn bulk_upload(
    state: web::Data<AppState>,
    _user: AdminUser,
    payload: Multipart,
) -> Result<impl Responder, Error> {
    let assets = state.service.assets();
    let form = assets
        .read_form(payload, &["images", "images[]"], assets.max_files())
        .await?;
    if form.files.is_empty() {
        return Err(Error::Validation("No image files provided".to_owned()));
    }
    let images = state
        .service
        .add_images(&form.files, category(&form), uploaded_by(&form))
        .await?;
    let message = format!("{} images uploaded successfully", images.len());
    Ok(api::created(&message, images))
}

/// `?category=&active=true|false&page=&limit=`
#[get("")]
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> Result<impl Responder, Error> {
    let query = ListQuery::from_params(query.into_inner(), PAGE_SIZE);
    Ok(api::list(state.service.images(&query).await?))
}

#[get("/stats/overview")]
pub async fn stats(state: web::Data<AppState>) -> Result<impl Responder, Error> {
    Ok(api::data(state.service.gallery_stats().await?))
}

#[get("/{id}")]
pub async fn fetch(
    state: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<impl Responder, Error> {
    Ok(api::data(state.service.view_image(*id).await?))
}

#[patch("/{id}")]
pub async fn update(
    state: web::Data<AppState>,
    _user: AdminUser,
    id: web::Path<i32>,
    data: web::Json<ImagePatch>,
) -> Result<impl Responder, Error> {
    let image = state.service.update_image(*id, data.into_inner()).await?;
    Ok(api::updated("Image updated successfully", image))
}

/// `{"action": "like" | "unlike"}`
#[post("/{id}/like")]
pub async fn like(
    state: web::Data<AppState>,
    id: web::Path<i32>,
    data: web::Json<LikeForm>,
) -> Result<impl Responder, Error> {
    let action = data.action()?;
    let likes = state.service.like_image(*id, action).await?;
    let message = match action {
        Like::Like => "Image liked successfully",
        Like::Unlike => "Image unliked successfully",
    };
    Ok(api::updated(message, json!({ "likes": likes })))
}

#[delete("/{id}")]
pub async fn remove(
    state: web::Data<AppState>,
    _user: AdminUser,
    id: web::Path<i32>,
) -> Result<impl Responder, Error> {
    state.service.delete_image(*id).await?;
    Ok(api::done("Image deleted successfully"))
}
