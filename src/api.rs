//! http api

use crate::{
    auth::{AdminUser, AuthError, JwtToken, Role},
    community, donation, event,
    form::LoginForm,
    gallery, prashad,
    record::Page,
    AppState, Error, Result,
};
use actix_web::{get, post, web, HttpResponse, Responder, Scope};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

pub const CARGO_PKG_VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

fn version() -> String {
    CARGO_PKG_VERSION.map(ToOwned::to_owned).unwrap_or_default()
}

pub fn scope() -> Scope {
    web::scope("/api")
        .service(info)
        .service(login)
        .service(me)
        .service(donation::scope())
        .service(event::scope())
        .service(community::scope())
        .service(prashad::scope())
        .service(gallery::scope())
}

/// `{success, data, pagination}`
pub fn list<T: Serialize>(page: Page<T>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "data": page.items,
        "pagination": {
            "current": page.page,
            "pages": page.pages,
            "total": page.total,
        }
    }))
}

/// `{success, data}`
pub fn data<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "data": data,
    }))
}

/// `{success, message, data}` with 201
pub fn created<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Created().json(json!({
        "success": true,
        "message": message,
        "data": data,
    }))
}

/// `{success, message, data}`
pub fn updated<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
        "data": data,
    }))
}

/// `{success, message}`
pub fn done(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
    }))
}

#[get("/info")]
pub async fn info() -> Result<impl Responder, Error> {
    Ok(web::Json(json!({
        "success": true,
        "data": {
            "name": "mandir",
            "version": version(),
        }
    })))
}

#[post("/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    data: web::Json<LoginForm>,
) -> Result<impl Responder, Error> {
    let auth = &state.setting.auth;
    let password = auth
        .admin_password
        .as_deref()
        .ok_or(AuthError::Invalid("admin login is disabled"))?;
    if data.username != auth.admin_username || data.password != password {
        warn!(username = data.username.as_str(), "failed admin login");
        return Err(AuthError::Invalid("Invalid username or password").into());
    }
    let token = JwtToken::generate(
        &auth.admin_username,
        Role::Admin,
        auth.access_token_expiry,
        auth.secret.as_bytes(),
    )?;
    Ok(web::Json(json!({
        "success": true,
        "message": "Login successful",
        "data": {
            "token": token,
            "user": {
                "username": auth.admin_username,
                "role": Role::Admin,
            }
        }
    })))
}

#[get("/auth/me")]
pub async fn me(user: AdminUser) -> Result<impl Responder, Error> {
    Ok(data(json!({
        "username": user.username,
        "role": Role::Admin,
    })))
}
