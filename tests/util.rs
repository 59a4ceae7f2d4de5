#![allow(unused)]

use actix_http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Method, Request, StatusCode,
};
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    test::{call_service, read_body, TestRequest},
};
use anyhow::Result;
use mandir::{setting::Setting, AppState};
use migration::{Migrator, MigratorTrait};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const BOUNDARY: &str = "----mandir-test-boundary";

/// State on an in-memory store, uploads go to the returned temp dir.
pub async fn create_test_state() -> Result<(AppState, TempDir)> {
    create_test_state_with(|setting| {
        setting.auth.admin_password = Some("password".to_owned());
    })
    .await
}

/// Like `create_test_state`, starting from the default setting.
pub async fn create_test_state_with<F: FnOnce(&mut Setting)>(
    f: F,
) -> Result<(AppState, TempDir)> {
    let dir = tempfile::tempdir()?;
    let mut setting = Setting::default();
    setting.db_url = "sqlite::memory:".to_owned();
    setting.db_max_connections = Some(1);
    setting.upload.dir = dir.path().to_path_buf();
    f(&mut setting);
    let state = AppState::from_setting(setting).await?;
    Migrator::up(state.service.db(), None).await?;
    Ok((state, dir))
}

pub async fn call<S, B>(app: &S, req: TestRequest) -> Result<(Value, StatusCode)>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = call_service(app, req.to_request()).await;
    let status = res.status();
    let body = read_body(res).await;
    let val = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)?
    };
    Ok((val, status))
}

fn with_token(req: TestRequest, token: &str) -> TestRequest {
    req.insert_header((AUTHORIZATION, format!("Bearer {}", token)))
}

pub async fn get<S, B>(app: &S, path: &str) -> Result<(Value, StatusCode)>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    call(app, TestRequest::with_uri(path)).await
}

pub async fn auth_get<S, B>(app: &S, path: &str, token: &str) -> Result<(Value, StatusCode)>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    call(app, with_token(TestRequest::with_uri(path), token)).await
}

pub async fn post<S, B>(app: &S, path: &str, data: Value) -> Result<(Value, StatusCode)>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    call(
        app,
        TestRequest::with_uri(path)
            .method(Method::POST)
            .set_json(data),
    )
    .await
}

pub async fn auth_send<S, B>(
    app: &S,
    method: Method,
    path: &str,
    token: &str,
    data: Value,
) -> Result<(Value, StatusCode)>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    call(
        app,
        with_token(
            TestRequest::with_uri(path).method(method).set_json(data),
            token,
        ),
    )
    .await
}

pub async fn auth_post<S, B>(
    app: &S,
    path: &str,
    token: &str,
    data: Value,
) -> Result<(Value, StatusCode)>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    auth_send(app, Method::POST, path, token, data).await
}

pub async fn auth_patch<S, B>(
    app: &S,
    path: &str,
    token: &str,
    data: Value,
) -> Result<(Value, StatusCode)>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    auth_send(app, Method::PATCH, path, token, data).await
}

pub async fn auth_delete<S, B>(app: &S, path: &str, token: &str) -> Result<(Value, StatusCode)>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    call(
        app,
        with_token(TestRequest::with_uri(path).method(Method::DELETE), token),
    )
    .await
}

/// Login as the configured admin.
pub async fn admin_token<S, B>(app: &S) -> Result<String>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (val, status) = post(
        app,
        "/api/auth/login",
        json!({"username": "admin", "password": "password"}),
    )
    .await?;
    assert_eq!(status, 200);
    Ok(val["data"]["token"]
        .as_str()
        .map(ToOwned::to_owned)
        .unwrap_or_default())
}

/// A multipart part, `filename` and `content_type` are set for files.
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: Vec<u8>,
}

impl<'a> Part<'a> {
    pub fn file(name: &'a str, filename: &'a str, content_type: &'a str, size: usize) -> Self {
        Self {
            name,
            filename: Some(filename),
            content_type: Some(content_type),
            data: vec![0xab; size],
        }
    }

    pub fn text(name: &'a str, value: &str) -> Self {
        Self {
            name,
            filename: None,
            content_type: None,
            data: value.as_bytes().to_vec(),
        }
    }
}

pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name).as_bytes(),
            ),
        }
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn auth_upload<S, B>(
    app: &S,
    path: &str,
    token: &str,
    parts: &[Part<'_>],
) -> Result<(Value, StatusCode)>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = TestRequest::with_uri(path)
        .method(Method::POST)
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart_body(parts));
    call(app, with_token(req, token)).await
}

/// Number of files in a directory, 0 if it does not exist.
pub fn count_files(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).count())
        .unwrap_or_default()
}
