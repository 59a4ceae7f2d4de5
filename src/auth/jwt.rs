use crate::{auth::AuthError, now, AppState, Error, Result};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct JwtToken {
    // issued at
    pub iat: i64,
    // expiration
    pub exp: i64,
    // username
    pub sub: String,
    pub role: Role,
}

impl JwtToken {
    pub fn from_str(token: &str, secret: &[u8]) -> Result<Self, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        Ok(
            jsonwebtoken::decode::<JwtToken>(
                token,
                &DecodingKey::from_secret(secret),
                &validation,
            )?
            .claims,
        )
    }

    pub fn generate(
        sub: &str,
        role: Role,
        expiry: usize,
        secret: &[u8],
    ) -> Result<String, AuthError> {
        let now = now() as i64;
        let payload = JwtToken {
            iat: now,
            exp: now + expiry as i64,
            sub: sub.to_owned(),
            role,
        };

        Ok(jsonwebtoken::encode(
            &Header::default(),
            &payload,
            &EncodingKey::from_secret(secret),
        )?)
    }
}

/// Caller holding a valid admin token.
#[derive(Debug)]
pub struct AdminUser {
    pub username: String,
}

impl AdminUser {
    pub fn from_token(token: &str, state: &AppState) -> Result<Self, Error> {
        if state.setting.auth.admin_password.is_none() {
            return Err(AuthError::Invalid("admin login is disabled").into());
        }
        let token = JwtToken::from_str(token, state.setting.auth.secret.as_bytes())?;
        if token.role != Role::Admin {
            return Err(AuthError::Forbidden.into());
        }
        Ok(Self {
            username: token.sub,
        })
    }
}

fn bearer(req: &HttpRequest) -> Option<&str> {
    let auth = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    if auth.starts_with("bearer") || auth.starts_with("Bearer") {
        Some(auth[6..auth.len()].trim())
    } else {
        None
    }
}

impl FromRequest for AdminUser {
    type Error = Error;
    type Future = Ready<Result<AdminUser>>;

    fn from_request(req: &HttpRequest, _pl: &mut Payload) -> Self::Future {
        let res = match (req.app_data::<web::Data<AppState>>(), bearer(req)) {
            (Some(state), Some(token)) => AdminUser::from_token(token, state),
            _ => Err(AuthError::Invalid("missing auth token").into()),
        };
        ready(res)
    }
}
