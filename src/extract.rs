use axum::{
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use http::{header::AUTHORIZATION, HeaderMap};

use crate::{auth::AuthError, error::AppError, state::AppState};

/// JSON body whose rejections are reported as 400 with the usual error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Payload<T>(pub T);

/// Admits the request when admin gating is off, or when it carries a valid
/// `Authorization: Bearer <token>` header.
pub struct AdminGuard;

impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(admin) = &state.admin else {
            return Ok(AdminGuard);
        };

        let token = bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        admin.signer.verify(token)?;

        Ok(AdminGuard)
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
