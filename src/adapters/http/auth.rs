use axum::http::{HeaderMap, header::AUTHORIZATION};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::jwt,
};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub is_admin: bool,
}

/// Resolves the caller from a bearer token, falling back to the access token cookie.
pub fn current_user(headers: &HeaderMap, app_state: &AppState) -> AppResult<AuthUser> {
    let token = bearer_token(headers)
        .or_else(|| {
            CookieJar::from_headers(headers)
                .get(ACCESS_TOKEN_COOKIE)
                .map(|c| c.value().to_owned())
        })
        .ok_or(AppError::InvalidCredentials)?;

    let claims = jwt::verify(&token, &app_state.config.jwt_secret)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidCredentials)?;

    Ok(AuthUser {
        user_id,
        is_admin: claims.admin,
    })
}

pub fn current_admin(headers: &HeaderMap, app_state: &AppState) -> AppResult<AuthUser> {
    let user = current_user(headers, app_state)?;
    if !user.is_admin {
        return Err(AppError::Forbidden);
    }
    Ok(user)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_owned())
}
