use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::{Error, Result};
use crate::utils::token::Claims;
use crate::AppState;

const LOGIN_REQUIRED: &str = "Silakan login terlebih dahulu";

fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| Error::Unauthorized("Header Authorization tidak valid".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(|token| Some(token.trim()))
        .ok_or_else(|| Error::Unauthorized("Skema otorisasi tidak didukung".to_string()))
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Claims> {
    let token =
        bearer_token(headers)?.ok_or_else(|| Error::Unauthorized(LOGIN_REQUIRED.to_string()))?;
    state.auth_service.verify(token)
}

/// Rejects requests without a valid token and exposes its `Claims` to handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let claims = authenticate(&state, req.headers())?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let claims = authenticate(&state, req.headers())?;
    if !claims.is_admin() {
        tracing::debug!(user = %claims.sub, "admin route refused");
        return Err(Error::Forbidden("Hanya admin yang dapat mengakses".to_string()));
    }
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Claims of the caller when a bearer token is sent. A missing header is
/// anonymous; a bad token is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeClaims(pub Option<Claims>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeClaims {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match bearer_token(&parts.headers)? {
            Some(token) => Ok(MaybeClaims(Some(state.auth_service.verify(token)?))),
            None => Ok(MaybeClaims(None)),
        }
    }
}
