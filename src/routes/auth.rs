use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};

use crate::{
    dto::auth_dto::{AuthResponse, LoginRequest, MeResponse, RegisterRequest, RegisterResponse},
    error::Result,
    middleware::{auth::MaybeClaims, json::ApiJson},
    utils::token::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = Json<AuthResponse>),
        (status = 401, description = "Unknown email or wrong password")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let (user, token) = state.auth_service.login(payload).await?;
    Ok(Json(AuthResponse {
        success: true,
        user,
        token,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = Json<RegisterResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "ADMIN role requested without an admin token"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    MaybeClaims(caller): MaybeClaims,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let user = state
        .auth_service
        .register(payload, caller.as_ref())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            user,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current account", body = Json<MeResponse>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MeResponse>> {
    let (user, applicant_id) = state.auth_service.me(&claims).await?;
    Ok(Json(MeResponse {
        success: true,
        authenticated: true,
        user,
        applicant_id,
    }))
}
