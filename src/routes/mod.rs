pub mod apply;
pub mod auth;
pub mod health;
pub mod notifications;
pub mod status;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::middleware::{
    auth::{require_admin, require_auth},
    rate_limit::{new_rps_state, rps_middleware},
};
use crate::AppState;

/// Multipart overhead allowed on top of the resume size limit, so an
/// oversized file still reaches validation and gets a readable message.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        apply::submit_application,
        apply::list_applicants,
        apply::get_resume,
        status::update_status,
        notifications::send_notification,
        notifications::list_notifications,
        notifications::wait_notifications,
        auth::login,
        auth::register,
        auth::me,
    ),
    components(schemas(
        crate::models::applicant::Applicant,
        crate::models::applicant::ApplicantStatus,
        crate::models::applicant::ApplicantWithUser,
        crate::models::notification::Notification,
        crate::models::user::PublicUser,
        crate::models::user::Role,
        crate::dto::apply_dto::ApplyResponse,
        crate::dto::review_dto::UpdateStatusRequest,
        crate::dto::review_dto::UpdateStatusResponse,
        crate::dto::notification_dto::SendNotificationRequest,
        crate::dto::notification_dto::SendNotificationResponse,
        crate::dto::auth_dto::LoginRequest,
        crate::dto::auth_dto::RegisterRequest,
        crate::dto::auth_dto::AuthResponse,
        crate::dto::auth_dto::RegisterResponse,
        crate::dto::auth_dto::MeResponse,
    )),
    modifiers(&BearerAuth),
    tags((name = "internship", description = "Internship applications and review"))
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn router(state: AppState) -> Router {
    let limiter = new_rps_state(state.settings.public_rps);

    let public_api = Router::new()
        .route("/api/apply", post(apply::submit_application))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .layer(from_fn_with_state(limiter, rps_middleware));

    let admin_api = Router::new()
        .route("/api/apply", get(apply::list_applicants))
        .route("/api/update-status", post(status::update_status))
        .route("/api/notifications", post(notifications::send_notification))
        .layer(from_fn_with_state(state.clone(), require_admin));

    let member_api = Router::new()
        .route("/api/apply/:id", get(apply::get_resume))
        .route("/api/notifications", get(notifications::list_notifications))
        .route(
            "/api/notifications/wait",
            get(notifications::wait_notifications),
        )
        .route("/api/auth/me", get(auth::me))
        .layer(from_fn_with_state(state.clone(), require_auth));

    let body_limit = state.settings.max_upload_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/openapi.json", get(openapi))
        .merge(public_api)
        .merge(admin_api)
        .merge(member_api)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
}
