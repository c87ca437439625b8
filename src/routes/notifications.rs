use std::time::Duration;

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::{
    dto::notification_dto::{
        NotificationQuery, SendNotificationRequest, SendNotificationResponse, WaitQuery,
    },
    error::Result,
    middleware::json::ApiJson,
    models::notification::Notification,
    utils::token::Claims,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/notifications",
    request_body = SendNotificationRequest,
    responses(
        (status = 200, description = "Notification recorded; email outcome in `email_sent`", body = Json<SendNotificationResponse>),
        (status = 400, description = "Missing applicant id or message"),
        (status = 404, description = "Applicant not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn send_notification(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SendNotificationRequest>,
) -> Result<Json<SendNotificationResponse>> {
    let new = payload.into_new()?;
    let dispatched = state.notification_service.dispatch(new).await?;
    Ok(Json(SendNotificationResponse {
        success: true,
        notification: dispatched.notification,
        email_sent: dispatched.email_sent,
    }))
}

#[utoipa::path(
    get,
    path = "/api/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Up to 10 most recent notifications", body = Vec<Notification>),
        (status = 403, description = "Applicant belongs to another user")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Vec<Notification>>> {
    let applicant_id = query.applicant_id()?;
    state
        .applicant_service
        .authorize(&claims, applicant_id)
        .await?;
    let notifications = state.notification_service.list(applicant_id).await?;
    Ok(Json(notifications))
}

#[utoipa::path(
    get,
    path = "/api/notifications/wait",
    params(WaitQuery),
    responses(
        (status = 200, description = "Current notifications, returned once one newer than `after` exists or the timeout elapses", body = Vec<Notification>)
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn wait_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WaitQuery>,
) -> Result<Json<Vec<Notification>>> {
    let applicant_id = query.applicant_id()?;
    state
        .applicant_service
        .authorize(&claims, applicant_id)
        .await?;
    let notifications = state
        .notification_service
        .wait(
            applicant_id,
            query.after,
            Duration::from_secs(query.timeout_secs()),
        )
        .await?;
    Ok(Json(notifications))
}
