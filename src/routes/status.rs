use axum::{extract::State, Json};

use crate::{
    dto::review_dto::{UpdateStatusRequest, UpdateStatusResponse},
    error::Result,
    middleware::json::ApiJson,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/update-status",
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed and notification recorded", body = Json<UpdateStatusResponse>),
        (status = 400, description = "Missing id/status or unknown status"),
        (status = 404, description = "Applicant not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>> {
    let change = payload.into_change()?;
    let update = state.review_service.update_status(change).await?;
    Ok(Json(UpdateStatusResponse {
        success: true,
        applicant: update.applicant,
        notification: update.notification,
        email_sent: update.email_sent,
    }))
}
