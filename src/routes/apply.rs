use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Extension, Json,
};
use bytes::Bytes;

use crate::{
    dto::apply_dto::{
        file_too_large_message, ApplicationForm, ApplyResponse, ListApplicantsQuery, UploadedFile,
    },
    error::{Error, Result},
    middleware::auth::MaybeClaims,
    models::applicant::ApplicantWithUser,
    services::applicant_service::ResumeFile,
    utils::token::Claims,
    AppState,
};

async fn read_form(mut multipart: Multipart, max_upload_bytes: usize) -> Result<ApplicationForm> {
    let too_large = || Error::BadRequest(file_too_large_message(max_upload_bytes));

    let mut form = ApplicationForm::default();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            too_large()
        } else {
            Error::Multipart(e)
        }
    })? {
        let field_name = field.name().unwrap_or_default().to_string();
        if field_name == "file" {
            let file_name = field.file_name().unwrap_or("document.pdf").to_string();
            let content_type = field.content_type().map(str::to_string);
            let data: Bytes = field.bytes().await.map_err(|e| {
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    too_large()
                } else {
                    Error::Multipart(e)
                }
            })?;
            form.file = Some(UploadedFile {
                file_name,
                content_type,
                data,
            });
            continue;
        }

        let value = field.text().await?;
        if !form.set_text(&field_name, value) {
            tracing::debug!(field = %field_name, "ignoring unknown form field");
        }
    }
    Ok(form)
}

#[utoipa::path(
    post,
    path = "/api/apply",
    request_body(content = String, content_type = "multipart/form-data", description = "Application form with a PDF resume in `file`"),
    responses(
        (status = 201, description = "Application stored", body = Json<ApplyResponse>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already applied")
    )
)]
pub async fn submit_application(
    State(state): State<AppState>,
    MaybeClaims(caller): MaybeClaims,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let form = read_form(multipart, state.settings.max_upload_bytes).await?;
    let applicant = state
        .applicant_service
        .submit(form, caller.as_ref())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplyResponse {
            success: true,
            applicant,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/apply",
    params(ListApplicantsQuery),
    responses(
        (status = 200, description = "Applicants, newest first", body = Vec<ApplicantWithUser>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_applicants(
    State(state): State<AppState>,
    Query(query): Query<ListApplicantsQuery>,
) -> Result<Json<Vec<ApplicantWithUser>>> {
    let applicants = state
        .applicant_service
        .list(query.status.as_deref())
        .await?;
    Ok(Json(applicants))
}

#[utoipa::path(
    get,
    path = "/api/apply/{id}",
    params(
        ("id" = i32, Path, description = "Applicant ID")
    ),
    responses(
        (status = 200, description = "Resume PDF", content_type = "application/pdf"),
        (status = 302, description = "Redirect to a legacy file URL"),
        (status = 403, description = "Applicant belongs to another user"),
        (status = 404, description = "No file stored")
    ),
    security(("bearer" = []))
)]
pub async fn get_resume(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id: i32 = id
        .trim()
        .parse()
        .map_err(|_| Error::BadRequest("ID pelamar tidak valid".to_string()))?;

    let response = match state.applicant_service.resume(&claims, id).await? {
        ResumeFile::Inline { file_name, data } => {
            let disposition = format!("inline; filename=\"{}\"", file_name.replace('"', ""));
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                    (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
                ],
                data,
            )
                .into_response()
        }
        ResumeFile::Redirect(url) => {
            tracing::info!(applicant_id = id, "redirecting to legacy file URL");
            (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
        }
        ResumeFile::Missing => {
            tracing::warn!(applicant_id = id, "resume requested but none stored");
            (
                StatusCode::NOT_FOUND,
                Html(format!(
                    "<html><body><h1>File tidak ditemukan</h1>\
                     <p>File PDF untuk pelamar {id} belum diunggah.</p>\
                     <p>Silakan minta pelamar untuk mengunggah ulang file.</p></body></html>"
                )),
            )
                .into_response()
        }
    };
    Ok(response)
}
