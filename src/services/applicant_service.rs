use crate::database::postgres::DUPLICATE_APPLICANT_EMAIL;
use crate::database::store::{ApplicantStore, DynStore};
use crate::dto::apply_dto::ApplicationForm;
use crate::dto::review_dto::INVALID_STATUS;
use crate::error::{Error, Result};
use crate::models::applicant::{Applicant, ApplicantStatus, ApplicantWithUser};
use crate::services::notification_service::APPLICANT_NOT_FOUND;
use crate::utils::token::Claims;

pub const ACCESS_DENIED: &str = "Akses ditolak";

/// What the resume endpoint should answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeFile {
    Inline { file_name: String, data: Vec<u8> },
    Redirect(String),
    Missing,
}

#[derive(Clone)]
pub struct ApplicantService {
    store: DynStore,
    max_upload_bytes: usize,
}

impl ApplicantService {
    pub fn new(store: DynStore, max_upload_bytes: usize) -> Self {
        Self {
            store,
            max_upload_bytes,
        }
    }

    /// Validates and stores a submission. A `userId` on the form must match the
    /// caller's token; without a token it is ignored.
    pub async fn submit(&self, mut form: ApplicationForm, caller: Option<&Claims>) -> Result<Applicant> {
        let claimed_user = form.user_id.take();
        let mut new = form.into_new_applicant(self.max_upload_bytes)?;

        new.user_id = match (caller, claimed_user) {
            (Some(claims), claimed) => {
                let user_id = claims.user_id()?;
                if let Some(raw) = claimed {
                    if raw.parse::<i32>().ok() != Some(user_id) {
                        return Err(Error::Forbidden(ACCESS_DENIED.to_string()));
                    }
                }
                Some(user_id)
            }
            (None, Some(raw)) => {
                tracing::warn!(user_id = %raw, "ignoring userId on anonymous submission");
                None
            }
            (None, None) => None,
        };

        if self.store.find_applicant_by_email(&new.email).await?.is_some() {
            return Err(Error::Conflict(DUPLICATE_APPLICANT_EMAIL.to_string()));
        }

        let applicant = self.store.insert_applicant(new).await?;
        tracing::info!(
            applicant_id = applicant.id,
            position = %applicant.position,
            linked_user = ?applicant.user_id,
            "application submitted"
        );
        Ok(applicant)
    }

    pub async fn list(&self, status: Option<&str>) -> Result<Vec<ApplicantWithUser>> {
        let status = match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                raw.parse::<ApplicantStatus>()
                    .map_err(|_| Error::BadRequest(INVALID_STATUS.to_string()))?,
            ),
            None => None,
        };
        self.store.list_applicants(status).await
    }

    /// Admins see every applicant. Other users only the one linked to them.
    pub async fn authorize(&self, claims: &Claims, applicant_id: i32) -> Result<()> {
        if claims.is_admin() {
            return Ok(());
        }
        let user_id = claims.user_id()?;
        match self.store.find_applicant(applicant_id).await? {
            Some(applicant) if applicant.user_id == Some(user_id) => Ok(()),
            _ => Err(Error::Forbidden(ACCESS_DENIED.to_string())),
        }
    }

    pub async fn resume(&self, claims: &Claims, applicant_id: i32) -> Result<ResumeFile> {
        self.authorize(claims, applicant_id).await?;
        let file = self
            .store
            .find_applicant_file(applicant_id)
            .await?
            .ok_or_else(|| Error::NotFound(APPLICANT_NOT_FOUND.to_string()))?;

        match (file.file_data, file.file_url) {
            (Some(data), _) if !data.is_empty() => Ok(ResumeFile::Inline {
                file_name: file.file_name.unwrap_or_else(|| "document.pdf".to_string()),
                data,
            }),
            (_, Some(url)) if !url.trim().is_empty() => Ok(ResumeFile::Redirect(url)),
            _ => Ok(ResumeFile::Missing),
        }
    }
}
