use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{non_empty_string, trim_optional_string, FlexibleId};
use crate::error::{Error, Result};
use crate::models::applicant::{Applicant, ApplicantStatus};
use crate::models::notification::Notification;

pub const MISSING_ID_OR_STATUS: &str = "ID dan status harus diisi";
pub const INVALID_STATUS: &str = "Status tidak valid";

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    #[schema(value_type = Option<i32>)]
    pub id: Option<FlexibleId>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub status: Option<String>,
    /// Replaces the fixed decision text and is also emailed to the applicant.
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub message: Option<String>,
}

/// Validated form of [`UpdateStatusRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub applicant_id: i32,
    pub status: ApplicantStatus,
    pub message: Option<String>,
}

impl UpdateStatusRequest {
    pub fn into_change(self) -> Result<StatusChange> {
        let (Some(id), Some(status)) = (self.id, self.status) else {
            return Err(Error::BadRequest(MISSING_ID_OR_STATUS.into()));
        };
        let status: ApplicantStatus = status
            .parse()
            .map_err(|_| Error::BadRequest(INVALID_STATUS.into()))?;
        let applicant_id = id
            .resolve()
            .ok_or_else(|| Error::BadRequest(MISSING_ID_OR_STATUS.into()))?;
        Ok(StatusChange {
            applicant_id,
            status,
            message: self.message,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub applicant: Applicant,
    pub notification: Notification,
    /// Present only when a custom message was emailed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_sent: Option<bool>,
}
