use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{trim_optional_string, FlexibleId};
use crate::error::{Error, Result};
use crate::models::notification::{NewNotification, Notification, DEFAULT_SENDER};

pub const MISSING_ID_OR_MESSAGE: &str = "Applicant ID dan pesan harus diisi";
pub const INVALID_APPLICANT_ID: &str = "Applicant ID tidak valid";
pub const MISSING_APPLICANT_ID: &str = "applicantId diperlukan";

/// Longest a long-poll request may hold the connection.
pub const MAX_WAIT_SECS: u64 = 30;
pub const DEFAULT_WAIT_SECS: u64 = 25;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    #[serde(alias = "applicant_id")]
    #[schema(value_type = Option<i32>)]
    pub applicant_id: Option<FlexibleId>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub sender: Option<String>,
}

impl SendNotificationRequest {
    pub fn into_new(self) -> Result<NewNotification> {
        let (Some(id), Some(message)) = (self.applicant_id, self.message) else {
            return Err(Error::BadRequest(MISSING_ID_OR_MESSAGE.into()));
        };
        let applicant_id = id
            .resolve()
            .ok_or_else(|| Error::BadRequest(INVALID_APPLICANT_ID.into()))?;
        Ok(NewNotification {
            applicant_id,
            message,
            sender: Some(self.sender.unwrap_or_else(|| DEFAULT_SENDER.to_string())),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SendNotificationResponse {
    pub success: bool,
    pub notification: Notification,
    pub email_sent: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    pub applicant_id: Option<String>,
}

impl NotificationQuery {
    pub fn applicant_id(&self) -> Result<i32> {
        parse_applicant_id(self.applicant_id.as_deref())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct WaitQuery {
    pub applicant_id: Option<String>,
    /// Highest notification id the caller has already seen.
    pub after: Option<i32>,
    /// Seconds to wait, capped at 30.
    pub timeout: Option<u64>,
}

impl WaitQuery {
    pub fn applicant_id(&self) -> Result<i32> {
        parse_applicant_id(self.applicant_id.as_deref())
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_WAIT_SECS).min(MAX_WAIT_SECS)
    }
}

fn parse_applicant_id(raw: Option<&str>) -> Result<i32> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::BadRequest(MISSING_APPLICANT_ID.into()))?;
    raw.parse()
        .map_err(|_| Error::BadRequest(INVALID_APPLICANT_ID.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_defaults_to_admin() {
        let req: SendNotificationRequest =
            serde_json::from_str(r#"{"applicantId":"4","message":" Jadwal wawancara besok "}"#)
                .unwrap();
        let new = req.into_new().unwrap();
        assert_eq!(new.applicant_id, 4);
        assert_eq!(new.message, "Jadwal wawancara besok");
        assert_eq!(new.sender.as_deref(), Some(DEFAULT_SENDER));
    }

    #[test]
    fn empty_message_is_rejected() {
        let req: SendNotificationRequest =
            serde_json::from_str(r#"{"applicantId":4,"message":"   "}"#).unwrap();
        assert!(matches!(req.into_new(), Err(Error::BadRequest(m)) if m == MISSING_ID_OR_MESSAGE));
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        let req: SendNotificationRequest =
            serde_json::from_str(r#"{"applicantId":"empat","message":"halo"}"#).unwrap();
        assert!(matches!(req.into_new(), Err(Error::BadRequest(m)) if m == INVALID_APPLICANT_ID));
    }

    #[test]
    fn wait_timeout_is_capped() {
        let q = WaitQuery {
            applicant_id: Some("1".into()),
            after: None,
            timeout: Some(600),
        };
        assert_eq!(q.timeout_secs(), MAX_WAIT_SECS);
        let q = WaitQuery {
            applicant_id: None,
            after: None,
            timeout: None,
        };
        assert_eq!(q.timeout_secs(), DEFAULT_WAIT_SECS);
        assert!(q.applicant_id().is_err());
    }
}
