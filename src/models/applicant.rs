use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::user::PublicUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "applicant_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicantStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicantStatus {
    pub const ALL: [ApplicantStatus; 3] = [
        ApplicantStatus::Pending,
        ApplicantStatus::Accepted,
        ApplicantStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicantStatus::Pending => "PENDING",
            ApplicantStatus::Accepted => "ACCEPTED",
            ApplicantStatus::Rejected => "REJECTED",
        }
    }

    /// Message recorded for the applicant when an admin moves them into this status.
    pub fn decision_message(&self) -> &'static str {
        match self {
            ApplicantStatus::Accepted => {
                "Selamat! Lamaran kamu diterima. Tim kami akan menghubungi Anda segera."
            }
            ApplicantStatus::Rejected => {
                "Terima kasih atas permohonan Anda. Maaf, pada kesempatan kali ini kami tidak dapat menerima lamaran Anda. Kami berharap dapat bekerja sama di masa depan."
            }
            ApplicantStatus::Pending => "Status lamaran Anda telah diperbarui.",
        }
    }
}

impl fmt::Display for ApplicantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown applicant status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicantStatus {
    type Err = UnknownStatus;

    // Case-sensitive on purpose: "accepted" is not a valid status value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicantStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Education levels that carry extra required fields on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationLevel {
    /// University student ("Mahasiswa"): university, study program and semester.
    University,
    /// Vocational high school ("SMK"): school, major and class.
    Vocational,
}

impl EducationLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Mahasiswa" => Some(EducationLevel::University),
            "SMK" => Some(EducationLevel::Vocational),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Applicant {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub education_level: String,
    pub university_name: Option<String>,
    pub school_name: Option<String>,
    pub study_program: Option<String>,
    pub major: Option<String>,
    pub semester: Option<String>,
    pub class_level: Option<String>,
    pub position: String,
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    pub has_file: bool,
    pub status: ApplicantStatus,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApplicantWithUser {
    #[serde(flatten)]
    pub applicant: Applicant,
    pub user: Option<PublicUser>,
}

/// Stored resume of one applicant. Either the inline bytes or the legacy URL may be set.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicantFile {
    pub file_name: Option<String>,
    pub file_data: Option<Vec<u8>>,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewApplicant {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub education_level: String,
    pub university_name: Option<String>,
    pub school_name: Option<String>,
    pub study_program: Option<String>,
    pub major: Option<String>,
    pub semester: Option<String>,
    pub class_level: Option<String>,
    pub position: String,
    pub file_name: String,
    pub file_data: Vec<u8>,
    pub user_id: Option<i32>,
}
