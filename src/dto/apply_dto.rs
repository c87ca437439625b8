use bytes::Bytes;
use serde::Serialize;
use std::path::Path;
use utoipa::ToSchema;

use crate::error::{Error, Result};
use crate::models::applicant::{Applicant, EducationLevel, NewApplicant};
use crate::utils::validation::validate_phone;

pub const MISSING_REQUIRED_FIELDS: &str = "Semua field harus diisi";
pub const MISSING_EDUCATION_LEVEL: &str = "Silakan pilih tingkat pendidikan";
pub const INCOMPLETE_UNIVERSITY: &str = "Silakan lengkapi nama universitas, prodi, dan semester";
pub const INCOMPLETE_SCHOOL: &str = "Silakan lengkapi nama sekolah dan jurusan";
pub const MISSING_POSITION: &str = "Silakan pilih posisi di Radar Cirebon";
pub const NOT_A_PDF: &str = "File harus berformat PDF";

/// "Ukuran file maksimal 5MB". Limits under 1 MiB are stated in KB and
/// both units round up.
pub fn file_too_large_message(max_upload_bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * 1024;
    if max_upload_bytes >= MB {
        format!("Ukuran file maksimal {}MB", max_upload_bytes.div_ceil(MB))
    } else {
        format!("Ukuran file maksimal {}KB", max_upload_bytes.div_ceil(KB).max(1))
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    fn is_pdf(&self) -> bool {
        let has_pdf_extension = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        let declared_pdf = self
            .content_type
            .as_deref()
            .map(|ct| ct.eq_ignore_ascii_case("application/pdf"))
            .unwrap_or(false);
        (has_pdf_extension || declared_pdf) && self.data.starts_with(b"%PDF")
    }
}

/// Raw multipart submission. Blank text fields are stored as `None`.
#[derive(Debug, Clone, Default)]
pub struct ApplicationForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub education_level: Option<String>,
    pub university_name: Option<String>,
    pub school_name: Option<String>,
    pub study_program: Option<String>,
    pub major: Option<String>,
    pub semester: Option<String>,
    pub class_level: Option<String>,
    pub position: Option<String>,
    pub user_id: Option<String>,
    pub file: Option<UploadedFile>,
}

impl ApplicationForm {
    /// Stores a text field by its form name. Returns false for unknown names.
    pub fn set_text(&mut self, field: &str, value: String) -> bool {
        let trimmed = value.trim();
        let value = (!trimmed.is_empty()).then(|| trimmed.to_string());
        let slot = match field {
            "name" => &mut self.name,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "educationLevel" | "education_level" => &mut self.education_level,
            "universityName" | "university_name" => &mut self.university_name,
            "schoolName" | "school_name" => &mut self.school_name,
            "prodi" | "study_program" => &mut self.study_program,
            "jurusan" | "major" => &mut self.major,
            "semester" => &mut self.semester,
            "kelas" | "class_level" => &mut self.class_level,
            "radarCireubonPosition" | "position" => &mut self.position,
            "userId" | "user_id" => &mut self.user_id,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Runs the submission checks in the order applicants see them and
    /// builds the record to insert. Duplicate emails are checked by the caller.
    pub fn into_new_applicant(self, max_upload_bytes: usize) -> Result<NewApplicant> {
        let file = self.file.filter(|f| !f.data.is_empty());
        let (Some(name), Some(email), Some(phone), Some(file)) =
            (self.name, self.email, self.phone, file)
        else {
            return Err(Error::BadRequest(MISSING_REQUIRED_FIELDS.into()));
        };

        let education_level = self
            .education_level
            .ok_or_else(|| Error::BadRequest(MISSING_EDUCATION_LEVEL.into()))?;

        match EducationLevel::parse(&education_level) {
            Some(EducationLevel::University)
                if self.university_name.is_none()
                    || self.study_program.is_none()
                    || self.semester.is_none() =>
            {
                return Err(Error::BadRequest(INCOMPLETE_UNIVERSITY.into()));
            }
            Some(EducationLevel::Vocational)
                if self.school_name.is_none() || self.major.is_none() || self.class_level.is_none() =>
            {
                return Err(Error::BadRequest(INCOMPLETE_SCHOOL.into()));
            }
            _ => {}
        }

        let position = self
            .position
            .ok_or_else(|| Error::BadRequest(MISSING_POSITION.into()))?;

        if let Err(e) = validate_phone(&phone) {
            let message = e
                .message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Nomor telepon tidak valid".to_string());
            return Err(Error::BadRequest(message));
        }

        if !file.is_pdf() {
            return Err(Error::BadRequest(NOT_A_PDF.into()));
        }
        if file.data.len() > max_upload_bytes {
            return Err(Error::BadRequest(file_too_large_message(max_upload_bytes)));
        }

        Ok(NewApplicant {
            name,
            email,
            phone,
            education_level,
            university_name: self.university_name,
            school_name: self.school_name,
            study_program: self.study_program,
            major: self.major,
            semester: self.semester,
            class_level: self.class_level,
            position,
            file_name: file.file_name,
            file_data: file.data.to_vec(),
            user_id: None,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApplyResponse {
    pub success: bool,
    pub applicant: Applicant,
}

#[derive(Debug, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListApplicantsQuery {
    pub status: Option<String>,
}
