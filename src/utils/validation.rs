use std::borrow::Cow;

use validator::ValidationError;

pub const PHONE_LENGTH_MESSAGE: &str = "Nomor telepon harus antara 10-15 angka";
pub const PHONE_CHARSET_MESSAGE: &str = "Nomor telepon hanya boleh berisi angka dan simbol +";

/// Accepts 10 to 15 digits with an optional leading `+`. Length is checked before the
/// character set, so "08-12" reports the length problem first.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !(10..=15).contains(&digits) {
        return Err(error_with_message("phone_length", PHONE_LENGTH_MESSAGE));
    }
    let rest = phone.strip_prefix('+').unwrap_or(phone);
    if !rest.chars().all(|c| c.is_ascii_digit()) {
        return Err(error_with_message("phone_charset", PHONE_CHARSET_MESSAGE));
    }
    Ok(())
}

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
