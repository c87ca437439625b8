pub mod apply_dto;
pub mod auth_dto;
pub mod notification_dto;
pub mod review_dto;

use serde::{Deserialize, Serialize};

/// Identifier accepted either as a JSON number or as a numeric string.
/// Zero and negative values resolve to nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexibleId {
    Number(i64),
    Text(String),
}

impl FlexibleId {
    pub fn resolve(&self) -> Option<i32> {
        let id = match self {
            FlexibleId::Number(n) => i32::try_from(*n).ok(),
            FlexibleId::Text(s) => s.trim().parse().ok(),
        };
        id.filter(|id| *id > 0)
    }
}

impl From<i32> for FlexibleId {
    fn from(id: i32) -> Self {
        FlexibleId::Number(id.into())
    }
}

// Trims strings and turns blank ones into None
pub(crate) fn trim_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

// Keeps the value as sent; only the empty string counts as missing
pub(crate) fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.is_empty()))
}
