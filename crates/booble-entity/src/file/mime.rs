//! MIME type value object.

use std::fmt;

use serde::{Deserialize, Serialize};

use booble_core::AppError;

/// Longest stored content type.
pub const MAX_CONTENT_TYPE_LENGTH: usize = 100;

/// A normalized `category/subtype` content type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MimeType(String);

impl MimeType {
    /// Parse a content type, trimming and lowercasing it.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let value = raw.trim().to_lowercase();
        if value.is_empty() {
            return Err(AppError::validation("MIME type cannot be empty"));
        }
        if value.len() > MAX_CONTENT_TYPE_LENGTH {
            return Err(AppError::validation(format!(
                "MIME type cannot exceed {MAX_CONTENT_TYPE_LENGTH} characters"
            )));
        }
        match value.split_once('/') {
            Some((category, subtype)) if !category.is_empty() && !subtype.is_empty() => {
                Ok(Self(value))
            }
            _ => Err(AppError::validation(format!("Invalid MIME type: '{raw}'"))),
        }
    }

    /// The full normalized value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part before the slash, e.g. `image`.
    pub fn category(&self) -> &str {
        self.0.split_once('/').map(|(c, _)| c).unwrap_or(&self.0)
    }

    /// Part after the slash, e.g. `png`.
    pub fn subtype(&self) -> &str {
        self.0.split_once('/').map(|(_, s)| s).unwrap_or_default()
    }

    pub fn is_image(&self) -> bool {
        self.category() == "image"
    }

    pub fn is_video(&self) -> bool {
        self.category() == "video"
    }

    pub fn is_audio(&self) -> bool {
        self.category() == "audio"
    }

    /// Audio or video.
    pub fn is_media(&self) -> bool {
        self.is_audio() || self.is_video()
    }

    /// `application/*` or `text/*`.
    pub fn is_document(&self) -> bool {
        matches!(self.category(), "application" | "text")
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MimeType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MimeType> for String {
    fn from(mime: MimeType) -> Self {
        mime.0
    }
}
