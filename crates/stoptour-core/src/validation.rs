//! Field-level validation results and the shared checks behind them.
//!
//! Validation never stops at the first problem. Every check appends to a
//! [`ValidationErrors`] list so an editor can see (and highlight) every
//! offending field and sub-item row in one pass.

use std::fmt;

use serde::Serialize;
use url::Url;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Id of the block the error belongs to; `None` for page-level fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    /// Display position (`order`) of the owning block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_position: Option<usize>,
    /// Payload or page field name, e.g. `"items"` or `"geoFenceRadius"`.
    pub field: String,
    /// Index of the offending sub-item within `field`, for list fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(position) = self.block_position {
            write!(f, "blocks[{position}].")?;
        }
        write!(f, "{}", self.field)?;
        if let Some(index) = self.index {
            write!(f, "[{index}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Ordered list of validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed with {} error(s)", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Record an error against a scalar field.
    pub fn field(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            block_id: None,
            block_position: None,
            field: field.to_string(),
            index: None,
            message: message.into(),
        });
    }

    /// Record an error against one row of a list field.
    pub fn item(&mut self, field: &str, index: usize, message: impl Into<String>) {
        self.0.push(FieldError {
            block_id: None,
            block_position: None,
            field: field.to_string(),
            index: Some(index),
            message: message.into(),
        });
    }

    /// Append another block's errors, tagging each with the owning block.
    pub fn extend_for_block(&mut self, block_id: &str, position: usize, other: ValidationErrors) {
        self.0.extend(other.0.into_iter().map(|mut err| {
            err.block_id = Some(block_id.to_string());
            err.block_position = Some(position);
            err
        }));
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[must_use]
pub fn is_latitude(value: f64) -> bool {
    value.is_finite() && (-90.0..=90.0).contains(&value)
}

#[must_use]
pub fn is_longitude(value: f64) -> bool {
    value.is_finite() && (-180.0..=180.0).contains(&value)
}

/// Absolute `http`/`https` URL with a host.
#[must_use]
pub fn is_web_url(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() != raw.len() {
        return false;
    }
    Url::parse(trimmed).is_ok_and(|u| {
        matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty())
    })
}

/// A link button target: an absolute web URL or a site-internal path such as
/// `/tours/rome`.
#[must_use]
pub fn is_link_target(raw: &str) -> bool {
    if raw.starts_with('/') && !raw.starts_with("//") {
        return !raw.chars().any(char::is_whitespace);
    }
    is_web_url(raw)
}

/// Parse a 24-hour `HH:MM` clock time into `(hour, minute)`.
#[must_use]
pub fn parse_clock_time(raw: &str) -> Option<(u8, u8)> {
    let bytes = raw.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    let digit = |b: u8| b.is_ascii_digit().then(|| b - b'0');
    let hour = digit(bytes[0])? * 10 + digit(bytes[1])?;
    let minute = digit(bytes[3])? * 10 + digit(bytes[4])?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}

/// `true` if rich-text markup contains any visible character once tags and
/// `&nbsp;` entities are removed.
#[must_use]
pub fn has_visible_text(markup: &str) -> bool {
    let mut in_tag = false;
    let mut text = String::with_capacity(markup.len());
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    !text.replace("&nbsp;", " ").trim().is_empty()
}
