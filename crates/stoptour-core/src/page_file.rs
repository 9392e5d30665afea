//! Stop pages as files on disk, for editing outside the store.

use std::path::Path;

use crate::error::ConfigError;
use crate::page::StopPage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    Json,
    Yaml,
}

impl PageFormat {
    /// Pick the format from the file extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedPageFormat`] for anything other than
    /// `.json`, `.yaml` or `.yml`.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(PageFormat::Json),
            Some("yaml" | "yml") => Ok(PageFormat::Yaml),
            _ => Err(ConfigError::UnsupportedPageFormat {
                path: path.display().to_string(),
            }),
        }
    }
}

/// Read a stop page from a JSON or YAML file.
///
/// The page is not validated; call [`StopPage::validate_for_save`] for that.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed.
pub fn load_page(path: &Path) -> Result<StopPage, ConfigError> {
    let format = PageFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PageFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let parse_err = |reason: String| ConfigError::PageFileParse {
        path: path.display().to_string(),
        reason,
    };
    let page = match format {
        PageFormat::Json => serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?,
        PageFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| parse_err(e.to_string()))?,
    };
    Ok(page)
}

/// Write a stop page, overwriting any existing file.
///
/// # Errors
///
/// Returns `ConfigError` if the page cannot be encoded or the file cannot be
/// written.
pub fn save_page(path: &Path, page: &StopPage) -> Result<(), ConfigError> {
    let encode_err = |reason: String| ConfigError::PageFileEncode {
        path: path.display().to_string(),
        reason,
    };
    let mut content = match PageFormat::from_path(path)? {
        PageFormat::Json => {
            serde_json::to_string_pretty(page).map_err(|e| encode_err(e.to_string()))?
        }
        PageFormat::Yaml => serde_yaml::to_string(page).map_err(|e| encode_err(e.to_string()))?,
    };
    if !content.ends_with('\n') {
        content.push('\n');
    }
    std::fs::write(path, content).map_err(|e| ConfigError::PageFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), page_id = %page.id, "page file written");
    Ok(())
}
