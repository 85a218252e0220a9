//! Document text extraction and spreadsheet URL handling.

use crate::ApiError;
use log::debug;
use std::path::Path;

/// File extensions accepted by `/upload_doc`.
const ALLOWED_EXTENSIONS: &[&str] = &["txt", "md", "csv", "pdf"];

/// Extract text from an uploaded document.
///
/// Text formats pass through with lossy UTF-8 decoding; PDFs go through
/// `pdf-extract`. Any other extension is rejected.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, ApiError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ApiError::validation(format!(
            "unsupported file type: only {} are allowed",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    debug!(
        "extracting document text (filename={}, bytes={})",
        filename,
        bytes.len()
    );
    if extension == "pdf" {
        return pdf_extract::extract_text_from_mem(bytes)
            .map_err(|err| ApiError::validation(format!("failed to extract PDF text: {err}")));
    }
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Turn a Google Sheets link into its CSV export URL.
///
/// Only `docs.google.com` spreadsheet links are accepted.
pub fn sheet_export_url(url: &str) -> Result<String, ApiError> {
    let trimmed = url.trim();
    let rest = trimmed
        .strip_prefix("https://docs.google.com/spreadsheets/d/")
        .ok_or_else(|| {
            ApiError::validation(
                "url must be a docs.google.com spreadsheet link".to_string(),
            )
        })?;
    let id: String = rest
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
        .collect();
    if id.is_empty() {
        return Err(ApiError::validation(
            "spreadsheet link is missing its document id".to_string(),
        ));
    }
    Ok(format!(
        "https://docs.google.com/spreadsheets/d/{id}/export?format=csv"
    ))
}
