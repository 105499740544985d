//! Turns an uploaded resume file into plain text.
//!
//! PDFs are parsed locally first; scanned PDFs (no text layer) and images go
//! to the AI capability. Plain text is decoded as UTF-8.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::ai::AiCapability;
use crate::errors::AppError;

pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    PlainText,
    Image(&'static str),
}

impl ResumeFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ResumeFormat::Pdf => "application/pdf",
            ResumeFormat::PlainText => "text/plain",
            ResumeFormat::Image(mime) => mime,
        }
    }
}

/// Picks the format from the declared content type, falling back to the
/// file extension when the type is missing or generic.
pub fn detect_format(file_name: &str, content_type: Option<&str>) -> Result<ResumeFormat, AppError> {
    let declared = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

    if let Some(format) = declared.as_deref().and_then(format_for_mime) {
        return Ok(format);
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    let format = match extension.as_str() {
        "pdf" => Some(ResumeFormat::Pdf),
        "txt" | "md" | "markdown" => Some(ResumeFormat::PlainText),
        "png" => Some(ResumeFormat::Image("image/png")),
        "jpg" | "jpeg" => Some(ResumeFormat::Image("image/jpeg")),
        "webp" => Some(ResumeFormat::Image("image/webp")),
        _ => None,
    };

    format.ok_or_else(|| {
        AppError::FileUpload(format!(
            "Unsupported format for {file_name}: upload a PDF, image or text file"
        ))
    })
}

fn format_for_mime(mime: &str) -> Option<ResumeFormat> {
    match mime {
        "application/pdf" => Some(ResumeFormat::Pdf),
        "text/plain" | "text/markdown" => Some(ResumeFormat::PlainText),
        "image/png" => Some(ResumeFormat::Image("image/png")),
        "image/jpeg" | "image/jpg" => Some(ResumeFormat::Image("image/jpeg")),
        "image/webp" => Some(ResumeFormat::Image("image/webp")),
        _ => None,
    }
}

pub async fn extract_text(
    ai: &dyn AiCapability,
    file_name: &str,
    content_type: Option<&str>,
    bytes: Bytes,
) -> Result<String, AppError> {
    if bytes.is_empty() {
        return Err(AppError::FileUpload(format!("{file_name} is empty")));
    }
    if bytes.len() > MAX_RESUME_BYTES {
        return Err(AppError::FileUpload(format!(
            "{file_name} is larger than {} MiB",
            MAX_RESUME_BYTES / (1024 * 1024)
        )));
    }

    let format = detect_format(file_name, content_type)?;
    debug!("Extracting text from {file_name} as {:?}", format);

    let text = match format {
        ResumeFormat::PlainText => String::from_utf8(bytes.to_vec()).map_err(|_| {
            AppError::FileUpload(format!("{file_name} is not valid UTF-8 text"))
        })?,
        ResumeFormat::Pdf => match pdf_text(bytes.clone()).await {
            Some(text) => text,
            None => {
                ai.extract_resume_text(file_name, format.mime_type(), &bytes)
                    .await?
            }
        },
        ResumeFormat::Image(mime) => ai.extract_resume_text(file_name, mime, &bytes).await?,
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::FileUpload(format!(
            "No text could be extracted from {file_name}"
        )));
    }
    Ok(text)
}

/// Local PDF text layer, or `None` if the PDF has none or cannot be parsed.
/// The parser can panic on malformed input; that is treated as unparsable.
async fn pdf_text(bytes: Bytes) -> Option<String> {
    let parsed =
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await;

    match parsed {
        Ok(Ok(text)) if !text.trim().is_empty() => Some(text),
        Ok(Ok(_)) => {
            debug!("PDF has no text layer, falling back to AI extraction");
            None
        }
        Ok(Err(e)) => {
            warn!("Local PDF parsing failed, falling back to AI extraction: {e}");
            None
        }
        Err(e) => {
            warn!("PDF parser aborted, falling back to AI extraction: {e}");
            None
        }
    }
}
