//! Shallow PDF upload validation: declared media type, extension,
//! signature, and size. Full structural parsing is intentionally out of
//! contract.

/// Byte prefix every PDF document starts with.
const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Size ceiling applied to uploaded documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_bytes: usize,
}

impl UploadLimits {
    pub fn from_megabytes(megabytes: u64) -> Self {
        Self {
            max_bytes: (megabytes as usize) * 1024 * 1024,
        }
    }
}

/// Reasons an upload is refused before any record is created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("only PDF files are allowed, got content type '{0}'")]
    UnsupportedContentType(String),
    #[error("only PDF files are allowed, got filename '{0}'")]
    UnsupportedExtension(String),
    #[error("file does not look like a PDF document")]
    MissingPdfSignature,
    #[error("file is empty")]
    Empty,
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
}

/// Check an incoming byte stream is a well-formed, acceptably-sized PDF.
///
/// The declared content type and the filename extension are both checked;
/// neither is trustworthy alone, and together with the signature they catch
/// accidental non-PDF uploads without structural inspection.
pub fn validate_pdf(
    filename: Option<&str>,
    content_type: Option<&str>,
    bytes: &[u8],
    limits: UploadLimits,
) -> Result<(), UploadError> {
    let declared = content_type.unwrap_or_default();
    if !declares_pdf(declared) {
        return Err(UploadError::UnsupportedContentType(declared.to_string()));
    }

    if let Some(name) = filename {
        let lowered = name.to_ascii_lowercase();
        if !lowered.ends_with(".pdf") {
            return Err(UploadError::UnsupportedExtension(name.to_string()));
        }
    }

    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if bytes.len() > limits.max_bytes {
        return Err(UploadError::TooLarge {
            size: bytes.len(),
            limit: limits.max_bytes,
        });
    }
    if !bytes.starts_with(PDF_SIGNATURE) {
        return Err(UploadError::MissingPdfSignature);
    }

    Ok(())
}

/// The declared type must be exactly `application/pdf`; parameters such as
/// charset are ignored.
fn declares_pdf(declared: &str) -> bool {
    declared
        .parse::<mime::Mime>()
        .map(|value| value.type_() == mime::APPLICATION && value.subtype() == "pdf")
        .unwrap_or(false)
}
