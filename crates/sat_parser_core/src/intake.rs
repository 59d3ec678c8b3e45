use std::fmt;
use std::path::{Path, PathBuf};

use crate::view_model::format_file_size;

/// Upper bound for a single document: 10 MiB.
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// MIME type reported for files whose extension is not recognised.
pub const UNKNOWN_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
    PlainText,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::Pdf,
        DocumentKind::Doc,
        DocumentKind::Docx,
        DocumentKind::PlainText,
    ];

    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Doc => "application/msword",
            DocumentKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentKind::PlainText => "text/plain",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Doc => "doc",
            DocumentKind::Docx => "docx",
            DocumentKind::PlainText => "txt",
        }
    }

    /// Exact match on the MIME essence; parameters such as `; charset=utf-8` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.mime_type().eq_ignore_ascii_case(essence))
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.extension().eq_ignore_ascii_case(ext))
    }

    /// Declared MIME type for a local path, mirroring the upload widget's accept map.
    pub fn mime_for_path(path: &Path) -> &'static str {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .map_or(UNKNOWN_MIME, Self::mime_type)
    }
}

/// A file offered for upload, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub location: PathBuf,
}

impl FileCandidate {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: u64,
        location: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
            location: location.into(),
        }
    }
}

/// A validated file waiting for the user to trigger the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub kind: DocumentKind,
    pub size_bytes: u64,
    pub location: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakePolicy {
    pub max_file_bytes: u64,
    pub allowed: Vec<DocumentKind>,
}

impl Default for IntakePolicy {
    fn default() -> Self {
        Self {
            max_file_bytes: MAX_FILE_BYTES,
            allowed: DocumentKind::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UnsupportedType { mime_type: String },
    TooLarge { name: String, max_bytes: u64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnsupportedType { mime_type } => write!(
                f,
                "File type {mime_type} is not supported. Please use PDF, DOC, DOCX, or TXT files."
            ),
            RejectReason::TooLarge { name, max_bytes } => write!(
                f,
                "File {name} is too large. Maximum size is {}.",
                format_file_size(*max_bytes)
            ),
        }
    }
}

/// Type is checked before size; a file exactly at the limit is accepted.
pub fn validate_file(
    candidate: &FileCandidate,
    policy: &IntakePolicy,
) -> Result<DocumentKind, RejectReason> {
    let kind = DocumentKind::from_mime(&candidate.mime_type)
        .filter(|kind| policy.allowed.contains(kind))
        .ok_or_else(|| RejectReason::UnsupportedType {
            mime_type: candidate.mime_type.clone(),
        })?;

    if candidate.size_bytes > policy.max_file_bytes {
        return Err(RejectReason::TooLarge {
            name: candidate.name.clone(),
            max_bytes: policy.max_file_bytes,
        });
    }

    Ok(kind)
}
