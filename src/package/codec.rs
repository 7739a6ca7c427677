//! Payload codec and package record schema
//!
//! File content is stored as standard base64 inside a JSON document:
//!
//! ```json
//! { "id": "...", "files": [{ "name": "...", "type": "...", "size": 3, "data": "AAEC" }],
//!   "uploadedAt": "2026-10-18T12:00:00.000Z" }
//! ```

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::types::{FileEntry, FileSummary, ManifestEntry, Package, PackageSummary};
use crate::error::AppError;

/// Why a stored document could not be turned back into a package
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("invalid package document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("package has no files")]
    NoFiles,

    #[error("file {index} has invalid content encoding: {source}")]
    InvalidContent {
        index: usize,
        source: base64::DecodeError,
    },

    #[error("file {index} declares {declared} bytes but holds {actual}")]
    SizeMismatch {
        index: usize,
        declared: u64,
        actual: u64,
    },
}

impl CodecError {
    /// Attach the record id this error was found in
    pub fn for_record(self, id: &str) -> AppError {
        AppError::malformed(id, self)
    }
}

/// Encode raw bytes as document-safe text
pub fn encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode text produced by [`encode`]
pub fn decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64.decode(text)
}

/// Timestamp format shared by the document and the `uploaded_at` column
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PackageDocumentRef<'a> {
    id: &'a str,
    files: Vec<FileDocumentRef<'a>>,
    uploaded_at: String,
}

#[derive(Serialize)]
struct FileDocumentRef<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    mime_type: &'a str,
    size: u64,
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageDocument {
    id: String,
    files: Vec<FileDocument>,
    uploaded_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct FileDocument {
    name: String,
    #[serde(rename = "type")]
    mime_type: String,
    size: u64,
    data: String,
}

/// Metadata-only view of a stored document; `data` is never read
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDocument {
    id: String,
    files: Vec<FileSummary>,
    uploaded_at: DateTime<Utc>,
}

/// Serialize a package into its stored JSON document
pub fn serialize_package(package: &Package) -> Result<String, CodecError> {
    let document = PackageDocumentRef {
        id: package.id(),
        files: package
            .files()
            .iter()
            .map(|file| FileDocumentRef {
                name: &file.name,
                mime_type: &file.mime_type,
                size: file.size(),
                data: encode(&file.content),
            })
            .collect(),
        uploaded_at: format_timestamp(package.uploaded_at()),
    };

    Ok(serde_json::to_string(&document)?)
}

/// Parse and validate a stored JSON document
pub fn deserialize_package(document: &str) -> Result<Package, CodecError> {
    let document: PackageDocument = serde_json::from_str(document)?;

    if document.files.is_empty() {
        return Err(CodecError::NoFiles);
    }

    let files = document
        .files
        .into_iter()
        .enumerate()
        .map(|(index, file)| {
            let content = decode(&file.data)
                .map_err(|source| CodecError::InvalidContent { index, source })?;

            let actual = content.len() as u64;
            if actual != file.size {
                return Err(CodecError::SizeMismatch {
                    index,
                    declared: file.size,
                    actual,
                });
            }

            Ok(FileEntry::new(file.name, file.mime_type, content))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Package::new(document.id, files, document.uploaded_at).map_err(|_| CodecError::NoFiles)
}

/// Parse only the metadata of a stored document
pub fn deserialize_summary(document: &str) -> Result<PackageSummary, CodecError> {
    let document: SummaryDocument = serde_json::from_str(document)?;

    if document.files.is_empty() {
        return Err(CodecError::NoFiles);
    }

    Ok(PackageSummary {
        id: document.id,
        file_count: document.files.len(),
        files: document.files,
        uploaded_at: document.uploaded_at,
    })
}

/// Build manifest entries, re-encoding each file's content
pub fn manifest_entries(files: &[FileEntry]) -> Vec<ManifestEntry> {
    files
        .iter()
        .map(|file| ManifestEntry {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.size(),
            data: encode(&file.content),
        })
        .collect()
}
