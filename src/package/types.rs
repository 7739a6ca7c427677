//! Package data model

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// One uploaded file: metadata plus raw content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Original filename as sent by the client
    pub name: String,

    /// Declared content type
    pub mime_type: String,

    /// Raw file bytes
    pub content: Vec<u8>,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content,
        }
    }

    /// Byte count of the content
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// A set of files uploaded together under one id
///
/// Fields are private so a package can only be built from a non-empty
/// file list; after construction it is read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    id: String,
    files: Vec<FileEntry>,
    uploaded_at: DateTime<Utc>,
}

impl Package {
    /// Build a package, rejecting an empty file set
    ///
    /// `uploaded_at` is truncated to milliseconds, the precision it is
    /// stored with, so a package reads back exactly as it was written.
    pub fn new(id: String, files: Vec<FileEntry>, uploaded_at: DateTime<Utc>) -> Result<Self> {
        if files.is_empty() {
            return Err(AppError::EmptyUpload);
        }

        Ok(Self {
            id,
            files,
            uploaded_at: uploaded_at.trunc_subsecs(3),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Files in upload order
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn into_files(self) -> Vec<FileEntry> {
        self.files
    }
}

/// Per-file metadata shown in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// Package metadata without any file content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSummary {
    pub id: String,
    pub file_count: usize,
    pub files: Vec<FileSummary>,
    pub uploaded_at: DateTime<Utc>,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub id: String,
    pub file_count: usize,
}

/// One file in a multi-file download, content left encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: u64,
    pub data: String,
}

/// Download result
///
/// A single-file package is delivered as the file itself. Packages with
/// more than one file come back as a manifest whose entries still carry
/// encoded content; callers decode each entry on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Download {
    Single {
        name: String,
        mime_type: String,
        content: Vec<u8>,
    },
    Manifest {
        file_count: usize,
        files: Vec<ManifestEntry>,
    },
}
