//! Package service
//!
//! Business rules above the store: building packages from uploads and
//! shaping downloads.

use std::sync::Arc;

use chrono::Utc;

use super::codec;
use super::id;
use super::types::{Download, FileEntry, Package, PackageSummary, UploadReceipt};
use crate::db::PackageStore;
use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct PackageService {
    store: Arc<dyn PackageStore>,
}

impl PackageService {
    pub fn new(store: Arc<dyn PackageStore>) -> Self {
        Self { store }
    }

    /// Store a new package built from `files`, keeping their order
    pub async fn upload(&self, files: Vec<FileEntry>) -> Result<UploadReceipt> {
        if files.is_empty() {
            return Err(AppError::EmptyUpload);
        }

        let total_bytes: u64 = files.iter().map(FileEntry::size).sum();
        let package = Package::new(id::generate(), files, Utc::now())?;

        self.store.put(&package).await?;

        tracing::info!(
            package_id = %package.id(),
            file_count = package.file_count(),
            bytes = total_bytes,
            "Package uploaded"
        );

        Ok(UploadReceipt {
            id: package.id().to_string(),
            file_count: package.file_count(),
        })
    }

    /// Fetch a package for delivery
    ///
    /// Exactly one file comes back raw; anything more comes back as a
    /// manifest of still-encoded entries.
    pub async fn download(&self, id: &str) -> Result<Download> {
        let package = self.store.get(id).await?;

        if package.file_count() == 1 {
            let file = package
                .into_files()
                .into_iter()
                .next()
                .ok_or_else(|| AppError::Internal("single-file package has no file".to_string()))?;

            return Ok(Download::Single {
                name: file.name,
                mime_type: file.mime_type,
                content: file.content,
            });
        }

        Ok(Download::Manifest {
            file_count: package.file_count(),
            files: codec::manifest_entries(package.files()),
        })
    }

    pub async fn list_all(&self) -> Result<Vec<PackageSummary>> {
        self.store.list().await
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(id.to_string()));
        }

        tracing::info!(package_id = %id, "Package deleted");
        Ok(())
    }
}
