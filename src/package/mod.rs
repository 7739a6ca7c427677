//! Packages: groups of files uploaded together under one shareable id
//!
//! - `id`: package id generation
//! - `codec`: content encoding and the stored document schema
//! - `service`: upload, download, listing and deletion rules

pub mod codec;
pub mod id;
pub mod service;
pub mod types;

pub use service::PackageService;
pub use types::*;
