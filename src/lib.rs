//! Fileshare Server Library
//!
//! Upload one or more files as a single package, then fetch, list or
//! delete it by id.
//!
//! # Modules
//!
//! - `package`: package model, id generation, payload codec and service rules
//! - `db`: SQLite pool, schema and the package store
//! - `routes`: axum HTTP surface

pub mod config;
pub mod db;
pub mod error;
pub mod package;
pub mod routes;
pub mod state;
