//! Configuration management for the fileshare server

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Default maximum number of files in one package
pub const DEFAULT_MAX_FILES: usize = 10;

/// Default maximum size of a single uploaded file: 10MB
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub upload: UploadConfig,
    /// Overrides the scheme and host used when building share links
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_files: usize,
    pub max_file_size: usize,
}

impl UploadConfig {
    /// Request body limit covering a full package plus multipart framing
    pub fn body_limit(&self) -> usize {
        self.max_files
            .saturating_mul(self.max_file_size)
            .saturating_add(1024 * 1024)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "sqlite:./fileshare.db".to_string(),
                max_connections: 5,
            },
            upload: UploadConfig {
                max_files: DEFAULT_MAX_FILES,
                max_file_size: DEFAULT_MAX_FILE_SIZE,
            },
            public_base_url: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let port_var = env::var("PORT").or_else(|_| env::var("SERVER_PORT"));

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_or(port_var.ok(), "PORT", defaults.server.port),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: parse_or(
                    env::var("DATABASE_MAX_CONNECTIONS").ok(),
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.database.max_connections,
                ),
            },
            upload: UploadConfig {
                max_files: parse_or(
                    env::var("MAX_FILES").ok(),
                    "MAX_FILES",
                    defaults.upload.max_files,
                ),
                max_file_size: parse_or(
                    env::var("MAX_FILE_SIZE").ok(),
                    "MAX_FILE_SIZE",
                    defaults.upload.max_file_size,
                ),
            },
            public_base_url: env::var("PUBLIC_BASE_URL")
                .ok()
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
        }
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(raw: Option<String>, name: &str, default: T) -> T {
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using {}", name, value, default);
            default
        }),
    }
}
