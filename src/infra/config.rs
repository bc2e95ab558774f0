//! Centralized configuration (environment variables + defaults).
//!
//! Call [`load_dotenv`] once at startup so a local `.env` file can supply any of these.

use anyhow::{anyhow, Context};
use std::path::PathBuf;

pub const DEFAULT_CSV_IMPORT_FILE_PATH: &str = "goodreads_dataset.csv";
pub const DEFAULT_IMPORT_MAX_ROWS: usize = 1000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Which repository backend the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

pub fn load_dotenv() {
    dotenv::dotenv().ok();
}

/// Database URL. Required for the Postgres backend, no default.
pub fn database_url() -> anyhow::Result<String> {
    std::env::var("DATABASE_URL").context("DATABASE_URL must be set")
}

pub fn database_max_connections() -> anyhow::Result<u32> {
    parse_var("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS).map(|n: u32| n.max(1))
}

pub fn storage_kind() -> anyhow::Result<StorageKind> {
    match std::env::var("STORAGE") {
        Err(_) => Ok(StorageKind::Postgres),
        Ok(v) => parse_storage_kind(&v),
    }
}

/// `APP_SKIP_DATA_IMPORT`, default false.
pub fn skip_data_import() -> anyhow::Result<bool> {
    match std::env::var("APP_SKIP_DATA_IMPORT") {
        Err(_) => Ok(false),
        Ok(v) => parse_flag(&v).with_context(|| format!("APP_SKIP_DATA_IMPORT={v:?}")),
    }
}

pub fn csv_import_file_path() -> PathBuf {
    std::env::var("APP_CSV_IMPORT_FILE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CSV_IMPORT_FILE_PATH))
}

pub fn csv_import_max_rows() -> anyhow::Result<usize> {
    parse_var("APP_CSV_IMPORT_MAX_ROWS", DEFAULT_IMPORT_MAX_ROWS)
}

pub fn bind_addr() -> String {
    std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(v) => v
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{name} must be a valid number, got {v:?}: {e}")),
    }
}

pub fn parse_flag(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow!("expected a boolean, got {other:?}")),
    }
}

pub fn parse_storage_kind(value: &str) -> anyhow::Result<StorageKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "postgres" | "" => Ok(StorageKind::Postgres),
        "memory" => Ok(StorageKind::Memory),
        other => Err(anyhow!("STORAGE must be `postgres` or `memory`, got {other:?}")),
    }
}
