use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::export::{DateFormat, Delimiter, ExportOptions};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub filename_base: String,
    pub delimiter: Delimiter,
    pub include_headers: bool,
    pub date_format: DateFormat,
    pub page_size: usize,
    pub preview_rows: usize,
    pub history_capacity: usize,
    pub history_key: String,
    /// Directory for the persisted history; empty selects a temp-dir default.
    #[serde(default)]
    pub storage_dir: String,
}

impl Config {
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            delimiter: self.delimiter,
            include_headers: self.include_headers,
            date_format: self.date_format,
        }
    }

    pub fn storage_dir(&self) -> PathBuf {
        if self.storage_dir.trim().is_empty() {
            std::env::temp_dir().join("offerexport")
        } else {
            PathBuf::from(&self.storage_dir)
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub config_hash: String,
}

pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig> {
    let bytes: Vec<u8> = if let Some(p) = path {
        std::fs::read(p).with_context(|| format!("read config {}", p.display()))?
    } else {
        include_bytes!("../config/default.yml").to_vec()
    };

    let mut config: Config = serde_yaml::from_slice(&bytes).context("parse config")?;
    if config.filename_base.trim().is_empty() {
        config.filename_base = "export".to_string();
    }
    config.page_size = config.page_size.max(1);
    config.history_capacity = config.history_capacity.max(1);

    let config_hash = hash_bytes(&bytes);

    Ok(LoadedConfig { config, config_hash })
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    hex::encode(digest)
}
