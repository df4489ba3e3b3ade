//! Configuration module
//!
//! Reads settings from ~/.config/plantwatch/config.toml

use crate::store::MAX_PAGE_SIZE;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_BUCKET: &str = "raspi-galeata";
pub const DEFAULT_REGION: &str = "eu-central-1";
pub const DEFAULT_MAX_KEYS: usize = 10;

/// Which object store the telemetry lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    S3,
    Local,
}

/// Runtime configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bucket holding the telemetry CSV objects
    pub bucket: String,
    pub region: String,
    /// Named AWS profile; the default provider chain is used when unset
    pub profile: Option<String>,
    /// S3-compatible endpoint override
    pub endpoint_url: Option<String>,
    pub backend: Backend,
    /// Root directory for the local backend
    pub local_root: Option<PathBuf>,
    /// How many of the most recent objects to aggregate
    pub max_keys: usize,
    /// Size of the single listing page
    pub page_size: usize,
    /// Where `report` writes its HTML and SVG files
    pub output_dir: PathBuf,
    /// List of disabled tool names (all others are enabled)
    pub disabled: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            region: DEFAULT_REGION.to_string(),
            profile: None,
            endpoint_url: None,
            backend: Backend::default(),
            local_root: None,
            max_keys: DEFAULT_MAX_KEYS,
            page_size: MAX_PAGE_SIZE,
            output_dir: PathBuf::from("plantwatch-report"),
            disabled: Vec::new(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("plantwatch").join("config.toml"))
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            tracing::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::error!("Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::error!("Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Parse TOML contents, filling missing keys with defaults
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Listing page size, clamped to what a single S3 page can hold
    pub fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Check if a tool is enabled
    pub fn is_enabled(&self, tool_name: &str) -> bool {
        !self.disabled.iter().any(|t| t == tool_name)
    }
}

/// Names of every tool the server registers
pub fn all_tool_names() -> Vec<&'static str> {
    vec![
        "list_recent_objects",
        "get_moisture_series",
        "get_records_table",
        "classify_moisture",
        "render_report",
    ]
}
