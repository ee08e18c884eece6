//! # Configuration
//!
//! Configuration is loaded once at startup by [`confique`], layered in
//! priority order:
//! 1. **Environment variables** (a `.env` file is read first by the binary)
//! 2. **Project file**: `./jotter.toml`
//! 3. **Global file**: `jotter.toml` in the OS config directory
//! 4. **Compiled defaults**
//!
//! ## Available Settings
//!
//! | Key | Env | Default |
//! |-----|-----|---------|
//! | `api_base` | `JOTTER_API_BASE` | unset |
//! | `backend_url` | `JOTTER_BACKEND_URL` | unset |
//! | `environment` | `JOTTER_ENV` | `production` |
//! | `log_level` | `JOTTER_LOG_LEVEL` | `info` |
//! | `feature_flags` | `JOTTER_FEATURE_FLAGS` | unset |
//! | `experiments_enabled` | `JOTTER_EXPERIMENTS_ENABLED` | unset |
//! | `request_timeout_secs` | `JOTTER_REQUEST_TIMEOUT_SECS` | `30` |
//!
//! The store only needs [`AppConfig::base_url`]; everything else is for the
//! binary.

use crate::error::Result;
use confique::Config;
use directories::ProjectDirs;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "jotter.toml";
const DEFAULT_API_PATH: &str = "/api";
const DEFAULT_ORIGIN: &str = "http://localhost:3000";

#[derive(Config, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base of the notes API, absolute or a path such as "/api"
    #[config(env = "JOTTER_API_BASE")]
    pub api_base: Option<String>,

    /// Origin of the backend; also the fallback API base
    #[config(env = "JOTTER_BACKEND_URL")]
    pub backend_url: Option<String>,

    #[config(env = "JOTTER_ENV", default = "production")]
    pub environment: String,

    #[config(env = "JOTTER_LOG_LEVEL", default = "info")]
    pub log_level: String,

    /// Comma separated flags: "a=true,b=false,c"
    #[config(env = "JOTTER_FEATURE_FLAGS")]
    pub feature_flags: Option<String>,

    #[config(env = "JOTTER_EXPERIMENTS_ENABLED")]
    pub experiments_enabled: Option<String>,

    #[config(env = "JOTTER_REQUEST_TIMEOUT_SECS", default = 30)]
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            backend_url: None,
            environment: "production".to_string(),
            log_level: "info".to_string(),
            feature_flags: None,
            experiments_enabled: None,
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Environment, then the project file, then the global file.
    pub fn load() -> Result<Self> {
        let mut builder = Self::builder().env().file(CONFIG_FILENAME);
        if let Some(global) = global_config_path() {
            builder = builder.file(global);
        }
        Ok(builder.load()?)
    }

    /// Environment over a single file. Missing files are skipped.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::builder().env().file(path.as_ref()).load()?)
    }

    /// Resolved notes API base: `api_base`, else `backend_url`, else `/api`.
    /// Relative paths are joined onto the backend origin.
    pub fn base_url(&self) -> String {
        let backend = non_empty(&self.backend_url);
        let base = non_empty(&self.api_base)
            .or(backend)
            .unwrap_or(DEFAULT_API_PATH);

        let resolved = if base.starts_with('/') {
            let origin = backend
                .filter(|b| !b.starts_with('/'))
                .unwrap_or(DEFAULT_ORIGIN);
            format!("{}{}", origin.trim_end_matches('/'), base)
        } else {
            base.to_string()
        };
        resolved.trim_end_matches('/').to_string()
    }

    pub fn feature_flags(&self) -> BTreeMap<String, bool> {
        self.feature_flags
            .as_deref()
            .map(parse_flags)
            .unwrap_or_default()
    }

    pub fn is_enabled(&self, flag: &str) -> bool {
        self.feature_flags().get(flag).copied().unwrap_or(false)
    }

    pub fn experiments_enabled(&self) -> bool {
        self.experiments_enabled
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or(false)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "jotter", "jotter").map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Accepts 1/true/yes/y/on and 0/false/no/n/off, case-insensitively.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// A bare key means enabled; an unparseable value means disabled.
pub fn parse_flags(value: &str) -> BTreeMap<String, bool> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let (key, val) = match part.split_once('=') {
                Some((key, val)) => (key.trim(), Some(val)),
                None => (part, None),
            };
            if key.is_empty() {
                return None;
            }
            let enabled = val.map_or(true, |v| parse_bool(v).unwrap_or(false));
            Some((key.to_string(), enabled))
        })
        .collect()
}
