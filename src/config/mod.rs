use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::engine::{DecoderConfig, DEFAULT_MAX_DEPTH};
use crate::infrastructure::abi::{DEFAULT_FOURBYTE_URL, DEFAULT_OPENCHAIN_URL, DEFAULT_SOURCIFY_URL};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Nested `bytes` deeper than this stay undecoded
    pub max_depth: usize,

    pub http_timeout_secs: u64,

    pub openchain_url: String,

    pub fourbyte_url: String,

    pub sourcify_url: String,

    /// Roots scanned for Foundry/Hardhat artifacts
    pub abi_paths: Vec<String>,

    /// Skip every remote lookup
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            http_timeout_secs: 10,
            openchain_url: DEFAULT_OPENCHAIN_URL.to_string(),
            fourbyte_url: DEFAULT_FOURBYTE_URL.to_string(),
            sourcify_url: DEFAULT_SOURCIFY_URL.to_string(),
            abi_paths: Vec::new(),
            offline: false,
        }
    }
}

impl Config {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            max_depth: self.max_depth,
        }
    }

    /// Artifact roots to scan. Without configured paths, only the build
    /// output directories of the working directory.
    pub fn abi_scan_roots(&self) -> Vec<PathBuf> {
        if !self.abi_paths.is_empty() {
            return self.abi_paths.iter().filter_map(|raw| expand_path(raw)).collect();
        }
        std::env::current_dir()
            .map(|cwd| default_scan_roots(&cwd))
            .unwrap_or_default()
    }
}

/// `out/` (Foundry) and `artifacts/` (Hardhat) under a project directory
pub fn default_scan_roots(project: &Path) -> Vec<PathBuf> {
    ["out", "artifacts"]
        .iter()
        .map(|name| project.join(name))
        .filter(|dir| dir.is_dir())
        .collect()
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    parse(&content).unwrap_or_else(|err| {
        warn!(path = %path.display(), "ignoring invalid config: {err}");
        Config::default()
    })
}

pub fn parse(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(content)
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("CALLDATA_LENS_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("calldata-lens").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("calldata-lens").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "calldata-lens", "calldata-lens")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn expand_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return Some(home.join(rest));
        }
    }

    let mut buf = PathBuf::from(trimmed);
    if buf.is_relative() {
        if let Ok(cwd) = std::env::current_dir() {
            buf = cwd.join(buf);
        }
    }
    Some(buf)
}
