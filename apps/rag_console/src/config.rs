use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use serde::Deserialize;
use shared::protocol::{DEFAULT_MAX_TOKENS, DEFAULT_TOP_K};
use url::Url;

use crate::controller::orchestration::QueryLimits;

const LOCAL_CONFIG_FILE: &str = "rag_console.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub origin: String,
    pub log_filter: String,
    pub top_k: u32,
    pub max_tokens: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:8000".into(),
            log_filter: "info".into(),
            top_k: DEFAULT_TOP_K,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    origin: Option<String>,
    log_filter: Option<String>,
    top_k: Option<u32>,
    max_tokens: Option<u32>,
}

impl Settings {
    pub fn origin_url(&self) -> anyhow::Result<Url> {
        normalize_origin(&self.origin)
    }

    pub fn query_limits(&self) -> QueryLimits {
        QueryLimits {
            top_k: self.top_k,
            max_tokens: self.max_tokens,
        }
    }

    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.origin {
            self.origin = v;
        }
        if let Some(v) = file.log_filter {
            self.log_filter = v;
        }
        if let Some(v) = file.top_k {
            self.top_k = v;
        }
        if let Some(v) = file.max_tokens {
            self.max_tokens = v;
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("RAG_CONSOLE_ORIGIN") {
            self.origin = v;
        }
        if let Some(v) = lookup("APP__ORIGIN") {
            self.origin = v;
        }
        if let Some(v) = lookup("APP__LOG_FILTER") {
            self.log_filter = v;
        }
        if let Some(parsed) = lookup("APP__TOP_K").and_then(|v| v.parse::<u32>().ok()) {
            self.top_k = parsed;
        }
        if let Some(parsed) = lookup("APP__MAX_TOKENS").and_then(|v| v.parse::<u32>().ok()) {
            self.max_tokens = parsed;
        }
    }
}

/// Defaults, then the config file, then the environment.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(path) = config_file_path(explicit_path) {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?;
        settings.apply_file(file_cfg);
    }

    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}

fn config_file_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("rag_console").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Accepts `host:port`, `http://host:port/` and the like; only http(s)
/// origins with a host are valid.
pub fn normalize_origin(raw: &str) -> anyhow::Result<Url> {
    let raw = raw.trim().trim_end_matches('/');
    let raw = if raw.is_empty() {
        Settings::default().origin
    } else if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    let url = Url::parse(&raw).with_context(|| format!("invalid API origin '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("API origin '{raw}' must use http or https");
    }
    if url.host_str().is_none() {
        bail!("API origin '{raw}' has no host");
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
