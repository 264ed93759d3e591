use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "blog.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3006/blog/v1".into(),
            request_timeout_ms: 5000,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Applies command-line overrides on top of loaded settings and checks the
    /// result again.
    pub fn with_overrides(
        mut self,
        api_base_url: Option<String>,
        request_timeout_ms: Option<u64>,
    ) -> anyhow::Result<Self> {
        if let Some(v) = api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = request_timeout_ms {
            self.request_timeout_ms = v;
        }
        self.validated()
    }

    fn validated(mut self) -> anyhow::Result<Self> {
        self.api_base_url = normalize_base_url(&self.api_base_url);
        if self.api_base_url.is_empty() {
            bail!("api base url must not be empty");
        }
        if self.request_timeout_ms == 0 {
            bail!("request timeout must be greater than zero");
        }
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_ms: Option<u64>,
}

/// Defaults, then `blog.toml` in the working directory, then the environment.
pub fn load_settings() -> anyhow::Result<ClientSettings> {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE), |key| {
        std::env::var(key).ok()
    })
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("malformed settings file '{}'", path.display()))?;
        if let Some(v) = file_cfg.api_base_url {
            settings.api_base_url = v;
        }
        if let Some(v) = file_cfg.request_timeout_ms {
            settings.request_timeout_ms = v;
        }
    }

    if let Some(v) = env("BLOG_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_MS") {
        settings.request_timeout_ms = v
            .trim()
            .parse()
            .with_context(|| format!("APP__REQUEST_TIMEOUT_MS is not a number: '{v}'"))?;
    }

    settings.validated()
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
