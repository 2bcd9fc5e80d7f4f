use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "chat.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    pub api_url: String,
    pub greeting: String,
    pub error_text: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api/chat".into(),
            greeting: "😂 Welcome! I am Jokester Bot, your over-the-top, witty, and complicated answer machine. Ask me anything—math, facts, or just for a laugh!".into(),
            error_text: "⚠️ Sorry, I could not reach the server.".into(),
        }
    }
}

impl ChatSettings {
    /// Checks the settings and returns the parsed endpoint.
    pub fn validate(&self) -> Result<Url, ConfigError> {
        if self.greeting.trim().is_empty() {
            return Err(ConfigError::Empty("greeting"));
        }
        if self.error_text.trim().is_empty() {
            return Err(ConfigError::Empty("error_text"));
        }
        parse_api_url(&self.api_url)
    }
}

/// Defaults, then `path` (if it exists), then process environment.
pub fn load_settings(path: &Path) -> Result<ChatSettings, ConfigError> {
    let mut settings = ChatSettings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file_overrides(&mut settings, &raw, path)?,
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub(crate) fn apply_file_overrides(
    settings: &mut ChatSettings,
    raw: &str,
    path: &Path,
) -> Result<(), ConfigError> {
    let file_cfg =
        toml::from_str::<HashMap<String, String>>(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::from(path),
            source,
        })?;

    if let Some(v) = file_cfg.get("api_url") {
        settings.api_url = v.clone();
    }
    if let Some(v) = file_cfg.get("greeting") {
        settings.greeting = v.clone();
    }
    if let Some(v) = file_cfg.get("error_text") {
        settings.error_text = v.clone();
    }
    Ok(())
}

/// `APP__*` wins over the short `CHAT_*` names when both are set.
pub(crate) fn apply_env_overrides(
    settings: &mut ChatSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("CHAT_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = lookup("CHAT_GREETING") {
        settings.greeting = v;
    }
    if let Some(v) = lookup("APP__GREETING") {
        settings.greeting = v;
    }

    if let Some(v) = lookup("CHAT_ERROR_TEXT") {
        settings.error_text = v;
    }
    if let Some(v) = lookup("APP__ERROR_TEXT") {
        settings.error_text = v;
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        value: raw.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
