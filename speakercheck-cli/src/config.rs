use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Client configuration loaded from file and/or environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub token_path: PathBuf,
}

/// Raw TOML file structure for `~/.config/speakercheck/client.toml`.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    api_url: Option<String>,
    token_path: Option<PathBuf>,
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("speakercheck")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("client.toml")
}

pub fn default_token_path() -> PathBuf {
    config_dir().join("token")
}

impl ClientConfig {
    /// Load configuration; `SPEAKERCHECK_API_URL` overrides the file.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);

        let file_config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ConfigFile>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        } else {
            ConfigFile::default()
        };

        let api_url = std::env::var("SPEAKERCHECK_API_URL")
            .ok()
            .or(file_config.api_url);
        Ok(Self::build(api_url, file_config.token_path))
    }

    fn build(api_url: Option<String>, token_path: Option<PathBuf>) -> Self {
        let api_url = api_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token_path: token_path.unwrap_or_else(default_token_path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_defaults() {
        let config = ClientConfig::build(None, None);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.token_path.ends_with("speakercheck/token"));
    }

    #[test]
    fn test_build_trims_trailing_slash_and_ignores_blank() {
        let config = ClientConfig::build(Some("http://speakers.example/api/".to_string()), None);
        assert_eq!(config.api_url, "http://speakers.example/api");

        let config = ClientConfig::build(Some("  ".to_string()), None);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_parse_config_toml() {
        let file: ConfigFile = toml::from_str(
            r#"
api_url = "https://speakers.example/api"
token_path = "/tmp/speakercheck-token"
"#,
        )
        .unwrap();
        assert_eq!(file.api_url.as_deref(), Some("https://speakers.example/api"));
        assert_eq!(file.token_path, Some(PathBuf::from("/tmp/speakercheck-token")));
    }
}
