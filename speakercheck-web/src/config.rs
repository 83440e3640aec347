use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use speakercheck_data::auth::DEFAULT_COST;
use speakercheck_data::db::default_db_path;

pub const DEFAULT_PORT: u16 = 5000;

/// Server configuration loaded from file and/or environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub db_path: PathBuf,
    pub bcrypt_cost: u32,
}

/// Raw TOML file structure for `~/.config/speakercheck/server.toml`.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    bind_addr: Option<String>,
    port: Option<u16>,
    db_path: Option<PathBuf>,
    bcrypt_cost: Option<u32>,
}

/// Default config file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("speakercheck")
        .join("server.toml")
}

impl ServerConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Priority: environment variables override file values.
    /// File path can be overridden by `config_path` argument.
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

        Self::from_file_and_env(file_config)
    }

    fn from_file_and_env(file_config: ConfigFile) -> Result<Self> {
        let bind_addr = std::env::var("SPEAKERCHECK_BIND_ADDR")
            .ok()
            .or(file_config.bind_addr);
        let port = match std::env::var("SPEAKERCHECK_PORT") {
            Ok(raw) => Some(
                raw.parse::<u16>()
                    .with_context(|| format!("invalid SPEAKERCHECK_PORT '{}'", raw))?,
            ),
            Err(_) => file_config.port,
        };
        let db_path = std::env::var("SPEAKERCHECK_DB_PATH")
            .ok()
            .map(PathBuf::from)
            .or(file_config.db_path);
        let bcrypt_cost = match std::env::var("SPEAKERCHECK_BCRYPT_COST") {
            Ok(raw) => Some(
                raw.parse::<u32>()
                    .with_context(|| format!("invalid SPEAKERCHECK_BCRYPT_COST '{}'", raw))?,
            ),
            Err(_) => file_config.bcrypt_cost,
        };

        Self::build(bind_addr, port, db_path, bcrypt_cost)
    }

    /// Build config from resolved option values (after file + env merging).
    fn build(
        bind_addr: Option<String>,
        port: Option<u16>,
        db_path: Option<PathBuf>,
        bcrypt_cost: Option<u32>,
    ) -> Result<Self> {
        let bind_addr = match bind_addr {
            Some(raw) if !raw.is_empty() => raw
                .parse::<IpAddr>()
                .with_context(|| format!("invalid bind_addr '{}'", raw))?,
            _ => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };
        let bcrypt_cost = bcrypt_cost.unwrap_or(DEFAULT_COST);
        if !(4..=31).contains(&bcrypt_cost) {
            bail!("bcrypt_cost must be between 4 and 31, got {}", bcrypt_cost);
        }

        Ok(Self {
            bind_addr,
            port: port.unwrap_or(DEFAULT_PORT),
            db_path: db_path.unwrap_or_else(default_db_path),
            bcrypt_cost,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
