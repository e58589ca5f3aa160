use crate::constants::{
    DEFAULT_CONFIG_PATH, DEFAULT_DATA_TIMEOUT_SECS, DEFAULT_FEATURES, DEFAULT_LISTEN_ADDRESS,
    DEFAULT_LISTEN_PORT, DEFAULT_TRANSFER_BUFFER_SIZE, HOME_ENV_VARS,
};
use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    pub root_dir: Option<String>, // Falls back to the home directory when unset
    pub transfer_buffer_size: usize,
    pub data_timeout_secs: u64, // 0 disables the data-connection timeout
    pub features: Vec<String>,
    pub banner_file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from(DEFAULT_LISTEN_ADDRESS),
            listen_port: DEFAULT_LISTEN_PORT,
            root_dir: None,
            transfer_buffer_size: DEFAULT_TRANSFER_BUFFER_SIZE,
            data_timeout_secs: DEFAULT_DATA_TIMEOUT_SECS,
            features: DEFAULT_FEATURES.iter().map(|f| f.to_string()).collect(),
            banner_file: None,
        }
    }
}

impl ServerConfig {
    /// Idle timeout for data connections, `None` when disabled.
    pub fn data_timeout(&self) -> Option<Duration> {
        match self.data_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Resolves the sandbox root: `root_dir` if set, otherwise the first
    /// home-directory variable found in the environment. The result is
    /// canonicalized so later containment checks compare like with like.
    pub fn resolve_root(&self) -> Result<PathBuf> {
        let raw = match &self.root_dir {
            Some(dir) => PathBuf::from(dir),
            None => HOME_ENV_VARS
                .iter()
                .find_map(|var| std::env::var_os(var))
                .map(PathBuf::from)
                .ok_or_else(|| anyhow!("No root directory configured and no home directory in the environment"))?,
        };
        let root = raw
            .canonicalize()
            .with_context(|| format!("Root directory is not accessible: {:?}", raw))?;
        if !root.is_dir() {
            return Err(anyhow!("Root path is not a directory: {:?}", root));
        }
        Ok(root)
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {:?}", path))?;
        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {:?}", path))
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;
        Ok(config)
    }

    /// Loads the configuration named on the command line, or the default file
    /// when present. A missing default file is not an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load_from_file(default_path)
                } else {
                    warn!(
                        "No configuration file at {:?}, using built-in defaults",
                        default_path
                    );
                    Ok(Self::default())
                }
            }
        }
    }
}

// Helper function to log configuration options
pub fn log_config(config: &Config, root: &Path) {
    info!("  Listen Address: {}", config.server.listen_address);
    info!("  Listen Port: {}", config.server.listen_port);
    info!("  Root Directory: {:?}", root);
    info!(
        "  Transfer Buffer Size: {} KB",
        config.server.transfer_buffer_size / 1024
    );
    info!("  Data Timeout: {}s", config.server.data_timeout_secs);
    info!("  Features: {}", config.server.features.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.listen_port, DEFAULT_LISTEN_PORT);
        assert_eq!(config.server.transfer_buffer_size, 64 * 1024);
        assert!(config.server.root_dir.is_none());
        assert!(config.server.features.iter().any(|f| f == "UTF8"));
    }

    #[test]
    fn test_partial_server_table() {
        let config = Config::from_toml(
            r#"
            [server]
            listen_port = 2121
            root_dir = "/srv/ftp"
            data_timeout_secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.server.listen_port, 2121);
        assert_eq!(config.server.root_dir.as_deref(), Some("/srv/ftp"));
        assert_eq!(config.server.listen_address, DEFAULT_LISTEN_ADDRESS);
        assert!(config.server.data_timeout().is_none());
    }

    #[test]
    fn test_resolve_root_override() {
        let tmp = tempfile::tempdir().unwrap();
        let server = ServerConfig {
            root_dir: Some(tmp.path().to_string_lossy().into_owned()),
            ..ServerConfig::default()
        };
        let root = server.resolve_root().unwrap();
        assert_eq!(root, tmp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_resolve_root_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let server = ServerConfig {
            root_dir: Some(tmp.path().join("nope").to_string_lossy().into_owned()),
            ..ServerConfig::default()
        };
        assert!(server.resolve_root().is_err());
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(Config::from_toml("[server]\nlisten_port = \"abc\"").is_err());
    }

    #[test]
    fn test_sample_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("etc/rouillevfsd.conf");
        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.server.listen_port, 2100);
        assert_eq!(config.server.data_timeout(), Some(Duration::from_secs(300)));
        assert!(config.server.banner_file.is_none());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.conf");
        assert!(Config::load(Some(missing.as_path())).is_err());
    }
}
