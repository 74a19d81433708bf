use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Default listen address.
pub const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::V4(std::net::SocketAddrV4::new(std::net::Ipv4Addr::LOCALHOST, 3003));

/// Default upper bound on request bodies (1 GiB).
pub const DEFAULT_MAX_BUNDLE_SIZE: usize = 1024 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Largest accepted request body, in bytes.
    pub max_bundle_size: usize,
    pub storage: StorageConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR,
            max_bundle_size: DEFAULT_MAX_BUNDLE_SIZE,
            storage: StorageConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load and validate a TOML configuration file.
    pub fn from_file(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate TOML configuration text.
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.max_bundle_size == 0 {
            return Err(ServerError::Config(
                "max_bundle_size must be greater than zero".into(),
            ));
        }
        if self.storage.backend == StorageBackend::Filesystem && self.storage.data_dir.is_none() {
            return Err(ServerError::Config(
                "filesystem storage requires storage.data_dir".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Blocks and resolver entries live in memory and vanish on exit.
    #[default]
    Memory,
    /// Blocks under `<data_dir>/blocks`, resolver in `<data_dir>/resolver.json`.
    Filesystem,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn blocks_dir(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("blocks"))
    }

    pub fn resolver_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("resolver.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:3003".parse::<SocketAddr>().unwrap());
        assert_eq!(c.max_bundle_size, 1024 * 1024 * 1024);
        assert_eq!(c.storage.backend, StorageBackend::Memory);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_toml_uses_defaults() {
        assert_eq!(ServerConfig::from_toml_str("").unwrap(), ServerConfig::default());
    }

    #[test]
    fn parses_filesystem_storage() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:8080"
            max_bundle_size = 1048576

            [storage]
            backend = "filesystem"
            data_dir = "/var/lib/graph-relay"
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.max_bundle_size, 1_048_576);
        assert_eq!(c.storage.backend, StorageBackend::Filesystem);
        assert_eq!(
            c.storage.blocks_dir(),
            Some(PathBuf::from("/var/lib/graph-relay/blocks"))
        );
        assert_eq!(
            c.storage.resolver_path(),
            Some(PathBuf::from("/var/lib/graph-relay/resolver.json"))
        );
    }

    #[test]
    fn filesystem_without_data_dir_is_rejected() {
        let err = ServerConfig::from_toml_str("[storage]\nbackend = \"filesystem\"\n").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn zero_bundle_limit_is_rejected() {
        assert!(ServerConfig::from_toml_str("max_bundle_size = 0").is_err());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(ServerConfig::from_toml_str("[storage]\nbackend = \"s3\"\n").is_err());
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        std::fs::write(&path, "bind_addr = \"127.0.0.1:4000\"\n").unwrap();
        assert_eq!(ServerConfig::from_file(&path).unwrap().bind_addr.port(), 4000);
    }
}
