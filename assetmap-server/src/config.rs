//! Server configuration resolution
//!
//! Combines command-line overrides, environment, the TOML bootstrap file and
//! compiled defaults into one [`ServerConfig`].
//!
//! **Priority:** CLI → ENV → TOML → compiled defaults

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use assetmap_common::config::{
    CompiledDefaults, RootFolderInitializer, RootFolderResolver, StorageMode, TomlConfig,
};
use assetmap_common::{Error, Result};
use tracing::debug;

/// Values given on the command line (or their env fallbacks)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub root_folder: Option<PathBuf>,
    pub storage: Option<StorageMode>,
}

/// Fully resolved server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub root_folder: PathBuf,
    pub storage: StorageMode,
    /// Ledger file; only used with [`StorageMode::File`]
    pub ledger_path: PathBuf,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn resolve(cli: CliOverrides, toml_config: &TomlConfig) -> Result<Self> {
        let defaults = CompiledDefaults::for_current_platform();

        let root_folder = RootFolderResolver::new("assetmap-server")
            .with_cli_arg(cli.root_folder)
            .with_toml_root(toml_config.root_folder.clone())
            .resolve();

        let bind_address = cli
            .bind_address
            .or_else(|| toml_config.bind_address.clone())
            .unwrap_or(defaults.bind_address);
        let ip: IpAddr = bind_address.trim().parse().map_err(|_| {
            Error::Config(format!("Invalid bind address: {}", bind_address))
        })?;
        let port = cli.port.or(toml_config.port).unwrap_or(defaults.port);

        let storage = cli
            .storage
            .or(toml_config.storage)
            .unwrap_or(defaults.storage);

        let ledger_path = RootFolderInitializer::new(root_folder.clone())
            .ledger_path(toml_config.ledger_file.as_deref());

        let max_upload_bytes = toml_config
            .max_upload_bytes
            .unwrap_or(defaults.max_upload_bytes);
        if max_upload_bytes == 0 {
            return Err(Error::Config(
                "max_upload_bytes must be greater than zero".to_string(),
            ));
        }

        let config = Self {
            listen_addr: SocketAddr::new(ip, port),
            root_folder,
            storage,
            ledger_path,
            max_upload_bytes,
        };
        debug!(?config, "Resolved server configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explicit_root() -> CliOverrides {
        CliOverrides {
            root_folder: Some(PathBuf::from("/srv/assetmap")),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_apply() {
        let config = ServerConfig::resolve(explicit_root(), &TomlConfig::default()).unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:5780".parse::<SocketAddr>().unwrap());
        assert_eq!(config.storage, StorageMode::File);
        assert_eq!(config.ledger_path, PathBuf::from("/srv/assetmap/assets.json"));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_cli_beats_toml() {
        let toml_config = TomlConfig {
            port: Some(6000),
            bind_address: Some("0.0.0.0".into()),
            storage: Some(StorageMode::File),
            ..Default::default()
        };
        let cli = CliOverrides {
            port: Some(7000),
            storage: Some(StorageMode::Memory),
            ..explicit_root()
        };

        let config = ServerConfig::resolve(cli, &toml_config).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:7000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.storage, StorageMode::Memory);
    }

    #[test]
    fn test_toml_ledger_file_and_limit() {
        let toml_config = TomlConfig {
            ledger_file: Some(PathBuf::from("data/ledger.json")),
            max_upload_bytes: Some(2048),
            ..Default::default()
        };

        let config = ServerConfig::resolve(explicit_root(), &toml_config).unwrap();
        assert_eq!(
            config.ledger_path,
            PathBuf::from("/srv/assetmap/data/ledger.json")
        );
        assert_eq!(config.max_upload_bytes, 2048);
    }

    #[test]
    fn test_invalid_bind_address() {
        let cli = CliOverrides {
            bind_address: Some("localhost:80".into()),
            ..explicit_root()
        };

        let err = ServerConfig::resolve(cli, &TomlConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_zero_upload_limit_rejected() {
        let toml_config = TomlConfig {
            max_upload_bytes: Some(0),
            ..Default::default()
        };

        assert!(ServerConfig::resolve(explicit_root(), &toml_config).is_err());
    }
}
