//! evf-server configuration
//!
//! Resolution order per setting: CLI argument, environment variable,
//! TOML file (`--config`), built-in default. The database URL has no
//! default; a server without a store refuses to start.

use clap::Parser;
use evf_common::config::{load_toml_or_default, LoggingConfig};
use evf_common::{Error, Result};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;

/// Command-line arguments for evf-server
#[derive(Parser, Debug, Default)]
#[command(name = "evf-server")]
#[command(about = "Eventfinder REST backend")]
#[command(version)]
pub struct ServerArgs {
    /// SQLite URL of the document store, e.g. sqlite://eventfinder.db
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Port to listen on [default: 3000]
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind [default: 127.0.0.1]
    #[arg(long, env = "EVF_HOST")]
    pub host: Option<IpAddr>,

    /// Directory of static files served for non-API paths
    #[arg(long, env = "EVF_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = "EVF_SERVER_CONFIG")]
    pub config: Option<PathBuf>,
}

/// TOML config file contents
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerToml {
    pub database_url: Option<String>,
    pub port: Option<u16>,
    pub host: Option<IpAddr>,
    pub static_dir: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Fully resolved server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub static_dir: Option<PathBuf>,
    pub log_level: String,
}

impl ServerConfig {
    pub fn from_args(args: ServerArgs) -> Result<Self> {
        let file: ServerToml = load_toml_or_default(args.config.as_deref())?;

        let database_url = args
            .database_url
            .or(file.database_url)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                Error::Config("DATABASE_URL is not set (use --database-url or the config file)".to_string())
            })?;

        let port = args.port.or(file.port).unwrap_or(DEFAULT_PORT);
        let host = args
            .host
            .or(file.host)
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

        Ok(Self {
            database_url,
            bind_addr: SocketAddr::new(host, port),
            static_dir: args.static_dir.or(file.static_dir),
            log_level: file.logging.level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_missing_database_url_is_fatal() {
        let err = ServerConfig::from_args(ServerArgs::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_defaults_applied() {
        let config = ServerConfig::from_args(ServerArgs {
            database_url: Some("sqlite::memory:".to_string()),
            ..ServerArgs::default()
        })
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.log_level, "info");
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "database_url = \"sqlite://from-file.db\"\nport = 4000\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = ServerConfig::from_args(ServerArgs {
            port: Some(5000),
            config: Some(file.path().to_path_buf()),
            ..ServerArgs::default()
        })
        .unwrap();
        assert_eq!(config.database_url, "sqlite://from-file.db");
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_env_var_read_by_parser() {
        std::env::set_var("DATABASE_URL", "sqlite://from-env.db");
        std::env::set_var("PORT", "3100");
        let args = ServerArgs::try_parse_from(["evf-server"]).unwrap();
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("PORT");

        let config = ServerConfig::from_args(args).unwrap();
        assert_eq!(config.database_url, "sqlite://from-env.db");
        assert_eq!(config.bind_addr.port(), 3100);
    }

    #[test]
    #[serial]
    fn test_cli_beats_env() {
        std::env::set_var("DATABASE_URL", "sqlite://from-env.db");
        let args = ServerArgs::try_parse_from(["evf-server", "--database-url", "sqlite://cli.db"]).unwrap();
        std::env::remove_var("DATABASE_URL");

        assert_eq!(args.database_url.as_deref(), Some("sqlite://cli.db"));
    }
}
