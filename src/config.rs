//! Runtime configuration from the environment (and `.env`, loaded by the binary).

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const HOST_ENV_VAR: &str = "VEGHOP_HOST";
pub const PORT_ENV_VAR: &str = "PORT";
pub const DATA_DIR_ENV_VAR: &str = "VEGHOP_DATA_DIR";
pub const CATALOG_FILE_ENV_VAR: &str = "VEGHOP_CATALOG_FILE";
pub const ADMIN_PASSWORD_ENV_VAR: &str = "VEGHOP_ADMIN_PASSWORD";
pub const ADMIN_MAX_ATTEMPTS_ENV_VAR: &str = "VEGHOP_ADMIN_MAX_ATTEMPTS";
pub const ADMIN_LOCKOUT_ENV_VAR: &str = "VEGHOP_ADMIN_LOCKOUT_SECS";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub data_dir: PathBuf,
    pub catalog_file: PathBuf,
    pub admin_password: Option<String>,
    pub admin_max_attempts: u32,
    pub admin_lockout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8083,
            data_dir: PathBuf::from("data/state"),
            catalog_file: PathBuf::from("data/vegetables.json"),
            admin_password: None,
            admin_max_attempts: 5,
            admin_lockout: Duration::from_secs(60),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(|var| env::var(var).ok()) }

    /// Builds a config from any variable source; unset variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: parse_or(&lookup, HOST_ENV_VAR, defaults.host)?,
            port: parse_or(&lookup, PORT_ENV_VAR, defaults.port)?,
            data_dir: lookup(DATA_DIR_ENV_VAR).map(PathBuf::from).unwrap_or(defaults.data_dir),
            catalog_file: lookup(CATALOG_FILE_ENV_VAR).map(PathBuf::from).unwrap_or(defaults.catalog_file),
            admin_password: lookup(ADMIN_PASSWORD_ENV_VAR).filter(|p| !p.is_empty()),
            admin_max_attempts: parse_or(&lookup, ADMIN_MAX_ATTEMPTS_ENV_VAR, defaults.admin_max_attempts)?,
            admin_lockout: Duration::from_secs(parse_or(&lookup, ADMIN_LOCKOUT_ENV_VAR, defaults.admin_lockout.as_secs())?),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }
}

fn parse_or<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, default: T) -> Result<T, ConfigError> {
    match lookup(var) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}
