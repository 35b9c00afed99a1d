//! Server configuration, loaded from a JSON file

use parlour_listener::ConnectionType;
use parlour_network::config::NetworkConfig;
use parlour_network::prelude::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_core::LevelFilter;

#[derive(Debug, Error)]
pub enum ConfigError
{
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig
{
    pub server: ServerInfo,
    pub listeners: Vec<ListenerConfig>,
    #[serde(default)]
    pub tls: Option<TlsConfig>,
    #[serde(default)]
    pub log: LoggingConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Identity of this server, as shown to clients
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerInfo
{
    pub name: ServerName,
    pub network_name: String,
    #[serde(default)]
    pub description: String,
    /// Look up client hostnames in DNS; otherwise the address is used
    #[serde(default = "default_true")]
    pub resolve_hostnames: bool,
    /// Upper bound on concurrent hostname lookups
    #[serde(default = "default_dns_workers")]
    pub dns_workers: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListenerConfig
{
    pub address: SocketAddr,
    #[serde(default)]
    pub tls: bool,
}

impl ListenerConfig
{
    pub fn connection_type(&self) -> ConnectionType
    {
        if self.tls { ConnectionType::Tls } else { ConnectionType::Clear }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TlsConfig
{
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinLogTarget
{
    Stdout,
    Stderr,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogTarget
{
    File { filename: PathBuf },
    Builtin(BuiltinLogTarget),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel
{
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEntry
{
    pub target: LogTarget,
    #[serde(default)]
    pub modules: Vec<String>,
    pub level: Option<LogLevel>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LoggingConfig
{
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    pub default_level: Option<LogLevel>,
    #[serde(default)]
    pub module_levels: HashMap<String, LogLevel>,
    #[serde(default = "default_log_targets")]
    pub targets: Vec<LogEntry>,
}

fn default_true() -> bool
{
    true
}

fn default_dns_workers() -> usize
{
    8
}

fn default_log_dir() -> PathBuf
{
    PathBuf::from("log")
}

fn default_log_targets() -> Vec<LogEntry>
{
    vec![LogEntry {
        target: LogTarget::Builtin(BuiltinLogTarget::Stderr),
        modules: Vec::new(),
        level: Some(LogLevel::Info),
    }]
}

impl Default for LoggingConfig
{
    fn default() -> Self
    {
        Self {
            dir: default_log_dir(),
            default_level: None,
            module_levels: HashMap::new(),
            targets: default_log_targets(),
        }
    }
}

impl LoggingConfig
{
    pub fn prefix_file(&self, filename: impl AsRef<Path>) -> PathBuf
    {
        let mut path = self.dir.clone();
        path.push(filename);
        path
    }
}

impl From<LogLevel> for LevelFilter
{
    fn from(arg: LogLevel) -> LevelFilter
    {
        match arg {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

impl ServerConfig
{
    /// Read and check a configuration file
    pub fn load_file(filename: impl AsRef<Path>) -> Result<Self, ConfigError>
    {
        let file = File::open(filename)?;
        let reader = BufReader::new(file);
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the cross-references a parser cannot
    pub fn validate(&self) -> Result<(), ConfigError>
    {
        if self.listeners.is_empty()
        {
            return Err(ConfigError::Invalid("no listeners configured".to_string()));
        }
        if self.listeners.iter().any(|l| l.tls) && self.tls.is_none()
        {
            return Err(ConfigError::Invalid("TLS listener configured without a certificate".to_string()));
        }

        let network = &self.network;
        if !network.classes.iter().any(|c| c.name == network.default_class)
        {
            return Err(ConfigError::Invalid(format!("default class {} is not defined", network.default_class)));
        }
        for oper in &network.opers
        {
            if let Some(class) = &oper.class
            {
                if !network.classes.iter().any(|c| &c.name == class)
                {
                    return Err(ConfigError::Invalid(format!("oper {} uses undefined class {}", oper.name, class)));
                }
            }
        }
        if network.flood.penalty.is_zero() || network.flood.sweep_interval.is_zero()
        {
            return Err(ConfigError::Invalid("flood penalty and sweep interval must be non-zero".to_string()));
        }
        Ok(())
    }
}
