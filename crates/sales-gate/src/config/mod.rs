use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the gate and its HTTP wrapper.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            pipeline: PipelineConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Locations of the four directory roles plus the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub intake_dir: PathBuf,
    pub processing_dir: PathBuf,
    pub accepted_dir: PathBuf,
    pub rejected_dir: PathBuf,
    pub audit_log: PathBuf,
    /// Extension (without the dot) an intake file must carry to be discovered.
    /// `None` discovers every regular file.
    pub file_extension: Option<String>,
}

impl PipelineConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let file_extension = env::var("SALES_GATE_FILE_EXTENSION")
            .unwrap_or_else(|_| "csv".to_string())
            .trim()
            .trim_start_matches('.')
            .to_ascii_lowercase();

        Ok(Self {
            intake_dir: path_var("SALES_GATE_INTAKE_DIR", "data/sales-files")?,
            processing_dir: path_var("SALES_GATE_PROCESSING_DIR", "data/processing")?,
            accepted_dir: path_var("SALES_GATE_ACCEPTED_DIR", "data/success")?,
            rejected_dir: path_var("SALES_GATE_REJECTED_DIR", "data/failed")?,
            audit_log: path_var("SALES_GATE_AUDIT_LOG", "logs/audit.ndjson")?,
            file_extension: (!file_extension.is_empty()).then_some(file_extension),
        })
    }
}

fn path_var(variable: &'static str, default: &str) -> Result<PathBuf, ConfigError> {
    let raw = env::var(variable).unwrap_or_else(|_| default.to_string());
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyPath { variable });
    }
    Ok(PathBuf::from(trimmed))
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    EmptyPath { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::EmptyPath { variable } => {
                write!(f, "{variable} must not be empty")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::EmptyPath { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
