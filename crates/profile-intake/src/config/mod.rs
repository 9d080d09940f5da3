use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub processing: ProcessingConfig,
    pub telemetry: TelemetryConfig,
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

        let api_token = env::var("API_TOKEN").map_err(|_| ConfigError::MissingApiToken)?;
        if api_token.trim().is_empty() {
            return Err(ConfigError::MissingApiToken);
        }

        let upload_dir =
            PathBuf::from(env::var("APP_UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()));
        let max_file_size_mb = env::var("APP_MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidFileSize)?;
        if max_file_size_mb == 0 {
            return Err(ConfigError::InvalidFileSize);
        }

        let delay_ms = env::var("APP_PROCESSING_DELAY_MS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidDelay)?;
        let outcome = ProcessingOutcome::from_str(
            &env::var("APP_PROCESSING_OUTCOME").unwrap_or_else(|_| "complete".to_string()),
        )?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            auth: AuthConfig { api_token },
            storage: StorageConfig {
                upload_dir,
                max_file_size_mb,
            },
            processing: ProcessingConfig {
                delay: Duration::from_millis(delay_ms),
                outcome,
            },
            telemetry: TelemetryConfig { log_level },
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

/// Static bearer token guarding every route except the health probes.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub api_token: String,
}

/// Where uploaded documents land and how large they may be.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub max_file_size_mb: u64,
}

impl StorageConfig {
    pub fn max_file_bytes(&self) -> usize {
        (self.max_file_size_mb as usize) * 1024 * 1024
    }
}

/// Knobs for the simulated completion step.
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    pub delay: Duration,
    pub outcome: ProcessingOutcome,
}

/// Outcome the simulated processing step reports for every submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingOutcome {
    Complete,
    Reject,
}

impl ProcessingOutcome {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "complete" | "completed" => Ok(Self::Complete),
            "reject" | "rejected" => Ok(Self::Reject),
            other => Err(ConfigError::InvalidOutcome {
                value: other.to_string(),
            }),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    MissingApiToken,
    InvalidFileSize,
    InvalidDelay,
    InvalidOutcome { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::MissingApiToken => write!(f, "API_TOKEN must be set and non-empty"),
            ConfigError::InvalidFileSize => {
                write!(f, "APP_MAX_FILE_SIZE_MB must be a positive integer")
            }
            ConfigError::InvalidDelay => {
                write!(f, "APP_PROCESSING_DELAY_MS must be a non-negative integer")
            }
            ConfigError::InvalidOutcome { value } => {
                write!(
                    f,
                    "APP_PROCESSING_OUTCOME must be 'complete' or 'reject', got '{value}'"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
