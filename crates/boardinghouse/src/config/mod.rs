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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub routing: RoutingConfig,
    pub listings: ListingsConfig,
    /// Optional JSON file replacing the standard accreditation rubric.
    pub rubric_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "4000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;
        let cors_origin = env::var("APP_CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let ansi = environment == AppEnvironment::Development;

        let backend = match non_empty_var("DATABASE_URL") {
            Some(database_url) => {
                let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse::<u32>()
                    .ok()
                    .filter(|value| *value > 0)
                    .ok_or(ConfigError::InvalidMaxConnections)?;
                RoutingBackendConfig::Postgres {
                    database_url,
                    max_connections,
                }
            }
            None => RoutingBackendConfig::Memory {
                network_path: non_empty_var("ROUTING_NETWORK_PATH").map(PathBuf::from),
            },
        };
        let directed = parse_flag("ROUTING_DIRECTED", false)?;

        Ok(Self {
            environment,
            server: ServerConfig {
                host,
                port,
                cors_origin,
            },
            telemetry: TelemetryConfig { log_level, ansi },
            routing: RoutingConfig { backend, directed },
            listings: ListingsConfig {
                store_path: non_empty_var("LISTINGS_STORE_PATH").map(PathBuf::from),
                catalog_csv: non_empty_var("LISTINGS_CATALOG_CSV").map(PathBuf::from),
            },
            rubric_path: non_empty_var("RUBRIC_PATH").map(PathBuf::from),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_flag(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match non_empty_var(name) {
        None => Ok(default),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidFlag { name }),
        },
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origin allowed to call the API.
    pub cors_origin: String,
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
    pub ansi: bool,
}

/// Shortest-path backend selection.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub backend: RoutingBackendConfig,
    /// Respect one-way segments when searching for a path.
    pub directed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingBackendConfig {
    /// pgRouting over the `ways` tables of a PostGIS database.
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    /// In-process road network, empty unless a network file is supplied.
    Memory { network_path: Option<PathBuf> },
}

impl RoutingBackendConfig {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Postgres { .. } => "postgres",
            Self::Memory { .. } => "memory",
        }
    }
}

/// Where listings come from and where user-added ones are kept.
#[derive(Debug, Clone, Default)]
pub struct ListingsConfig {
    pub store_path: Option<PathBuf>,
    pub catalog_csv: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMaxConnections,
    InvalidFlag { name: &'static str },
    InvalidCorsOrigin { origin: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMaxConnections => {
                write!(f, "DATABASE_MAX_CONNECTIONS must be a positive integer")
            }
            ConfigError::InvalidFlag { name } => {
                write!(f, "{name} must be one of true/false/yes/no/1/0")
            }
            ConfigError::InvalidCorsOrigin { origin } => {
                write!(f, "APP_CORS_ORIGIN '{origin}' is not a valid header value")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidMaxConnections
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidCorsOrigin { .. } => None,
        }
    }
}
