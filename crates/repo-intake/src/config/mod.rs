use crate::intake::CodeHostAllowlist;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_SOURCEGRAPH_SERVER: &str = "sourcegraph.com";
const GRAPHQL_PATH: &str = ".api/graphql";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

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
    pub sourcegraph: SourcegraphConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("HTTP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("LOGLEVEL").unwrap_or_else(|_| "info".to_string());
        let mode = LogMode::from_str(&env::var("MODE").unwrap_or_default());

        let server_override = env::var("SG_SERVER").ok();
        let token = env::var("SG_TOKEN")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let code_hosts = match env::var("SG_CODE_HOSTS") {
            Ok(value) => CodeHostAllowlist::from_list(&value).ok_or(ConfigError::EmptyAllowlist)?,
            Err(_) => CodeHostAllowlist::default(),
        };
        let request_timeout = match env::var("SG_REQUEST_TIMEOUT_SECS") {
            Ok(value) => parse_timeout(&value)?,
            Err(_) => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, mode },
            sourcegraph: SourcegraphConfig {
                server: SourcegraphServer::resolve(server_override.as_deref()),
                token,
                code_hosts,
                request_timeout,
            },
        })
    }
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout),
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
    pub mode: LogMode,
}

/// Output style for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Compact,
    Dev,
}

impl LogMode {
    fn from_str(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("dev") {
            Self::Dev
        } else {
            Self::Compact
        }
    }
}

/// Where and how scheduling requests are sent.
#[derive(Clone)]
pub struct SourcegraphConfig {
    pub server: SourcegraphServer,
    pub token: Option<String>,
    pub code_hosts: CodeHostAllowlist,
    pub request_timeout: Duration,
}

impl SourcegraphConfig {
    /// The submission path cannot run without a credential.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.token.as_deref().ok_or(ConfigError::MissingToken)
    }
}

impl fmt::Debug for SourcegraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourcegraphConfig")
            .field("server", &self.server)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("code_hosts", &self.code_hosts)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Base address of the Sourcegraph instance, derived from a possibly partial override.
///
/// The override may omit the scheme, carry trailing slashes, or already point at
/// the GraphQL endpoint; all of those collapse to the same base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcegraphServer {
    base: String,
}

impl SourcegraphServer {
    pub fn resolve(value: Option<&str>) -> Self {
        let raw = value
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_SOURCEGRAPH_SERVER);

        let (scheme, rest) = split_scheme(raw);
        let mut rest = rest.trim_end_matches('/');
        if let Some(stripped) = rest.strip_suffix(GRAPHQL_PATH) {
            rest = stripped.trim_end_matches('/');
        }
        if rest.is_empty() {
            rest = DEFAULT_SOURCEGRAPH_SERVER;
        }

        Self {
            base: format!("{scheme}://{rest}"),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/{}", self.base, GRAPHQL_PATH)
    }
}

impl Default for SourcegraphServer {
    fn default() -> Self {
        Self::resolve(None)
    }
}

impl fmt::Display for SourcegraphServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

fn split_scheme(value: &str) -> (&'static str, &str) {
    let lowered = value.to_ascii_lowercase();
    if lowered.starts_with("https://") {
        ("https", &value["https://".len()..])
    } else if lowered.starts_with("http://") {
        ("http", &value["http://".len()..])
    } else {
        ("https", value)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout,
    MissingToken,
    EmptyAllowlist,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "HTTP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "HTTP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "SG_REQUEST_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::MissingToken => {
                write!(f, "SG_TOKEN must be set to submit repositories for embeddings")
            }
            ConfigError::EmptyAllowlist => {
                write!(f, "SG_CODE_HOSTS must name at least one code host")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTimeout
            | ConfigError::MissingToken
            | ConfigError::EmptyAllowlist => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "HTTP_HOST",
            "HTTP_PORT",
            "LOGLEVEL",
            "MODE",
            "SG_TOKEN",
            "SG_SERVER",
            "SG_CODE_HOSTS",
            "SG_REQUEST_TIMEOUT_SECS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.mode, LogMode::Compact);
        assert_eq!(
            config.sourcegraph.server.graphql_url(),
            "https://sourcegraph.com/.api/graphql"
        );
        assert!(config.sourcegraph.code_hosts.contains("github.com"));
        assert_eq!(config.sourcegraph.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("HTTP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8080));
        reset_env();
    }

    #[test]
    fn missing_token_is_reported_when_required() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SG_TOKEN", "   ");
        let config = AppConfig::load().expect("config loads");
        assert!(matches!(
            config.sourcegraph.require_token(),
            Err(ConfigError::MissingToken)
        ));

        env::set_var("SG_TOKEN", "sgp_secret");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.sourcegraph.require_token().expect("token"), "sgp_secret");
        assert!(!format!("{:?}", config.sourcegraph).contains("sgp_secret"));
        reset_env();
    }

    #[test]
    fn rejects_invalid_port_and_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("HTTP_PORT", "not-a-port");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidPort)));

        reset_env();
        env::set_var("SG_REQUEST_TIMEOUT_SECS", "0");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidTimeout)));
        reset_env();
    }

    #[test]
    fn code_hosts_can_be_overridden() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SG_CODE_HOSTS", "GitHub.com, code.example.org ,");
        let config = AppConfig::load().expect("config loads");
        assert!(config.sourcegraph.code_hosts.contains("github.com"));
        assert!(config.sourcegraph.code_hosts.contains("code.example.org"));
        assert!(!config.sourcegraph.code_hosts.contains("gitlab.com"));

        env::set_var("SG_CODE_HOSTS", " , ");
        assert!(matches!(AppConfig::load(), Err(ConfigError::EmptyAllowlist)));
        reset_env();
    }

    #[test]
    fn dev_mode_switches_log_output() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MODE", "DEV");
        env::set_var("LOGLEVEL", "debug");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.telemetry.mode, LogMode::Dev);
        assert_eq!(config.telemetry.log_level, "debug");
        reset_env();
    }

    #[test]
    fn server_override_is_forgiving() {
        let expected = "https://sg.example.com/.api/graphql";
        for value in [
            "sg.example.com",
            "https://sg.example.com",
            "https://sg.example.com/",
            "sg.example.com//",
            "https://sg.example.com/.api/graphql",
            "sg.example.com/.api/graphql/",
            "  HTTPS://sg.example.com  ",
        ] {
            assert_eq!(
                SourcegraphServer::resolve(Some(value)).graphql_url(),
                expected,
                "override {value:?}"
            );
        }
    }

    #[test]
    fn server_override_keeps_explicit_http_and_defaults_when_blank() {
        let local = SourcegraphServer::resolve(Some("http://127.0.0.1:7080/"));
        assert_eq!(local.base_url(), "http://127.0.0.1:7080");
        assert_eq!(local.graphql_url(), "http://127.0.0.1:7080/.api/graphql");

        assert_eq!(SourcegraphServer::resolve(Some("")).base_url(), "https://sourcegraph.com");
        assert_eq!(
            SourcegraphServer::resolve(Some("https://")).base_url(),
            "https://sourcegraph.com"
        );
        assert_eq!(SourcegraphServer::default().to_string(), "https://sourcegraph.com");
    }
}
