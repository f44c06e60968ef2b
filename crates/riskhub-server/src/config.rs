//! Server configuration read once from the environment

use riskhub_store::BaasConfig;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Default listen address
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
/// Default outbound request timeout
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;
/// Default lookup cache lifetime
pub const DEFAULT_LOOKUP_TTL_SECS: u64 = 60;
/// Organization name printed on reports when none is configured
pub const DEFAULT_ORG_NAME: &str = "Rumah Sakit";

/// Configuration failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required variable absent or empty
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// Variable present but unusable
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Where rows and sessions live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Hosted row and auth APIs
    Baas,
    /// Process-local store, lost on exit
    Memory,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baas" | "supabase" => Ok(Self::Baas),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected baas or memory, got {other}")),
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected pretty or json, got {other}")),
        }
    }
}

/// Account created at startup for the memory backend
#[derive(Clone, PartialEq, Eq)]
pub struct MemoryAdmin {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for MemoryAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAdmin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything the server needs to start
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub backend: BackendKind,
    /// Present whenever `backend` is [`BackendKind::Baas`]
    pub baas: Option<BaasConfig>,
    pub lookup_ttl: Duration,
    pub org_name: String,
    pub log_format: LogFormat,
    pub memory_admin: Option<MemoryAdmin>,
}

impl ServerConfig {
    /// Configuration for an in-memory server, used by tests and demos
    #[must_use]
    pub fn memory() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 0)),
            backend: BackendKind::Memory,
            baas: None,
            lookup_ttl: Duration::from_secs(DEFAULT_LOOKUP_TTL_SECS),
            org_name: DEFAULT_ORG_NAME.to_string(),
            log_format: LogFormat::Pretty,
            memory_admin: None,
        }
    }

    /// Read from the process environment
    ///
    /// # Errors
    /// See [`ServerConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read through an arbitrary variable lookup
    ///
    /// `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `SUPABASE_SERVICE_ROLE_KEY` are
    /// required unless `RISKHUB_BACKEND=memory`.
    ///
    /// # Errors
    /// A required variable is missing or a variable fails to parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend = parse_or(&var, "RISKHUB_BACKEND", BackendKind::Baas)?;
        let bind = parse_or(&var, "RISKHUB_BIND", SocketAddr::from(([0, 0, 0, 0], 3000)))?;
        let timeout = Duration::from_millis(parse_or(
            &var,
            "RISKHUB_HTTP_TIMEOUT_MS",
            DEFAULT_HTTP_TIMEOUT_MS,
        )?);
        let lookup_ttl = Duration::from_secs(parse_or(
            &var,
            "RISKHUB_LOOKUP_CACHE_TTL_SECS",
            DEFAULT_LOOKUP_TTL_SECS,
        )?);
        let log_format = parse_or(&var, "RISKHUB_LOG_FORMAT", LogFormat::Pretty)?;
        let org_name = var("RISKHUB_ORG_NAME").unwrap_or_else(|| DEFAULT_ORG_NAME.to_string());

        let baas = match backend {
            BackendKind::Memory => None,
            BackendKind::Baas => {
                let require = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));
                Some(
                    BaasConfig::new(
                        require("SUPABASE_URL")?,
                        require("SUPABASE_ANON_KEY")?,
                        require("SUPABASE_SERVICE_ROLE_KEY")?,
                    )
                    .with_timeout(timeout),
                )
            }
        };

        let memory_admin = match var("RISKHUB_MEMORY_ADMIN") {
            None => None,
            Some(value) => {
                let (email, password) =
                    value
                        .split_once(':')
                        .ok_or_else(|| ConfigError::Invalid {
                            name: "RISKHUB_MEMORY_ADMIN",
                            value: "<redacted>".to_string(),
                            reason: "expected email:password".to_string(),
                        })?;
                Some(MemoryAdmin {
                    email: email.trim().to_string(),
                    password: password.to_string(),
                })
            }
        };

        Ok(Self {
            bind,
            backend,
            baas,
            lookup_ttl,
            org_name,
            log_format,
            memory_admin,
        })
    }
}

fn parse_or<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(default),
        Some(value) => value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}
