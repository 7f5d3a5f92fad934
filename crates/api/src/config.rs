use axum::http::HeaderValue;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-field lines (development).
    Pretty,
    /// One JSON object per event (log shippers).
    Json,
}

/// Invalid configuration value detected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `5055`).
    pub port: u16,
    /// SQLite URL for job history.
    pub database_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Host core count used to size multicore jobs.
    pub cpu_cores: usize,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                        |
    /// |------------------------|--------------------------------|
    /// | `HOST`                 | `127.0.0.1`                    |
    /// | `PORT`                 | `5055`                         |
    /// | `DATABASE_URL`         | `sqlite://jobs.sqlite3?mode=rwc` |
    /// | `CORS_ORIGINS`         | `http://localhost:5055`        |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                           |
    /// | `RENDER_CPU_CORES`     | detected core count            |
    /// | `LOG_FORMAT`           | `pretty`                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("HOST", "127.0.0.1");

        let port = parse_var("PORT", var("PORT", "5055"), "a valid u16")?;

        let database_url = var("DATABASE_URL", "sqlite://jobs.sqlite3?mode=rwc");

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "http://localhost:5055")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            if HeaderValue::from_str(origin).is_err() {
                return Err(invalid("CORS_ORIGINS", "a list of valid origins", origin));
            }
        }

        let request_timeout_secs: u64 = parse_var(
            "REQUEST_TIMEOUT_SECS",
            var("REQUEST_TIMEOUT_SECS", "30"),
            "a positive integer",
        )?;
        if request_timeout_secs == 0 {
            return Err(invalid("REQUEST_TIMEOUT_SECS", "a positive integer", "0"));
        }

        let cpu_cores = match lookup("RENDER_CPU_CORES") {
            Some(raw) => {
                let cores: usize = parse_var("RENDER_CPU_CORES", raw, "a positive integer")?;
                if cores == 0 {
                    return Err(invalid("RENDER_CPU_CORES", "a positive integer", "0"));
                }
                cores
            }
            None => num_cpus::get(),
        };

        let log_format = match var("LOG_FORMAT", "pretty").to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => return Err(invalid("LOG_FORMAT", "`pretty` or `json`", other)),
        };

        Ok(Self {
            host,
            port,
            database_url,
            cors_origins,
            request_timeout_secs,
            cpu_cores,
            log_format,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    raw: String,
    expected: &'static str,
) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var: name,
        expected,
        value: raw,
    })
}

fn invalid(var: &'static str, expected: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        expected,
        value: value.to_string(),
    }
}
