/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown grace period in seconds (default: `30`). Bounds how
    /// long an in-flight SLA scan may run after the stop signal.
    pub shutdown_timeout_secs: u64,
    /// Cadence of the background SLA scan in seconds (default: `300`).
    pub sla_scan_interval_secs: u64,
    /// Fraction of an SLA interval after which the warning fires
    /// (default: `0.75`).
    pub sla_warning_ratio: f64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `SLA_SCAN_INTERVAL_SECS`| `300`                   |
    /// | `SLA_WARNING_RATIO`     | `0.75`                  |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let sla_scan_interval_secs: u64 = std::env::var("SLA_SCAN_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("SLA_SCAN_INTERVAL_SECS must be a valid u64");

        let sla_warning_ratio: f64 = std::env::var("SLA_WARNING_RATIO")
            .unwrap_or_else(|_| "0.75".into())
            .parse()
            .expect("SLA_WARNING_RATIO must be a valid f64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            sla_scan_interval_secs,
            sla_warning_ratio,
        }
    }
}
