use ticketgate_core::ticket_status::AlreadyUsedPolicy;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have sensible defaults suitable for local
/// development. In production, override via environment variables.
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
    /// Upper bound on the post-shutdown drain in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// QR ticket code configuration.
    pub qr: QrConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    ///
    /// See [`JwtConfig::from_env`] and [`QrConfig::from_env`] for the rest.
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

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            qr: QrConfig::from_env(),
        }
    }
}

/// Settings for sealing and scanning QR ticket codes.
#[derive(Clone)]
pub struct QrConfig {
    /// Shared secret the codec derives its encryption and MAC keys from.
    pub signing_secret: String,
    /// What a second `entry` scan of a `used` ticket does.
    pub already_used_policy: AlreadyUsedPolicy,
}

impl std::fmt::Debug for QrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrConfig")
            .field("signing_secret", &"<redacted>")
            .field("already_used_policy", &self.already_used_policy)
            .finish()
    }
}

impl QrConfig {
    /// Load QR configuration from environment variables.
    ///
    /// | Env Var                     | Required | Default  |
    /// |-----------------------------|----------|----------|
    /// | `QR_SIGNING_SECRET`         | **yes**  | --       |
    /// | `SCAN_ALREADY_USED_POLICY`  | no       | `block`  |
    ///
    /// # Panics
    ///
    /// Panics if `QR_SIGNING_SECRET` is not set, or if the policy is neither
    /// `block` nor `warn`. Secret length is checked when the codec is built.
    pub fn from_env() -> Self {
        let signing_secret = std::env::var("QR_SIGNING_SECRET")
            .expect("QR_SIGNING_SECRET must be set in the environment");

        let already_used_policy = std::env::var("SCAN_ALREADY_USED_POLICY")
            .map(|v| {
                v.parse()
                    .unwrap_or_else(|_| panic!("SCAN_ALREADY_USED_POLICY must be 'block' or 'warn', got '{v}'"))
            })
            .unwrap_or_default();

        Self {
            signing_secret,
            already_used_policy,
        }
    }
}
