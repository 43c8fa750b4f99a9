use serde::{Deserialize, Serialize};

/// Web-security settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Require a matching `csrf_token` field on every form POST.
    /// TOML: `security.csrf_enabled`. Default: `true`.
    #[serde(default = "default_true")]
    pub csrf_enabled: bool,

    /// Lifetime of an issued CSRF token, in seconds.
    /// TOML: `security.csrf_time_limit_secs`. Default: `3600`.
    #[serde(default = "default_csrf_time_limit_secs")]
    pub csrf_time_limit_secs: i64,

    /// Session lifetime after login, in minutes.
    /// TOML: `security.session_lifetime_minutes`. Default: `30`.
    #[serde(default = "default_session_lifetime_minutes")]
    pub session_lifetime_minutes: i64,

    /// PBKDF2-HMAC-SHA256 iterations for new password hashes. Existing hashes
    /// keep the count they were created with.
    /// TOML: `security.password_hash_iterations`. Default: `600000`.
    #[serde(default = "default_password_hash_iterations")]
    pub password_hash_iterations: u32,

    /// Login attempts allowed per client IP per minute.
    /// TOML: `security.login_attempts_per_minute`. Default: `10`.
    #[serde(default = "default_login_attempts_per_minute")]
    pub login_attempts_per_minute: u32,

    /// Take the client address from the last `X-Forwarded-For` hop instead of
    /// the TCP peer. Only enable behind a reverse proxy that appends that header.
    /// TOML: `security.trust_forwarded_for`. Default: `false`.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            csrf_enabled: true,
            csrf_time_limit_secs: default_csrf_time_limit_secs(),
            session_lifetime_minutes: default_session_lifetime_minutes(),
            password_hash_iterations: default_password_hash_iterations(),
            login_attempts_per_minute: default_login_attempts_per_minute(),
            trust_forwarded_for: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_csrf_time_limit_secs() -> i64 {
    3600
}

fn default_session_lifetime_minutes() -> i64 {
    30
}

fn default_password_hash_iterations() -> u32 {
    600_000
}

fn default_login_attempts_per_minute() -> u32 {
    10
}
