use axum_extra::extract::cookie::Key;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::net::{IpAddr, Ipv4Addr};
use tracing::warn;

/// Minimum master-key length accepted for cookie key derivation.
const MIN_SECRET_KEY_LEN: usize = 32;

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// HTTP server listen address (e.g., "0.0.0.0", "127.0.0.1").
    /// TOML: `basic.listen_addr`. Default: `0.0.0.0`.
    #[serde(default = "default_listen_ip")]
    pub listen_addr: IpAddr,

    /// HTTP server listen port.
    /// TOML: `basic.listen_port`. Default: `5000`.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// SQLite URL of the account (credentials) database.
    /// TOML: `basic.database_url`. Default: `sqlite://users.db`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// Master secret for session and CSRF cookie encryption (at least 32 bytes).
    /// TOML: `basic.secret_key`. When empty a random key is generated per process,
    /// which invalidates every session on restart.
    #[serde(default)]
    #[serde(deserialize_with = "deserialize_string_lax")]
    pub secret_key: String,

    /// Drop the `Secure` attribute from cookies (plain-HTTP development only).
    /// TOML: `basic.insecure_cookie`. Default: `false`.
    #[serde(default)]
    pub insecure_cookie: bool,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_ip(),
            listen_port: default_listen_port(),
            database_url: default_database_url(),
            loglevel: default_loglevel(),
            secret_key: String::new(),
            insecure_cookie: false,
        }
    }
}

impl BasicConfig {
    /// Cookie encryption key derived from `secret_key`, or a random one.
    pub fn cookie_key(&self) -> Key {
        let secret = self.secret_key.trim();
        if secret.len() >= MIN_SECRET_KEY_LEN {
            return Key::derive_from(secret.as_bytes());
        }
        if !secret.is_empty() {
            warn!(
                min_len = MIN_SECRET_KEY_LEN,
                "basic.secret_key is too short; falling back to a random per-process key"
            );
        }
        Key::generate()
    }
}

fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom(
            "expected a string or a number for basic.secret_key",
        )),
    }
}

/// Default IP address for the HTTP server listen address.
fn default_listen_ip() -> IpAddr {
    Ipv4Addr::new(0, 0, 0, 0).into()
}

/// Default port for the HTTP server.
fn default_listen_port() -> u16 {
    5000
}

fn default_database_url() -> String {
    "sqlite://users.db".to_string()
}

fn default_loglevel() -> String {
    "info".to_string()
}
