use crate::error::StrokedeskError;
use crate::server::guards::ClientIp;
use crate::server::router::StrokedeskState;
use crate::utils::logging::{SecurityEvent, security_event};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use base64::Engine as _;
use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use time::Duration;

pub const CSRF_COOKIE: &str = "strokedesk_csrf";

#[derive(Debug, Serialize, Deserialize)]
struct CsrfCookie {
    token: String,
    /// Unix seconds.
    issued_at: i64,
}

/// A form body with its `csrf_token` field split off.
#[derive(Debug, Deserialize)]
pub struct CsrfForm<T> {
    #[serde(default)]
    pub csrf_token: Option<String>,
    #[serde(flatten)]
    pub form: T,
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn current_token(jar: &PrivateCookieJar, state: &StrokedeskState) -> Option<String> {
    let cookie = jar
        .get(CSRF_COOKIE)
        .and_then(|c| serde_json::from_str::<CsrfCookie>(c.value()).ok())?;
    let expires_at = cookie
        .issued_at
        .saturating_add(state.security.csrf_time_limit_secs);
    (Utc::now().timestamp() < expires_at).then_some(cookie.token)
}

/// Return the browser's live CSRF token, minting a fresh one (and its cookie)
/// when there is none or it has expired.
pub fn ensure_csrf_token(
    jar: PrivateCookieJar,
    state: &StrokedeskState,
) -> Result<(PrivateCookieJar, String), StrokedeskError> {
    if let Some(token) = current_token(&jar, state) {
        return Ok((jar, token));
    }

    let token = generate_token();
    let value = serde_json::to_string(&CsrfCookie {
        token: token.clone(),
        issued_at: Utc::now().timestamp(),
    })?;

    let cookie = Cookie::build((CSRF_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(!state.insecure_cookie)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(state.security.csrf_time_limit_secs))
        .build();

    Ok((jar.add(cookie), token))
}

/// Check a submitted `csrf_token` against the cookie. A no-op when CSRF
/// protection is disabled.
pub fn verify_csrf(
    jar: &PrivateCookieJar,
    submitted: Option<&str>,
    state: &StrokedeskState,
    client_ip: &ClientIp,
) -> Result<(), StrokedeskError> {
    if !state.security.csrf_enabled {
        return Ok(());
    }

    let matches = match (current_token(jar, state), submitted) {
        (Some(expected), Some(given)) => expected.as_bytes().ct_eq(given.as_bytes()).into(),
        _ => false,
    };

    if matches {
        Ok(())
    } else {
        security_event(
            SecurityEvent::CsrfRejected,
            client_ip.as_str(),
            None,
            "form post without a valid CSRF token",
        );
        Err(StrokedeskError::CsrfMismatch)
    }
}
