use crate::db::DbAccount;
use crate::error::StrokedeskError;
use crate::server::router::StrokedeskState;
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::debug;

pub const SESSION_COOKIE: &str = "strokedesk_session";

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    account_id: i64,
    username: String,
    /// Unix seconds.
    issued_at: i64,
}

/// The signed-in account, reloaded from the account store on every request.
///
/// Rejects with `LoginRequired` when the cookie is missing, tampered with,
/// expired, or names an account that no longer exists or is deactivated.
#[derive(Debug, Clone)]
pub struct SessionAccount {
    pub id: i64,
    pub username: String,
}

impl FromRequestParts<StrokedeskState> for SessionAccount {
    type Rejection = StrokedeskError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &StrokedeskState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        let claims = jar
            .get(SESSION_COOKIE)
            .and_then(|c| serde_json::from_str::<SessionClaims>(c.value()).ok())
            .ok_or(StrokedeskError::LoginRequired)?;

        let lifetime_secs = state.security.session_lifetime_minutes.saturating_mul(60);
        if Utc::now().timestamp() >= claims.issued_at.saturating_add(lifetime_secs) {
            debug!(account_id = claims.account_id, "session expired");
            return Err(StrokedeskError::LoginRequired);
        }

        match state.accounts.store().get_by_id(claims.account_id).await? {
            Some(account) if account.is_active => Ok(SessionAccount {
                id: account.id,
                username: account.username,
            }),
            _ => Err(StrokedeskError::LoginRequired),
        }
    }
}

impl OptionalFromRequestParts<StrokedeskState> for SessionAccount {
    type Rejection = StrokedeskError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &StrokedeskState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <SessionAccount as FromRequestParts<StrokedeskState>>::from_request_parts(
            parts, state,
        )
        .await
        {
            Ok(account) => Ok(Some(account)),
            Err(StrokedeskError::LoginRequired) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

pub fn issue_session(
    jar: PrivateCookieJar,
    account: &DbAccount,
    state: &StrokedeskState,
) -> Result<PrivateCookieJar, StrokedeskError> {
    let claims = SessionClaims {
        account_id: account.id,
        username: account.username.clone(),
        issued_at: Utc::now().timestamp(),
    };
    let value = serde_json::to_string(&claims)?;

    let cookie = Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(!state.insecure_cookie)
        .same_site(SameSite::Lax)
        .max_age(Duration::minutes(state.security.session_lifetime_minutes))
        .build();

    Ok(jar.add(cookie))
}

pub fn clear_session(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
