use crate::error::StrokedeskError;
use crate::server::guards::{
    ClientIp, CsrfForm, SessionAccount, clear_session, ensure_csrf_token, issue_session,
    verify_csrf,
};
use crate::server::router::StrokedeskState;
use crate::utils::logging::{SecurityEvent, security_event};
use axum::{
    Form, Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use serde_json::json;
use strokedesk_schema::validation::{LoginForm, RegistrationForm};
use tracing::info;
use url::Url;

const DEFAULT_LANDING: &str = "/dashboard";

pub fn router() -> Router<StrokedeskState> {
    Router::new()
        .route("/auth/register", get(register_form).post(register))
        .route("/auth/login", get(login_form).post(login))
        .route("/auth/logout", get(logout))
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// GET /auth/register
async fn register_form(
    State(state): State<StrokedeskState>,
    account: Option<SessionAccount>,
    jar: PrivateCookieJar,
) -> Result<Response, StrokedeskError> {
    if account.is_some() {
        return Ok(Redirect::to(DEFAULT_LANDING).into_response());
    }
    let (jar, token) = ensure_csrf_token(jar, &state)?;
    let body = json!({
        "form": "register",
        "fields": ["username", "email", "password", "confirm_password"],
        "csrf_token": token,
    });
    Ok((jar, Json(body)).into_response())
}

/// POST /auth/register
async fn register(
    State(state): State<StrokedeskState>,
    client_ip: ClientIp,
    jar: PrivateCookieJar,
    Form(submission): Form<CsrfForm<RegistrationForm>>,
) -> Result<Response, StrokedeskError> {
    verify_csrf(&jar, submission.csrf_token.as_deref(), &state, &client_ip)?;

    let account_id = state.accounts.register(&submission.form).await?;

    security_event(
        SecurityEvent::Registration,
        client_ip.as_str(),
        Some(account_id),
        "new account registered",
    );
    info!(account_id, "account registered");
    Ok(Redirect::to("/auth/login").into_response())
}

/// GET /auth/login
async fn login_form(
    State(state): State<StrokedeskState>,
    account: Option<SessionAccount>,
    Query(query): Query<NextQuery>,
    jar: PrivateCookieJar,
) -> Result<Response, StrokedeskError> {
    if account.is_some() {
        return Ok(Redirect::to(DEFAULT_LANDING).into_response());
    }
    let (jar, token) = ensure_csrf_token(jar, &state)?;
    let body = json!({
        "form": "login",
        "fields": ["username", "password"],
        "next": query.next.as_deref().and_then(safe_next),
        "csrf_token": token,
    });
    Ok((jar, Json(body)).into_response())
}

/// POST /auth/login
async fn login(
    State(state): State<StrokedeskState>,
    client_ip: ClientIp,
    Query(query): Query<NextQuery>,
    jar: PrivateCookieJar,
    Form(submission): Form<CsrfForm<LoginForm>>,
) -> Result<Response, StrokedeskError> {
    verify_csrf(&jar, submission.csrf_token.as_deref(), &state, &client_ip)?;

    let account = match state
        .accounts
        .login(client_ip.as_str(), &submission.form)
        .await
    {
        Ok(account) => account,
        Err(err) => {
            let event = match &err {
                StrokedeskError::InvalidCredentials => Some(SecurityEvent::FailedLogin),
                StrokedeskError::AccountInactive => Some(SecurityEvent::InactiveLogin),
                StrokedeskError::RateLimited => Some(SecurityEvent::RateLimited),
                _ => None,
            };
            if let Some(event) = event {
                security_event(event, client_ip.as_str(), None, "login rejected");
            }
            return Err(err);
        }
    };

    let jar = issue_session(jar, &account, &state)?;
    security_event(
        SecurityEvent::Login,
        client_ip.as_str(),
        Some(account.id),
        "login succeeded",
    );

    let target = query
        .next
        .as_deref()
        .and_then(safe_next)
        .unwrap_or_else(|| DEFAULT_LANDING.to_string());
    Ok((jar, Redirect::to(&target)).into_response())
}

/// GET /auth/logout
async fn logout(
    client_ip: ClientIp,
    account: SessionAccount,
    jar: PrivateCookieJar,
) -> impl IntoResponse {
    security_event(
        SecurityEvent::Logout,
        client_ip.as_str(),
        Some(account.id),
        "logged out",
    );
    (clear_session(jar), Redirect::to("/auth/login"))
}

/// Accept `next` only as a same-site absolute path (`/patients/`), never a
/// scheme-relative or absolute URL.
fn safe_next(next: &str) -> Option<String> {
    let next = next.trim();
    if !next.starts_with('/') || next.starts_with("//") || next.contains('\\') {
        return None;
    }
    let base = Url::parse("http://localhost/").ok()?;
    let joined = base.join(next).ok()?;
    if joined.origin() != base.origin() {
        return None;
    }
    let mut target = joined.path().to_string();
    if let Some(query) = joined.query() {
        target.push('?');
        target.push_str(query);
    }
    Some(target)
}
