use crate::error::StrokedeskError;
use crate::server::guards::SessionAccount;
use crate::server::router::StrokedeskState;
use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Redirect},
    routing::get,
};
use serde_json::{Value, json};

pub fn router() -> Router<StrokedeskState> {
    Router::new()
        .route("/", get(index))
        .route("/about", get(about))
        .route("/dashboard", get(dashboard))
}

/// GET /
async fn index(account: Option<SessionAccount>) -> impl IntoResponse {
    match account {
        Some(_) => Redirect::to("/dashboard"),
        None => Redirect::to("/auth/login"),
    }
}

/// GET /about
async fn about() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Stroke patient record management",
    }))
}

/// GET /dashboard
async fn dashboard(
    State(state): State<StrokedeskState>,
    account: SessionAccount,
) -> Result<Json<Value>, StrokedeskError> {
    let patient_count = state.records.count().await;
    Ok(Json(json!({
        "username": account.username,
        "patient_count": patient_count,
    })))
}
