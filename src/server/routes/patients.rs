use crate::db::SearchCriteria;
use crate::error::StrokedeskError;
use crate::server::guards::{ClientIp, CsrfForm, SessionAccount, ensure_csrf_token, verify_csrf};
use crate::server::router::StrokedeskState;
use crate::service::{admit_patient, amend_patient};
use crate::utils::logging::{SecurityEvent, security_event};
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use serde_json::{Value, json};
use strokedesk_schema::RawPatientForm;
use strokedesk_schema::patient::{EverMarried, Gender, ResidenceType, SmokingStatus, WorkType};
use strokedesk_schema::validation::{PATIENT_ID_MAX, PATIENT_ID_MIN};
use tracing::info;

pub fn router() -> Router<StrokedeskState> {
    Router::new()
        .route("/patients", get(list_patients))
        .route("/patients/", get(list_patients))
        .route("/patients/add", get(add_form).post(add_patient))
        .route("/patients/view/{id}", get(view_patient))
        .route("/patients/edit/{id}", get(edit_form).post(edit_patient))
        .route("/patients/delete/{id}", get(delete_confirm).post(delete_patient))
        .route("/patients/search", get(search_patients))
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Field layout of the patient form, with every select's accepted choices.
fn patient_form_fields() -> Value {
    fn choices<T: ToString>(all: &[T]) -> Vec<String> {
        all.iter().map(ToString::to_string).collect()
    }

    json!([
        { "name": "patient_id", "type": "integer", "min": PATIENT_ID_MIN, "max": PATIENT_ID_MAX },
        { "name": "gender", "type": "select", "choices": choices(Gender::ALL) },
        { "name": "age", "type": "number", "min": 0, "max": 120 },
        { "name": "hypertension", "type": "select", "choices": ["0", "1"] },
        { "name": "heart_disease", "type": "select", "choices": ["0", "1"] },
        { "name": "ever_married", "type": "select", "choices": choices(EverMarried::ALL) },
        { "name": "work_type", "type": "select", "choices": choices(WorkType::ALL) },
        { "name": "residence_type", "type": "select", "choices": choices(ResidenceType::ALL) },
        { "name": "avg_glucose_level", "type": "number", "min": 0, "max": 500 },
        { "name": "bmi", "type": "number", "min": 10, "max": 100, "optional": true },
        { "name": "smoking_status", "type": "select", "choices": choices(SmokingStatus::ALL) },
        { "name": "stroke", "type": "select", "choices": ["0", "1"] },
    ])
}

/// GET /patients/
async fn list_patients(
    State(state): State<StrokedeskState>,
    _account: SessionAccount,
    Query(query): Query<PageQuery>,
) -> Json<Value> {
    let page = query
        .page
        .as_deref()
        .and_then(|p| p.trim().parse::<u64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);
    let per_page = u64::from(state.page_size);
    let skip = (page - 1).saturating_mul(per_page);

    let patients = state.records.list(skip, per_page).await;
    let total_count = state.records.count().await;
    let total_pages = total_count.div_ceil(per_page);

    Json(json!({
        "patients": patients,
        "page": page,
        "per_page": per_page,
        "total_pages": total_pages,
        "total_count": total_count,
    }))
}

/// GET /patients/add
async fn add_form(
    State(state): State<StrokedeskState>,
    _account: SessionAccount,
    jar: PrivateCookieJar,
) -> Result<Response, StrokedeskError> {
    let (jar, token) = ensure_csrf_token(jar, &state)?;
    let body = json!({
        "form": "add_patient",
        "fields": patient_form_fields(),
        "csrf_token": token,
    });
    Ok((jar, Json(body)).into_response())
}

/// POST /patients/add
async fn add_patient(
    State(state): State<StrokedeskState>,
    account: SessionAccount,
    client_ip: ClientIp,
    jar: PrivateCookieJar,
    Form(submission): Form<CsrfForm<RawPatientForm>>,
) -> Result<Response, StrokedeskError> {
    verify_csrf(&jar, submission.csrf_token.as_deref(), &state, &client_ip)?;

    let id = admit_patient(&state.records, &submission.form, Some(account.id)).await?;

    security_event(
        SecurityEvent::PatientCreated,
        client_ip.as_str(),
        Some(account.id),
        &format!("record {id}"),
    );
    info!(username = %account.username, id = %id, "patient added");
    Ok(Redirect::to("/patients/").into_response())
}

/// GET /patients/view/{id}
async fn view_patient(
    State(state): State<StrokedeskState>,
    _account: SessionAccount,
    Path(id): Path<String>,
) -> Result<Response, StrokedeskError> {
    let record = state
        .records
        .get(&id)
        .await
        .ok_or(StrokedeskError::NotFound("Patient record"))?;
    Ok(Json(record).into_response())
}

/// GET /patients/edit/{id}
async fn edit_form(
    State(state): State<StrokedeskState>,
    _account: SessionAccount,
    Path(id): Path<String>,
    jar: PrivateCookieJar,
) -> Result<Response, StrokedeskError> {
    let record = state
        .records
        .get(&id)
        .await
        .ok_or(StrokedeskError::NotFound("Patient record"))?;

    let (jar, token) = ensure_csrf_token(jar, &state)?;
    let body = json!({
        "form": "edit_patient",
        "fields": patient_form_fields(),
        "patient": record,
        "csrf_token": token,
    });
    Ok((jar, Json(body)).into_response())
}

/// POST /patients/edit/{id}
///
/// An edit that changes nothing still lands on the record view.
async fn edit_patient(
    State(state): State<StrokedeskState>,
    account: SessionAccount,
    client_ip: ClientIp,
    Path(id): Path<String>,
    jar: PrivateCookieJar,
    Form(submission): Form<CsrfForm<RawPatientForm>>,
) -> Result<Response, StrokedeskError> {
    verify_csrf(&jar, submission.csrf_token.as_deref(), &state, &client_ip)?;

    let amended = amend_patient(&state.records, &id, &submission.form, Some(account.id)).await?;
    let id = amended.id;
    if amended.modified {
        security_event(
            SecurityEvent::PatientUpdated,
            client_ip.as_str(),
            Some(account.id),
            &format!("record {id}"),
        );
        info!(username = %account.username, id = %id, "patient updated");
    } else {
        info!(id = %id, "patient edit submitted without changes");
    }
    Ok(Redirect::to(&format!("/patients/view/{id}")).into_response())
}

/// GET /patients/delete/{id}
async fn delete_confirm(
    State(state): State<StrokedeskState>,
    _account: SessionAccount,
    Path(id): Path<String>,
    jar: PrivateCookieJar,
) -> Result<Response, StrokedeskError> {
    let record = state
        .records
        .get(&id)
        .await
        .ok_or(StrokedeskError::NotFound("Patient record"))?;

    let (jar, token) = ensure_csrf_token(jar, &state)?;
    let body = json!({
        "confirm": "delete_patient",
        "patient": record,
        "csrf_token": token,
    });
    Ok((jar, Json(body)).into_response())
}

/// Deletion carries no fields besides the CSRF token.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {}

/// POST /patients/delete/{id}
async fn delete_patient(
    State(state): State<StrokedeskState>,
    account: SessionAccount,
    client_ip: ClientIp,
    Path(id): Path<String>,
    jar: PrivateCookieJar,
    Form(submission): Form<CsrfForm<DeleteForm>>,
) -> Result<Response, StrokedeskError> {
    verify_csrf(&jar, submission.csrf_token.as_deref(), &state, &client_ip)?;

    if !state.records.delete(&id).await {
        return Err(StrokedeskError::NotFound("Patient record"));
    }

    security_event(
        SecurityEvent::PatientDeleted,
        client_ip.as_str(),
        Some(account.id),
        &format!("record {id}"),
    );
    info!(username = %account.username, id = %id, "patient deleted");
    Ok(Redirect::to("/patients/").into_response())
}

/// GET /patients/search?q=
async fn search_patients(
    State(state): State<StrokedeskState>,
    _account: SessionAccount,
    Query(query): Query<SearchQuery>,
) -> Json<Value> {
    let search_term = query.q.as_deref().unwrap_or("").trim().to_string();
    let patients = match SearchCriteria::parse(&search_term) {
        Some(criteria) => state.records.search(&criteria).await,
        None => Vec::new(),
    };

    Json(json!({
        "search_term": search_term,
        "count": patients.len(),
        "patients": patients,
    }))
}
