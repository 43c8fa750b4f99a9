use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use strokedesk::config::Config;
use strokedesk::db::RecordStore;
use strokedesk::server::{StrokedeskState, strokedesk_router};
use tower::ServiceExt;

const PASSWORD: &str = "Secure123!";

struct TestApp {
    app: Router,
    session: String,
    files: Vec<std::path::PathBuf>,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        for f in &self.files {
            let _ = std::fs::remove_file(f);
        }
    }
}

fn temp_database(tag: &str) -> (String, std::path::PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "strokedesk-patients-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    (format!("sqlite:{}", temp_path.display()), temp_path)
}

fn cookie_header_from_set_cookie_headers(headers: &axum::http::HeaderMap) -> String {
    let mut pairs: Vec<String> = Vec::new();
    for v in headers.get_all(header::SET_COOKIE).iter() {
        let s = v.to_str().expect("set-cookie header was not valid utf-8");
        let first = s.split(';').next().unwrap_or("");
        let mut parts = first.splitn(2, '=');
        let name = parts.next().unwrap_or("");
        let value = parts.next().unwrap_or("");
        if !name.trim().is_empty() {
            pairs.push(format!("{}={}", name.trim(), value));
        }
    }
    pairs.join("; ")
}

fn form_body(pairs: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

async fn send(app: &Router, method: &str, uri: &str, cookie: &str, form: Option<&[(&str, &str)]>) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie);
    let body = match form {
        Some(pairs) => {
            builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            Body::from(form_body(pairs))
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).expect("failed to build request"))
        .await
        .expect("request failed")
}

/// Build the app, register one account and sign it in.
async fn signed_in_app() -> TestApp {
    let (accounts_url, accounts_path) = temp_database("users");
    let (records_url, records_path) = temp_database("records");

    let mut cfg = Config::default();
    cfg.basic.secret_key = "k".repeat(64);
    cfg.security.csrf_enabled = false;
    cfg.security.password_hash_iterations = 1_000;
    cfg.records.page_size = 2;

    let accounts = strokedesk::db::spawn(&accounts_url)
        .await
        .expect("spawn account actor");
    let records = RecordStore::open(&records_url)
        .await
        .expect("open record store");
    let app = strokedesk_router(StrokedeskState::new(accounts, records, &cfg));

    let resp = send(
        &app,
        "POST",
        "/auth/register",
        "",
        Some(&[
            ("username", "nurse"),
            ("email", "nurse@example.com"),
            ("password", PASSWORD),
            ("confirm_password", PASSWORD),
        ]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = send(
        &app,
        "POST",
        "/auth/login",
        "",
        Some(&[("username", "nurse"), ("password", PASSWORD)]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let session = cookie_header_from_set_cookie_headers(resp.headers());

    TestApp {
        app,
        session,
        files: vec![accounts_path, records_path],
    }
}

fn patient_form(patient_id: &'static str) -> Vec<(&'static str, &'static str)> {
    vec![
        ("patient_id", patient_id),
        ("gender", "Male"),
        ("age", "45"),
        ("hypertension", "0"),
        ("heart_disease", "0"),
        ("ever_married", "Yes"),
        ("work_type", "Private"),
        ("residence_type", "Urban"),
        ("avg_glucose_level", "120.5"),
        ("bmi", "25.3"),
        ("smoking_status", "never smoked"),
        ("stroke", "0"),
    ]
}

/// Replace one field of a form, keeping the rest.
fn with(
    mut form: Vec<(&'static str, &'static str)>,
    field: &'static str,
    value: &'static str,
) -> Vec<(&'static str, &'static str)> {
    form.retain(|(k, _)| *k != field);
    form.push((field, value));
    form
}

async fn json_body(resp: Response) -> Value {
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&body).expect("response body was not JSON")
}

fn location(resp: &Response) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

fn has_error(body: &Value, field: &str, code: &str) -> bool {
    body["error"]["details"]
        .as_array()
        .is_some_and(|d| d.iter().any(|e| e["field"] == field && e["code"] == code))
}

#[tokio::test]
async fn patient_pages_require_a_session() {
    let t = signed_in_app().await;

    for uri in ["/patients/", "/patients/add", "/patients/search?q=1"] {
        let resp = send(&t.app, "GET", uri, "", None).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
    let resp = send(&t.app, "POST", "/patients/add", "", Some(&patient_form("1"))).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn add_view_and_reject_duplicates() {
    let t = signed_in_app().await;

    let resp = send(&t.app, "GET", "/patients/add", &t.session, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let fields = body["fields"].as_array().expect("fields");
    assert_eq!(fields.len(), 12);
    let work = fields
        .iter()
        .find(|f| f["name"] == "work_type")
        .expect("work_type field");
    assert!(
        work["choices"]
            .as_array()
            .expect("choices")
            .contains(&Value::from("Govt_job"))
    );

    let form = patient_form("12345");
    let resp = send(&t.app, "POST", "/patients/add", &t.session, Some(&form)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/patients/");

    let resp = send(&t.app, "GET", "/patients/", &t.session, None).await;
    let list = json_body(resp).await;
    assert_eq!(list["total_count"], 1);
    let id = list["patients"][0]["id"].as_str().expect("id").to_string();
    assert_eq!(list["patients"][0]["patient_id"], 12345);

    let resp = send(&t.app, "GET", &format!("/patients/view/{id}"), &t.session, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let record = json_body(resp).await;
    assert_eq!(record["gender"], "Male");
    assert_eq!(record["smoking_status"], "never smoked");
    assert_eq!(record["bmi"], 25.3);
    assert!(record["created_by"].is_i64());

    // Same patient_id again: friendly field error, nothing stored.
    let resp = send(&t.app, "POST", "/patients/add", &t.session, Some(&form)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(resp).await;
    assert!(has_error(&body, "patient_id", "duplicate"));

    // Duplicate and other field errors are reported together.
    let bad = with(form.clone(), "age", "150");
    let resp = send(&t.app, "POST", "/patients/add", &t.session, Some(&bad)).await;
    let body = json_body(resp).await;
    assert!(has_error(&body, "patient_id", "duplicate"));
    assert!(has_error(&body, "age", "out_of_range"));

    let resp = send(&t.app, "GET", "/dashboard", &t.session, None).await;
    assert_eq!(json_body(resp).await["patient_count"], 1);
}

#[tokio::test]
async fn invalid_forms_are_rejected_per_field() {
    let t = signed_in_app().await;

    let form = with(
        with(with(patient_form("0"), "age", "150"), "gender", "male"),
        "stroke",
        "2",
    );
    let resp = send(&t.app, "POST", "/patients/add", &t.session, Some(&form)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(resp).await;
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    assert!(has_error(&body, "patient_id", "out_of_range"));
    assert!(has_error(&body, "age", "out_of_range"));
    assert!(has_error(&body, "gender", "invalid_choice"));
    assert!(has_error(&body, "stroke", "invalid_choice"));

    // Empty bmi is accepted and stored as null.
    let form = with(patient_form("77"), "bmi", "");
    let resp = send(&t.app, "POST", "/patients/add", &t.session, Some(&form)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let resp = send(&t.app, "GET", "/patients/search?q=77", &t.session, None).await;
    let body = json_body(resp).await;
    assert_eq!(body["count"], 1);
    assert!(body["patients"][0]["bmi"].is_null());
}

#[tokio::test]
async fn edit_updates_clinical_fields_only() {
    let t = signed_in_app().await;

    let form = patient_form("500");
    send(&t.app, "POST", "/patients/add", &t.session, Some(&form)).await;
    let resp = send(&t.app, "GET", "/patients/search?q=500", &t.session, None).await;
    let id = json_body(resp).await["patients"][0]["id"]
        .as_str()
        .expect("id")
        .to_string();

    let resp = send(&t.app, "GET", &format!("/patients/edit/{id}"), &t.session, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["patient"]["age"], 45.0);

    // patient_id in an edit submission is ignored.
    let edit = with(with(form.clone(), "age", "50"), "patient_id", "999");
    let resp = send(
        &t.app,
        "POST",
        &format!("/patients/edit/{id}"),
        &t.session,
        Some(&edit),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/patients/view/{id}"));

    let resp = send(&t.app, "GET", &format!("/patients/view/{id}"), &t.session, None).await;
    let record = json_body(resp).await;
    assert_eq!(record["age"], 50.0);
    assert_eq!(record["patient_id"], 500);
    assert!(record["updated_by"].is_i64());

    // Resubmitting the same values still lands on the record.
    let resp = send(
        &t.app,
        "POST",
        &format!("/patients/edit/{id}"),
        &t.session,
        Some(&edit),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let bad = with(form, "smoking_status", "sometimes");
    let resp = send(
        &t.app,
        "POST",
        &format!("/patients/edit/{id}"),
        &t.session,
        Some(&bad),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let missing = uuid::Uuid::new_v4();
    let resp = send(
        &t.app,
        "POST",
        &format!("/patients/edit/{missing}"),
        &t.session,
        Some(&patient_form("500")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_view_is_not_found() {
    let t = signed_in_app().await;

    send(&t.app, "POST", "/patients/add", &t.session, Some(&patient_form("9"))).await;
    let resp = send(&t.app, "GET", "/patients/search?q=9", &t.session, None).await;
    let id = json_body(resp).await["patients"][0]["id"]
        .as_str()
        .expect("id")
        .to_string();

    let resp = send(&t.app, "GET", &format!("/patients/delete/{id}"), &t.session, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["patient"]["patient_id"], 9);

    let resp = send(
        &t.app,
        "POST",
        &format!("/patients/delete/{id}"),
        &t.session,
        Some(&[]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/patients/");

    let resp = send(&t.app, "GET", &format!("/patients/view/{id}"), &t.session, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["error"]["code"], "NOT_FOUND");

    let resp = send(
        &t.app,
        "POST",
        &format!("/patients/delete/{id}"),
        &t.session,
        Some(&[]),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&t.app, "GET", "/patients/view/not-an-id", &t.session, None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_paginates_and_search_matches() {
    let t = signed_in_app().await;

    let mut a = with(patient_form("1"), "gender", "Female");
    a = with(a, "smoking_status", "smokes");
    for form in [a, patient_form("2"), patient_form("3")] {
        let resp = send(&t.app, "POST", "/patients/add", &t.session, Some(&form)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    let resp = send(&t.app, "GET", "/patients/", &t.session, None).await;
    let page1 = json_body(resp).await;
    assert_eq!(page1["page"], 1);
    assert_eq!(page1["total_count"], 3);
    assert_eq!(page1["total_pages"], 2);
    assert_eq!(page1["patients"].as_array().expect("patients").len(), 2);
    assert_eq!(page1["patients"][0]["patient_id"], 3);

    let resp = send(&t.app, "GET", "/patients/?page=2", &t.session, None).await;
    let page2 = json_body(resp).await;
    assert_eq!(page2["patients"].as_array().expect("patients").len(), 1);
    assert_eq!(page2["patients"][0]["patient_id"], 1);

    let resp = send(&t.app, "GET", "/patients/?page=abc", &t.session, None).await;
    assert_eq!(json_body(resp).await["page"], 1);

    let resp = send(&t.app, "GET", "/patients/search?q=female", &t.session, None).await;
    assert_eq!(json_body(resp).await["count"], 1);

    let resp = send(&t.app, "GET", "/patients/search?q=SMOK", &t.session, None).await;
    assert_eq!(json_body(resp).await["count"], 3);

    let resp = send(&t.app, "GET", "/patients/search?q=2", &t.session, None).await;
    let body = json_body(resp).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["patients"][0]["patient_id"], 2);

    let resp = send(&t.app, "GET", "/patients/search?q=", &t.session, None).await;
    let body = json_body(resp).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["search_term"], "");

    let resp = send(&t.app, "GET", "/patients/search", &t.session, None).await;
    assert_eq!(json_body(resp).await["count"], 0);
}
