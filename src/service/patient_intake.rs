use crate::db::{RecordStore, SearchCriteria};
use crate::error::StrokedeskError;
use strokedesk_schema::validation::{
    candidate_patient_id, validate_new_patient, validate_patient_update,
};
use strokedesk_schema::{ErrorCode, RawPatientForm, ValidationErrors};
use tracing::debug;

/// Validate a creation form, run the advisory duplicate lookup, then insert.
///
/// Field errors and the `duplicate` error are reported together. The store's
/// UNIQUE constraint still decides a race between two concurrent creates.
pub async fn admit_patient(
    store: &RecordStore,
    form: &RawPatientForm,
    created_by: Option<i64>,
) -> Result<String, StrokedeskError> {
    let validated = validate_new_patient(form);

    let mut errors = match &validated {
        Ok(_) => ValidationErrors::new(),
        Err(errors) => errors.clone(),
    };

    if let Some(patient_id) = candidate_patient_id(form) {
        let existing = store
            .search(&SearchCriteria::PatientId(i64::from(patient_id)))
            .await;
        if !existing.is_empty() {
            errors.push(
                "patient_id",
                ErrorCode::Duplicate,
                format!("Patient ID {patient_id} already exists. Please use a unique ID."),
            );
        }
    }

    let fields = match validated {
        Ok(fields) if errors.is_empty() => fields,
        _ => return Err(errors.into()),
    };

    debug!(patient_id = fields.patient_id, "admitting patient");

    store.create(&fields, created_by).await
}

/// Outcome of an edit submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amendment {
    /// Canonical record id.
    pub id: String,
    /// Whether anything clinically changed.
    pub modified: bool,
}

/// Validate an edit form and merge it into the stored record.
pub async fn amend_patient(
    store: &RecordStore,
    id: &str,
    form: &RawPatientForm,
    updated_by: Option<i64>,
) -> Result<Amendment, StrokedeskError> {
    let Some(record) = store.get(id).await else {
        return Err(StrokedeskError::NotFound("Patient record"));
    };

    let mut patch = validate_patient_update(form)?;
    patch.updated_by = updated_by;

    let modified = store.update(&record.id, &patch).await;
    Ok(Amendment {
        id: record.id,
        modified,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::{SystemTime, UNIX_EPOCH};

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("log buffer poisoned").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("log buffer poisoned")).into_owned()
        }
    }

    fn temp_database() -> (String, std::path::PathBuf) {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();

        let mut temp_path = std::env::temp_dir();
        temp_path.push(format!(
            "strokedesk-intake-{}-{}.sqlite",
            std::process::id(),
            nanos
        ));
        (format!("sqlite:{}", temp_path.display()), temp_path)
    }

    #[tokio::test]
    async fn admission_logs_carry_no_clinical_values() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("strokedesk=debug"))
            .without_time()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (url, path) = temp_database();
        let store = RecordStore::open(&url).await.expect("open record store");

        let form: RawPatientForm = serde_json::from_value(serde_json::json!({
            "patient_id": "4242",
            "gender": "Female",
            "age": "67.5",
            "hypertension": "1",
            "heart_disease": "0",
            "ever_married": "Yes",
            "work_type": "Self-employed",
            "residence_type": "Rural",
            "avg_glucose_level": "228.69",
            "bmi": "36.6",
            "smoking_status": "formerly smoked",
            "stroke": "1",
        }))
        .expect("form");

        admit_patient(&store, &form, Some(1)).await.expect("admitted");

        let text = log.text();
        assert!(text.contains("admitting patient"), "{text}");
        assert!(text.contains("4242"));
        for clinical in ["228.69", "36.6", "67.5", "formerly smoked", "Self-employed"] {
            assert!(!text.contains(clinical), "{clinical} leaked into logs:\n{text}");
        }

        let _ = std::fs::remove_file(&path);
    }
}
