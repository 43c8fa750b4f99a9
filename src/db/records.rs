use crate::db::models::DbPatientRow;
use crate::db::patch::{DbPatchable, RecordPatch};
use crate::db::pool::{apply_schema, connect_sqlite};
use crate::db::schema::PATIENTS_INIT;
use crate::error::StrokedeskError;
use chrono::Utc;
use sqlx::SqlitePool;
use strokedesk_schema::{PatientFields, PatientPatch, PatientRecord};
use tracing::{error, info, warn};
use uuid::Uuid;

const PATIENT_COLUMNS: &str = "id, patient_id, gender, age, hypertension, heart_disease, \
    ever_married, work_type, residence_type, avg_glucose_level, bmi, smoking_status, stroke, \
    created_at, updated_at, created_by, updated_by";

/// What a patient search matches on.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchCriteria {
    /// Exact match on the domain identifier.
    PatientId(i64),
    /// Case-insensitive substring over `gender`, `work_type` and `smoking_status`.
    Text(String),
}

impl SearchCriteria {
    /// Interpret a free-text search term. All-digit terms address `patient_id`;
    /// a blank term yields `None`.
    pub fn parse(term: &str) -> Option<Self> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }
        if term.bytes().all(|b| b.is_ascii_digit())
            && let Ok(n) = term.parse::<i64>()
        {
            return Some(SearchCriteria::PatientId(n));
        }
        Some(SearchCriteria::Text(term.to_string()))
    }
}

/// Persistence gateway for patient records.
///
/// Cheap to clone; every clone shares one connection pool. Apart from
/// [`RecordStore::create`], backend failures are logged and reported as
/// absence (`None`, `false`, empty, `0`).
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub async fn open(database_url: &str) -> Result<Self, StrokedeskError> {
        let pool = connect_sqlite(database_url).await?;
        apply_schema(&pool, PATIENTS_INIT).await?;
        info!("RecordStore initialized");
        Ok(Self { pool })
    }

    /// Insert a new record and return its opaque id.
    pub async fn create(
        &self,
        fields: &PatientFields,
        created_by: Option<i64>,
    ) -> Result<String, StrokedeskError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let res = sqlx::query(
            r#"
            INSERT INTO patients (
                id, patient_id, gender, age, hypertension, heart_disease, ever_married,
                work_type, residence_type, avg_glucose_level, bmi, smoking_status, stroke,
                created_at, updated_at, created_by, updated_by
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&id)
        .bind(fields.patient_id)
        .bind(fields.gender.as_str())
        .bind(fields.age)
        .bind(fields.hypertension)
        .bind(fields.heart_disease)
        .bind(fields.ever_married.as_str())
        .bind(fields.work_type.as_str())
        .bind(fields.residence_type.as_str())
        .bind(fields.avg_glucose_level)
        .bind(fields.bmi)
        .bind(fields.smoking_status.as_str())
        .bind(fields.stroke)
        .bind(now)
        .bind(now)
        .bind(created_by)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => {
                info!(id = %id, patient_id = fields.patient_id, "patient record created");
                Ok(id)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                warn!(patient_id = fields.patient_id, "duplicate patient_id rejected by store");
                Err(StrokedeskError::DuplicateKey {
                    patient_id: fields.patient_id,
                })
            }
            Err(e) => {
                error!("Error creating patient: {e}");
                Err(StrokedeskError::StoreUnavailable(e.to_string()))
            }
        }
    }

    /// Fetch one record. Malformed ids are treated as not found.
    pub async fn get(&self, id: &str) -> Option<PatientRecord> {
        let id = normalize_id(id)?;
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?");
        let row = sqlx::query_as::<_, DbPatientRow>(&sql)
            .bind(&id)
            .fetch_optional(&self.pool)
            .await;

        match row {
            Ok(row) => row.and_then(into_record_logged),
            Err(e) => {
                error!(id = %id, "Error retrieving patient: {e}");
                None
            }
        }
    }

    /// One page of records, newest first.
    pub async fn list(&self, skip: u64, limit: u64) -> Vec<PatientRecord> {
        let sql = format!(
            "SELECT {PATIENT_COLUMNS} FROM patients \
             ORDER BY created_at DESC, seq DESC LIMIT ? OFFSET ?"
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let skip = i64::try_from(skip).unwrap_or(i64::MAX);

        match sqlx::query_as::<_, DbPatientRow>(&sql)
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await
        {
            Ok(rows) => rows.into_iter().filter_map(into_record_logged).collect(),
            Err(e) => {
                error!("Error retrieving patients: {e}");
                Vec::new()
            }
        }
    }

    /// Merge `patch` into the record. `false` when not found or clinically unchanged.
    pub async fn update(&self, id: &str, patch: &PatientPatch) -> bool {
        let Some(id) = normalize_id(id) else {
            return false;
        };
        let patch = RecordPatch {
            id,
            patch: patch.clone(),
        };

        match patch.apply_patch(&self.pool).await {
            Ok(modified) => {
                if modified {
                    info!(id = %patch.id, "patient record updated");
                }
                modified
            }
            Err(e) => {
                error!(id = %patch.id, "Error updating patient: {e}");
                false
            }
        }
    }

    pub async fn delete(&self, id: &str) -> bool {
        let Some(id) = normalize_id(id) else {
            return false;
        };

        match sqlx::query("DELETE FROM patients WHERE id = ?")
            .bind(&id)
            .execute(&self.pool)
            .await
        {
            Ok(res) if res.rows_affected() > 0 => {
                info!(id = %id, "patient record deleted");
                true
            }
            Ok(_) => false,
            Err(e) => {
                error!(id = %id, "Error deleting patient: {e}");
                false
            }
        }
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> Vec<PatientRecord> {
        let rows = match criteria {
            SearchCriteria::PatientId(patient_id) => {
                let sql = format!(
                    "SELECT {PATIENT_COLUMNS} FROM patients WHERE patient_id = ? \
                     ORDER BY created_at DESC, seq DESC"
                );
                sqlx::query_as::<_, DbPatientRow>(&sql)
                    .bind(*patient_id)
                    .fetch_all(&self.pool)
                    .await
            }
            SearchCriteria::Text(term) => {
                // SQLite LIKE is case-insensitive for ASCII.
                let sql = format!(
                    "SELECT {PATIENT_COLUMNS} FROM patients \
                     WHERE gender LIKE ?1 ESCAPE '\\' \
                        OR work_type LIKE ?1 ESCAPE '\\' \
                        OR smoking_status LIKE ?1 ESCAPE '\\' \
                     ORDER BY created_at DESC, seq DESC"
                );
                sqlx::query_as::<_, DbPatientRow>(&sql)
                    .bind(like_pattern(term))
                    .fetch_all(&self.pool)
                    .await
            }
        };

        match rows {
            Ok(rows) => rows.into_iter().filter_map(into_record_logged).collect(),
            Err(e) => {
                error!("Error searching patients: {e}");
                Vec::new()
            }
        }
    }

    pub async fn count(&self) -> u64 {
        match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM patients")
            .fetch_one(&self.pool)
            .await
        {
            Ok(n) => u64::try_from(n).unwrap_or(0),
            Err(e) => {
                error!("Error counting patients: {e}");
                0
            }
        }
    }
}

/// Canonical hyphenated form of a record id, or `None` when it is not a UUID.
fn normalize_id(id: &str) -> Option<String> {
    Uuid::parse_str(id.trim()).ok().map(|u| u.to_string())
}

fn into_record_logged(row: DbPatientRow) -> Option<PatientRecord> {
    match row.into_record() {
        Ok(record) => Some(record),
        Err(e) => {
            error!("Skipping unreadable patient row: {e}");
            None
        }
    }
}

fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}
