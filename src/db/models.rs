use crate::error::StrokedeskError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strokedesk_schema::patient::{EverMarried, Gender, ResidenceType, SmokingStatus, WorkType};
use strokedesk_schema::{PatientFields, PatientRecord};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbAccount {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Raw `patients` row. Enum columns are kept as text until [`DbPatientRow::into_record`].
#[derive(Debug, Clone, FromRow)]
pub struct DbPatientRow {
    pub id: String,
    pub patient_id: i64,
    pub gender: String,
    pub age: f64,
    pub hypertension: i64,
    pub heart_disease: i64,
    pub ever_married: String,
    pub work_type: String,
    pub residence_type: String,
    pub avg_glucose_level: f64,
    pub bmi: Option<f64>,
    pub smoking_status: String,
    pub stroke: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

impl DbPatientRow {
    pub fn into_record(self) -> Result<PatientRecord, StrokedeskError> {
        fn column<T>(value: Option<T>, name: &str, id: &str) -> Result<T, StrokedeskError> {
            value.ok_or_else(|| {
                StrokedeskError::UnexpectedError(format!(
                    "patients row {id} holds an unknown {name} value"
                ))
            })
        }
        fn flag(raw: i64, name: &str, id: &str) -> Result<u8, StrokedeskError> {
            column(u8::try_from(raw).ok().filter(|v| *v <= 1), name, id)
        }

        let id = self.id;
        let fields = PatientFields {
            patient_id: column(u32::try_from(self.patient_id).ok(), "patient_id", &id)?,
            gender: column(Gender::parse(&self.gender), "gender", &id)?,
            age: self.age,
            hypertension: flag(self.hypertension, "hypertension", &id)?,
            heart_disease: flag(self.heart_disease, "heart_disease", &id)?,
            ever_married: column(EverMarried::parse(&self.ever_married), "ever_married", &id)?,
            work_type: column(WorkType::parse(&self.work_type), "work_type", &id)?,
            residence_type: column(
                ResidenceType::parse(&self.residence_type),
                "residence_type",
                &id,
            )?,
            avg_glucose_level: self.avg_glucose_level,
            bmi: self.bmi,
            smoking_status: column(
                SmokingStatus::parse(&self.smoking_status),
                "smoking_status",
                &id,
            )?,
            stroke: flag(self.stroke, "stroke", &id)?,
        };

        Ok(PatientRecord {
            id,
            fields,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            updated_by: self.updated_by,
        })
    }
}
