use super::choices::{EverMarried, Gender, ResidenceType, SmokingStatus, WorkType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clinical attributes of one patient, as admitted by validation.
///
/// `hypertension`, `heart_disease` and `stroke` are 0/1 flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientFields {
    pub patient_id: u32,
    pub gender: Gender,
    pub age: f64,
    pub hypertension: u8,
    pub heart_disease: u8,
    pub ever_married: EverMarried,
    pub work_type: WorkType,
    pub residence_type: ResidenceType,
    pub avg_glucose_level: f64,
    /// `None` is a valid permanent state, not a missing value.
    pub bmi: Option<f64>,
    pub smoking_status: SmokingStatus,
    pub stroke: u8,
}

/// A persisted patient document: clinical fields plus store-owned metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Opaque identifier assigned by the store on insert.
    pub id: String,
    #[serde(flatten)]
    pub fields: PatientFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
}

/// Partial update for a patient record. `patient_id` is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientPatch {
    pub gender: Option<Gender>,
    pub age: Option<f64>,
    pub hypertension: Option<u8>,
    pub heart_disease: Option<u8>,
    pub ever_married: Option<EverMarried>,
    pub work_type: Option<WorkType>,
    pub residence_type: Option<ResidenceType>,
    pub avg_glucose_level: Option<f64>,
    /// `None` => do not change; `Some(None)` => clear; `Some(Some(v))` => set
    pub bmi: Option<Option<f64>>,
    pub smoking_status: Option<SmokingStatus>,
    pub stroke: Option<u8>,
    pub updated_by: Option<i64>,
}

impl PatientPatch {
    /// Builds a patch that overwrites every editable field of `fields`.
    pub fn replacing(fields: &PatientFields) -> Self {
        Self {
            gender: Some(fields.gender),
            age: Some(fields.age),
            hypertension: Some(fields.hypertension),
            heart_disease: Some(fields.heart_disease),
            ever_married: Some(fields.ever_married),
            work_type: Some(fields.work_type),
            residence_type: Some(fields.residence_type),
            avg_glucose_level: Some(fields.avg_glucose_level),
            bmi: Some(fields.bmi),
            smoking_status: Some(fields.smoking_status),
            stroke: Some(fields.stroke),
            updated_by: None,
        }
    }

    pub fn by(mut self, account_id: i64) -> Self {
        self.updated_by = Some(account_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> PatientFields {
        PatientFields {
            patient_id: 12345,
            gender: Gender::Male,
            age: 45.0,
            hypertension: 0,
            heart_disease: 0,
            ever_married: EverMarried::Yes,
            work_type: WorkType::Private,
            residence_type: ResidenceType::Urban,
            avg_glucose_level: 120.5,
            bmi: Some(25.3),
            smoking_status: SmokingStatus::NeverSmoked,
            stroke: 0,
        }
    }

    fn sample_record() -> PatientRecord {
        let now = Utc::now();
        PatientRecord {
            id: "abc".to_string(),
            fields: sample_fields(),
            created_at: now,
            updated_at: now,
            created_by: Some(1),
            updated_by: None,
        }
    }

    #[test]
    fn record_serializes_flat_with_wire_spellings() {
        let value = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(value["patient_id"], 12345);
        assert_eq!(value["smoking_status"], "never smoked");
        assert_eq!(value["work_type"], "Private");
        assert_eq!(value["bmi"], 25.3);
        assert!(value.get("fields").is_none());
    }

    #[test]
    fn replacing_patch_names_every_editable_field() {
        let fields = sample_fields();
        let patch = PatientPatch::replacing(&fields).by(7);

        assert_eq!(patch.gender, Some(Gender::Male));
        assert_eq!(patch.age, Some(45.0));
        assert_eq!(patch.bmi, Some(Some(25.3)));
        assert_eq!(patch.stroke, Some(0));
        assert_eq!(patch.updated_by, Some(7));

        let mut no_bmi = fields;
        no_bmi.bmi = None;
        assert_eq!(PatientPatch::replacing(&no_bmi).bmi, Some(None));
    }
}
