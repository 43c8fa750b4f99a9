use super::ValidationErrors;
use super::fields::{bounded_float, bounded_int, choice, flag, optional_bounded_float};
use crate::patient::{
    EverMarried, Gender, PatientFields, PatientPatch, RawPatientForm, ResidenceType,
    SmokingStatus, WorkType,
};

pub const PATIENT_ID_MIN: u32 = 1;
pub const PATIENT_ID_MAX: u32 = 999_999;

const AGE_RANGE: (f64, f64) = (0.0, 120.0);
const GLUCOSE_RANGE: (f64, f64) = (0.0, 500.0);
const BMI_RANGE: (f64, f64) = (10.0, 100.0);

/// Everything editable after creation, validated together.
struct ClinicalFields {
    gender: Gender,
    age: f64,
    hypertension: u8,
    heart_disease: u8,
    ever_married: EverMarried,
    work_type: WorkType,
    residence_type: ResidenceType,
    avg_glucose_level: f64,
    bmi: Option<f64>,
    smoking_status: SmokingStatus,
    stroke: u8,
}

/// Validates a creation form. The duplicate `patient_id` lookup is the
/// caller's job since it needs the record store.
pub fn validate_new_patient(form: &RawPatientForm) -> Result<PatientFields, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let patient_id = check_patient_id(form, &mut errors);
    let clinical = check_clinical(form, &mut errors);

    match (patient_id, clinical) {
        (Some(patient_id), Some(c)) if errors.is_empty() => Ok(PatientFields {
            patient_id,
            gender: c.gender,
            age: c.age,
            hypertension: c.hypertension,
            heart_disease: c.heart_disease,
            ever_married: c.ever_married,
            work_type: c.work_type,
            residence_type: c.residence_type,
            avg_glucose_level: c.avg_glucose_level,
            bmi: c.bmi,
            smoking_status: c.smoking_status,
            stroke: c.stroke,
        }),
        _ => Err(errors),
    }
}

/// Validates an edit form. Any `patient_id` in the submission is ignored.
pub fn validate_patient_update(form: &RawPatientForm) -> Result<PatientPatch, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    match check_clinical(form, &mut errors) {
        Some(c) if errors.is_empty() => Ok(PatientPatch {
            gender: Some(c.gender),
            age: Some(c.age),
            hypertension: Some(c.hypertension),
            heart_disease: Some(c.heart_disease),
            ever_married: Some(c.ever_married),
            work_type: Some(c.work_type),
            residence_type: Some(c.residence_type),
            avg_glucose_level: Some(c.avg_glucose_level),
            bmi: Some(c.bmi),
            smoking_status: Some(c.smoking_status),
            stroke: Some(c.stroke),
            updated_by: None,
        }),
        _ => Err(errors),
    }
}

/// The submitted `patient_id` if it is well-formed and in range, regardless of
/// whether the rest of the form is valid. Used for the duplicate lookup so the
/// `duplicate` error is reported alongside any other field errors.
pub fn candidate_patient_id(form: &RawPatientForm) -> Option<u32> {
    check_patient_id(form, &mut ValidationErrors::new())
}

fn check_patient_id(form: &RawPatientForm, errors: &mut ValidationErrors) -> Option<u32> {
    bounded_int(
        form.patient_id.as_deref(),
        "patient_id",
        "Patient ID",
        (i64::from(PATIENT_ID_MIN), i64::from(PATIENT_ID_MAX)),
        "Invalid Patient ID",
        errors,
    )
    .and_then(|v| u32::try_from(v).ok())
}

fn check_clinical(form: &RawPatientForm, errors: &mut ValidationErrors) -> Option<ClinicalFields> {
    let gender = choice(form.gender.as_deref(), "gender", "Gender", Gender::parse, errors);
    let age = bounded_float(
        form.age.as_deref(),
        "age",
        "Age",
        AGE_RANGE,
        "Age must be between 0 and 120",
        errors,
    );
    let hypertension = flag(
        form.hypertension.as_deref(),
        "hypertension",
        "Hypertension status",
        errors,
    );
    let heart_disease = flag(
        form.heart_disease.as_deref(),
        "heart_disease",
        "Heart disease status",
        errors,
    );
    let ever_married = choice(
        form.ever_married.as_deref(),
        "ever_married",
        "Marital status",
        EverMarried::parse,
        errors,
    );
    let work_type = choice(
        form.work_type.as_deref(),
        "work_type",
        "Work type",
        WorkType::parse,
        errors,
    );
    let residence_type = choice(
        form.residence_type.as_deref(),
        "residence_type",
        "Residence type",
        ResidenceType::parse,
        errors,
    );
    let avg_glucose_level = bounded_float(
        form.avg_glucose_level.as_deref(),
        "avg_glucose_level",
        "Average glucose level",
        GLUCOSE_RANGE,
        "Glucose level must be between 0 and 500",
        errors,
    );
    let bmi = optional_bounded_float(
        form.bmi.as_deref(),
        "bmi",
        BMI_RANGE,
        "BMI must be between 10 and 100",
        errors,
    );
    let smoking_status = choice(
        form.smoking_status.as_deref(),
        "smoking_status",
        "Smoking status",
        SmokingStatus::parse,
        errors,
    );
    let stroke = flag(form.stroke.as_deref(), "stroke", "Stroke status", errors);

    Some(ClinicalFields {
        gender: gender?,
        age: age?,
        hypertension: hypertension?,
        heart_disease: heart_disease?,
        ever_married: ever_married?,
        work_type: work_type?,
        residence_type: residence_type?,
        avg_glucose_level: avg_glucose_level?,
        bmi: bmi?,
        smoking_status: smoking_status?,
        stroke: stroke?,
    })
}
