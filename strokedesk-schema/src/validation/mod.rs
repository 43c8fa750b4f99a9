//! Field-level acceptance rules.
//!
//! Validators never stop at the first failure: every violation is collected
//! into [`ValidationErrors`] so a caller can report them in one pass.

mod account;
mod fields;
mod patient;

pub use account::{
    LoginForm, RegistrationForm, ValidLogin, ValidRegistration, validate_password_strength,
};
pub use patient::{
    PATIENT_ID_MAX, PATIENT_ID_MIN, candidate_patient_id, validate_new_patient,
    validate_patient_update,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable reason for a rejected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Required,
    OutOfRange,
    InvalidChoice,
    InvalidNumber,
    Duplicate,
    Length,
    InvalidFormat,
    WeakPassword,
    Mismatch,
    Taken,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Required => "required",
            ErrorCode::OutOfRange => "out_of_range",
            ErrorCode::InvalidChoice => "invalid_choice",
            ErrorCode::InvalidNumber => "invalid_number",
            ErrorCode::Duplicate => "duplicate",
            ErrorCode::Length => "length",
            ErrorCode::InvalidFormat => "invalid_format",
            ErrorCode::WeakPassword => "weak_password",
            ErrorCode::Mismatch => "mismatch",
            ErrorCode::Taken => "taken",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rejected field: `(field, code)` plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub code: ErrorCode,
    pub message: String,
}

/// Aggregate validation outcome; empty means accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, code: ErrorCode, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            code,
            message: message.into(),
        });
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `(field, code)` pairs, in the order they were recorded.
    pub fn codes(&self) -> Vec<(&str, ErrorCode)> {
        self.0.iter().map(|e| (e.field.as_str(), e.code)).collect()
    }

    pub fn has(&self, field: &str, code: ErrorCode) -> bool {
        self.0.iter().any(|e| e.field == field && e.code == code)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.code))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}
