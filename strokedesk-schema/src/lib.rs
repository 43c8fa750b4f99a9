//! Patient record types and the validation rules that admit them.
//!
//! This crate is pure: no I/O, no async. The record store and HTTP layer live
//! in the `strokedesk` crate.

pub mod patient;
pub mod sanitize;
pub mod validation;

pub use patient::{PatientFields, PatientPatch, PatientRecord, RawPatientForm};
pub use sanitize::sanitize_input;
pub use validation::{ErrorCode, FieldError, ValidationErrors};
