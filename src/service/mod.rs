pub mod accounts;
pub mod password;
pub mod patient_intake;

pub use accounts::Accounts;
pub use patient_intake::{Amendment, admit_patient, amend_patient};
