mod choices;
pub(crate) mod form;
mod record;

pub use choices::{EverMarried, Gender, ResidenceType, SmokingStatus, WorkType};
pub use form::RawPatientForm;
pub use record::{PatientFields, PatientPatch, PatientRecord};
