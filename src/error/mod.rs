mod strokedesk;

pub use strokedesk::{ApiErrorBody, ApiErrorObject, StrokedeskError};
