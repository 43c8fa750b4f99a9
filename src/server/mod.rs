pub mod guards;
pub mod router;
pub mod routes;

pub use router::{StrokedeskState, strokedesk_router};
