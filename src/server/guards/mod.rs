pub mod client_ip;
pub mod csrf;
pub mod session;

pub use client_ip::ClientIp;
pub use csrf::{CsrfForm, ensure_csrf_token, verify_csrf};
pub use session::{SessionAccount, clear_session, issue_session};
