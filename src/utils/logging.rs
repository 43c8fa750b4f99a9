use tracing::warn;

/// Kinds of audit-worthy events written to the `security` log target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    Registration,
    Login,
    FailedLogin,
    InactiveLogin,
    RateLimited,
    Logout,
    PatientCreated,
    PatientUpdated,
    PatientDeleted,
    CsrfRejected,
}

impl SecurityEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityEvent::Registration => "USER_REGISTRATION",
            SecurityEvent::Login => "USER_LOGIN",
            SecurityEvent::FailedLogin => "FAILED_LOGIN",
            SecurityEvent::InactiveLogin => "INACTIVE_LOGIN_ATTEMPT",
            SecurityEvent::RateLimited => "LOGIN_RATE_LIMITED",
            SecurityEvent::Logout => "USER_LOGOUT",
            SecurityEvent::PatientCreated => "PATIENT_CREATED",
            SecurityEvent::PatientUpdated => "PATIENT_UPDATED",
            SecurityEvent::PatientDeleted => "PATIENT_DELETED",
            SecurityEvent::CsrfRejected => "CSRF_REJECTED",
        }
    }
}

/// Emit one security event. `detail` must never carry passwords or clinical values.
pub(crate) fn security_event(
    event: SecurityEvent,
    client_ip: &str,
    account_id: Option<i64>,
    detail: &str,
) {
    warn!(
        target: "security",
        event = event.as_str(),
        client_ip,
        account_id = ?account_id,
        "{detail}"
    );
}
