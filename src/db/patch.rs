use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use strokedesk_schema::PatientPatch;

use crate::error::StrokedeskError;

/// Abstraction for applying a patch payload to the database.
///
/// Returns `true` when a row was actually modified.
#[async_trait]
pub trait DbPatchable {
    async fn apply_patch(&self, pool: &SqlitePool) -> Result<bool, StrokedeskError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountCreate {
    pub username: String,
    /// Stored lowercased.
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountPatch {
    pub id: i64,
    /// `None` => do not change; `Some(v)` => update
    pub last_login: Option<DateTime<Utc>>,
    /// `None` => do not change; `Some(v)` => update
    pub is_active: Option<bool>,
}

/// A patient patch addressed to one stored record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPatch {
    pub id: String,
    pub patch: PatientPatch,
}
