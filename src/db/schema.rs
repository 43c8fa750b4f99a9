//! SQL DDL for initializing the database schemas.
//! Accounts and patient records live in separate SQLite files.

/// Account database:
/// - `users` table (one login identity per row)
pub const USERS_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY NOT NULL,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    last_login TEXT NULL, -- RFC3339
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
"#;

/// Record database:
/// - `patients` table (one clinical document per row, `patient_id` unique)
///
/// `seq` breaks ties between records created within the same timestamp.
pub const PATIENTS_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS patients (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    patient_id INTEGER NOT NULL UNIQUE,
    gender TEXT NOT NULL,
    age REAL NOT NULL,
    hypertension INTEGER NOT NULL,
    heart_disease INTEGER NOT NULL,
    ever_married TEXT NOT NULL,
    work_type TEXT NOT NULL,
    residence_type TEXT NOT NULL,
    avg_glucose_level REAL NOT NULL,
    bmi REAL NULL,
    smoking_status TEXT NOT NULL,
    stroke INTEGER NOT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL, -- RFC3339
    created_by INTEGER NULL,
    updated_by INTEGER NULL
);

CREATE INDEX IF NOT EXISTS idx_patients_created_at ON patients(created_at);
"#;
