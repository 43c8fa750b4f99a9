//! Database module: the account actor, the patient record store, and the
//! SQLite plumbing they share.
//!
//! Layout:
//! - `pool.rs`: connection options and schema bootstrap
//! - `schema.rs`: SQL DDL for both databases
//! - `models.rs`: Rust structs mirroring DB rows
//! - `actor.rs`: account store behind a ractor actor
//! - `records.rs`: patient record store over a shared pool

pub mod actor;
pub mod models;
pub mod patch;
pub mod pool;
pub mod records;
pub mod schema;

mod patch_impl;

pub use actor::{DbActorHandle, spawn};
pub use models::{DbAccount, DbPatientRow};
pub use patch::{AccountCreate, AccountPatch, DbPatchable, RecordPatch};
pub use records::{RecordStore, SearchCriteria};
pub use schema::{PATIENTS_INIT, USERS_INIT};
