use serde::{Deserialize, Serialize};

/// Patient record store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecordsConfig {
    /// SQLite URL of the patient record database.
    /// TOML: `records.database_url`. Default: `sqlite://records.db`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Records per page on the patient list.
    /// TOML: `records.page_size`. Default: `20`.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            page_size: default_page_size(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://records.db".to_string()
}

fn default_page_size() -> u32 {
    20
}
