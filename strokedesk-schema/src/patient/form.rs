use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Raw patient form submission: field name → untyped value.
///
/// Accepts both url-encoded forms (every value a string) and JSON bodies
/// (numbers allowed). Unknown keys such as a submit button are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPatientForm {
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub patient_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub hypertension: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub heart_disease: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub ever_married: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub work_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub residence_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub avg_glucose_level: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub bmi: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub smoking_status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string_lax")]
    pub stroke: Option<String>,
}

/// Accepts a string, a number or a bool and keeps its textual form; `null` is absent.
pub(crate) fn deserialize_opt_string_lax<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;

    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(if b { "1" } else { "0" }.to_string())),
        Some(_) => Err(serde::de::Error::custom(
            "expected a string or a number for a form field",
        )),
    }
}
