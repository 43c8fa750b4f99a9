use super::{ErrorCode, ValidationErrors};
use crate::sanitize::sanitize_input;

/// Sanitized, non-empty text or a `required` error.
pub(crate) fn required_text(
    raw: Option<&str>,
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let value = raw.map(sanitize_input).filter(|v| !v.is_empty());
    if value.is_none() {
        errors.push(field, ErrorCode::Required, format!("{label} is required"));
    }
    value
}

/// Required value that must match one of a closed set of spellings.
pub(crate) fn choice<T>(
    raw: Option<&str>,
    field: &str,
    label: &str,
    parse: impl Fn(&str) -> Option<T>,
    errors: &mut ValidationErrors,
) -> Option<T> {
    let value = required_text(raw, field, label, errors)?;
    let parsed = parse(&value);
    if parsed.is_none() {
        errors.push(field, ErrorCode::InvalidChoice, "Not a valid choice");
    }
    parsed
}

/// Required 0/1 flag.
pub(crate) fn flag(
    raw: Option<&str>,
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) -> Option<u8> {
    choice(
        raw,
        field,
        label,
        |v| match v {
            "0" => Some(0),
            "1" => Some(1),
            _ => None,
        },
        errors,
    )
}

/// Required finite float within `[min, max]`.
pub(crate) fn bounded_float(
    raw: Option<&str>,
    field: &str,
    label: &str,
    (min, max): (f64, f64),
    range_message: &str,
    errors: &mut ValidationErrors,
) -> Option<f64> {
    let Some(text) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        errors.push(field, ErrorCode::Required, format!("{label} is required"));
        return None;
    };
    check_float(text, field, (min, max), range_message, errors)
}

/// Optional finite float: blank or absent is `Some(None)`, a value outside
/// `[min, max]` is an error (`None`).
pub(crate) fn optional_bounded_float(
    raw: Option<&str>,
    field: &str,
    (min, max): (f64, f64),
    range_message: &str,
    errors: &mut ValidationErrors,
) -> Option<Option<f64>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Some(None),
        Some(text) => check_float(text, field, (min, max), range_message, errors).map(Some),
    }
}

/// Required integer within `[min, max]`.
pub(crate) fn bounded_int(
    raw: Option<&str>,
    field: &str,
    label: &str,
    (min, max): (i64, i64),
    range_message: &str,
    errors: &mut ValidationErrors,
) -> Option<i64> {
    let Some(text) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        errors.push(field, ErrorCode::Required, format!("{label} is required"));
        return None;
    };
    let Ok(value) = text.parse::<i64>() else {
        errors.push(field, ErrorCode::InvalidNumber, "Not a valid integer value");
        return None;
    };
    if !(min..=max).contains(&value) {
        errors.push(field, ErrorCode::OutOfRange, range_message);
        return None;
    }
    Some(value)
}

fn check_float(
    text: &str,
    field: &str,
    (min, max): (f64, f64),
    range_message: &str,
    errors: &mut ValidationErrors,
) -> Option<f64> {
    let value = match text.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            errors.push(field, ErrorCode::InvalidNumber, "Not a valid float value");
            return None;
        }
    };
    if !(min..=max).contains(&value) {
        errors.push(field, ErrorCode::OutOfRange, range_message);
        return None;
    }
    Some(value)
}
