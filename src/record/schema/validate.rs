use serde_json::Value;

use super::{EntitySchema, FieldKind, FieldSpec, RESERVED_KEYS};
use crate::record::core::error::RecordError;
use crate::record::core::model::Fields;
use crate::utils::dates::{format_date, parse_date_str};

/// Validate and normalize the domain fields of a new record.
///
/// Required fields must be present and non-blank. Omitted fields that
/// declare a default receive it; null or blank optional fields are dropped.
pub fn validate_create(schema: &EntitySchema, input: &Fields) -> Result<Fields, RecordError> {
    let mut out = Fields::new();
    for (key, value) in input {
        let spec = lookup(schema, key)?;
        if let Some(normalized) = normalize(spec, value)? {
            out.insert(key.clone(), normalized);
        }
    }

    let missing: Vec<&str> = schema
        .fields
        .iter()
        .filter(|f| f.required && !out.contains_key(f.name))
        .map(|f| f.name)
        .collect();
    if !missing.is_empty() {
        return Err(RecordError::validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    for spec in schema.fields {
        if let Some(default) = spec.default {
            out.entry(spec.name).or_insert_with(|| default.to_value());
        }
    }
    Ok(out)
}

/// Validate and normalize a partial update.
///
/// A `null` (or blank) value on an optional field is kept as `null` so the
/// merge removes the field; required fields may not be cleared.
pub fn validate_patch(schema: &EntitySchema, input: &Fields) -> Result<Fields, RecordError> {
    if input.is_empty() {
        return Err(RecordError::validation("Update payload is empty"));
    }

    let mut out = Fields::new();
    for (key, value) in input {
        let spec = lookup(schema, key)?;
        match normalize(spec, value)? {
            Some(normalized) => {
                out.insert(key.clone(), normalized);
            }
            None if spec.required => {
                return Err(RecordError::validation(format!(
                    "Field '{key}' is required and cannot be cleared"
                )));
            }
            None => {
                out.insert(key.clone(), Value::Null);
            }
        }
    }
    Ok(out)
}

fn lookup<'a>(schema: &'a EntitySchema, key: &str) -> Result<&'a FieldSpec, RecordError> {
    if RESERVED_KEYS.contains(&key) {
        return Err(RecordError::validation(format!(
            "Field '{key}' is managed by the workflow and cannot be set"
        )));
    }
    schema.field(key).ok_or_else(|| {
        RecordError::validation(format!(
            "Unknown field '{key}' for {}",
            schema.display_name
        ))
    })
}

/// Normalize one value. `Ok(None)` means "no value" (null or blank).
fn normalize(spec: &FieldSpec, value: &Value) -> Result<Option<Value>, RecordError> {
    if let Value::String(s) = value {
        if s.trim().is_empty() {
            return Ok(None);
        }
    }
    if value.is_null() {
        return Ok(None);
    }

    let invalid = |expected: &str| {
        RecordError::validation(format!(
            "Field '{}' must be {expected}, got {value}",
            spec.name
        ))
    };

    match spec.kind {
        FieldKind::Text => match value {
            Value::String(s) => Ok(Some(Value::from(s.trim()))),
            Value::Number(n) => Ok(Some(Value::from(n.to_string()))),
            Value::Bool(b) => Ok(Some(Value::from(b.to_string()))),
            _ => Err(invalid("text")),
        },
        FieldKind::Date => value
            .as_str()
            .and_then(parse_date_str)
            .map(|dt| Some(Value::from(format_date(dt))))
            .ok_or_else(|| invalid("a date (YYYY-MM-DD or RFC 3339)")),
        FieldKind::Number => match value {
            Value::Number(_) => Ok(Some(value.clone())),
            Value::String(s) => parse_number(s.trim())
                .map(Some)
                .ok_or_else(|| invalid("a number")),
            _ => Err(invalid("a number")),
        },
        FieldKind::Choice(allowed) => {
            let given = value.as_str().map(str::trim).unwrap_or_default();
            allowed
                .iter()
                .find(|candidate| candidate.eq_ignore_ascii_case(given))
                .map(|canonical| Some(Value::from(*canonical)))
                .ok_or_else(|| invalid(&format!("one of {}", allowed.join(", "))))
        }
    }
}

fn parse_number(s: &str) -> Option<Value> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::from(i));
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EntityType;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_create_applies_defaults_and_trims() {
        let schema = EntityType::Partner.schema();
        let out = validate_create(
            schema,
            &fields(json!({"university": "  MIT ", "country": "USA", "school": ""})),
        )
        .unwrap();
        assert_eq!(out["university"], "MIT");
        assert_eq!(out["activeStatus"], "Active");
        assert!(!out.contains_key("school"));
    }

    #[test]
    fn test_create_reports_missing_required() {
        let schema = EntityType::Partner.schema();
        let err = validate_create(schema, &fields(json!({"university": "MIT"}))).unwrap_err();
        assert!(matches!(err, RecordError::Validation(msg) if msg.contains("country")));
    }

    #[test]
    fn test_create_rejects_unknown_and_reserved_keys() {
        let schema = EntityType::Partner.schema();
        let err = validate_create(
            schema,
            &fields(json!({"university": "MIT", "country": "USA", "color": "red"})),
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::Validation(msg) if msg.contains("color")));

        let err = validate_create(
            schema,
            &fields(json!({"university": "MIT", "country": "USA", "status": "active"})),
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::Validation(msg) if msg.contains("status")));
    }

    #[test]
    fn test_dates_are_normalized() {
        let schema = EntityType::Membership.schema();
        let out = validate_create(
            schema,
            &fields(json!({"name": "ACU", "startDate": "2024-01-15", "endDate": "2024-06-01T10:00:00"})),
        )
        .unwrap();
        assert_eq!(out["startDate"], "2024-01-15T00:00:00.000Z");
        assert_eq!(out["endDate"], "2024-06-01T10:00:00.000Z");

        let err = validate_create(
            schema,
            &fields(json!({"name": "ACU", "startDate": "soon"})),
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::Validation(_)));
    }

    #[test]
    fn test_numbers_and_choices() {
        let schema = EntityType::ImmersionProgram.schema();
        let out = validate_create(
            schema,
            &fields(json!({
                "direction": "incoming",
                "university": "NUS",
                "country": "Singapore",
                "numberOfPax": "12",
                "feesPerPax": 99.5
            })),
        )
        .unwrap();
        assert_eq!(out["direction"], "Incoming");
        assert_eq!(out["numberOfPax"], 12);
        assert_eq!(out["feesPerPax"], 99.5);

        let err = validate_create(
            schema,
            &fields(json!({"direction": "sideways", "university": "NUS", "country": "SG"})),
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::Validation(msg) if msg.contains("Incoming")));
    }

    #[test]
    fn test_patch_rules() {
        let schema = EntityType::Partner.schema();
        assert!(validate_patch(schema, &Fields::new()).is_err());

        let out = validate_patch(schema, &fields(json!({"school": null, "university": "Z"}))).unwrap();
        assert_eq!(out["school"], Value::Null);
        assert_eq!(out["university"], "Z");

        let err = validate_patch(schema, &fields(json!({"country": "  "}))).unwrap_err();
        assert!(matches!(err, RecordError::Validation(msg) if msg.contains("country")));
    }
}
