//! Static per-module schemas.
//!
//! A schema names a module's domain fields and their kinds, which fields
//! render a label and take part in free-text search, whether edits go
//! through approval, and how `recordStatus` is derived.

pub mod definitions;
mod validate;

pub use validate::{validate_create, validate_patch};

use super::core::model::Fields;
use super::EntityType;

/// Kind of a domain field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Number,
    /// One of a fixed set of values, matched case-insensitively.
    Choice(&'static [&'static str]),
}

/// Default value applied at creation when a field is omitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Text(&'static str),
    Number(f64),
}

impl FieldDefault {
    #[must_use]
    pub fn to_value(self) -> serde_json::Value {
        match self {
            FieldDefault::Text(s) => serde_json::Value::from(s),
            FieldDefault::Number(n) => serde_json::Value::from(n),
        }
    }
}

/// A domain field declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<FieldDefault>,
}

impl FieldSpec {
    #[must_use]
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            required: false,
            default: None,
        }
    }

    #[must_use]
    pub const fn date(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Date,
            required: false,
            default: None,
        }
    }

    #[must_use]
    pub const fn number(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Number,
            required: false,
            default: None,
        }
    }

    #[must_use]
    pub const fn choice(name: &'static str, allowed: &'static [&'static str]) -> Self {
        Self {
            name,
            kind: FieldKind::Choice(allowed),
            required: false,
            default: None,
        }
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn with_default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }
}

/// How a module derives `recordStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryRule {
    /// The module does not track record status.
    None,
    /// Status is tracked but always `active`.
    PinnedActive,
    /// Status follows the `end` date; `start` is used for durations.
    Terminal {
        start: Option<&'static str>,
        end: &'static str,
    },
}

impl ExpiryRule {
    #[must_use]
    pub fn tracks_status(self) -> bool {
        !matches!(self, ExpiryRule::None)
    }
}

/// Static description of one module.
#[derive(Debug)]
pub struct EntitySchema {
    pub entity: EntityType,
    pub display_name: &'static str,
    pub fields: &'static [FieldSpec],
    pub label_fields: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub approval_gated: bool,
    pub expiry: ExpiryRule,
}

/// Keys owned by the workflow that callers may never set.
pub const RESERVED_KEYS: &[&str] = &[
    "id",
    "_id",
    "status",
    "pendingChanges",
    "deletionReason",
    "recordStatus",
    "createdBy",
    "updatedBy",
    "createdAt",
    "updatedAt",
    "revision",
];

impl EntitySchema {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Human label built from the first non-blank label fields.
    #[must_use]
    pub fn label(&self, fields: &Fields) -> String {
        let parts: Vec<&str> = self
            .label_fields
            .iter()
            .filter_map(|name| fields.get(*name).and_then(serde_json::Value::as_str))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        parts.join(" - ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_flags() {
        let spec = FieldSpec::text("country").required();
        assert!(spec.required);
        assert_eq!(spec.kind, FieldKind::Text);
        let spec = FieldSpec::number("numberOfPax").with_default(FieldDefault::Number(0.0));
        assert_eq!(spec.default.map(FieldDefault::to_value), Some(json!(0.0)));
    }

    #[test]
    fn test_label_skips_blank_fields() {
        let schema = EntityType::Partner.schema();
        let fields = json!({"university": "MIT", "country": "  "});
        let label = schema.label(fields.as_object().unwrap());
        assert_eq!(label, "MIT");
    }
}
