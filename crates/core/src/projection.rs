//! Client-requested field projection (`?fields=name,email`).

use serde_json::Value;

use crate::error::CoreError;
use crate::query_spec::EntityFields;

/// Field that survives every projection.
pub const ALWAYS_KEPT: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    fields: Vec<&'static str>,
}

impl Projection {
    /// Parse a comma-separated field list against the entity whitelist.
    ///
    /// Blank input (or only separators) means "no projection".
    pub fn parse(raw: &str, allowed: &EntityFields) -> Result<Option<Self>, CoreError> {
        let mut fields = Vec::new();
        for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let field = allowed.resolve(name)?;
            if !fields.contains(&field) {
                fields.push(field);
            }
        }

        if fields.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Self { fields }))
        }
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    /// Drop every key of a JSON object that is not projected.
    ///
    /// Non-object values pass through unchanged.
    pub fn apply(&self, value: Value) -> Value {
        match value {
            Value::Object(mut map) => {
                map.retain(|key, _| key == ALWAYS_KEPT || self.fields.contains(&key.as_str()));
                Value::Object(map)
            }
            other => other,
        }
    }
}
