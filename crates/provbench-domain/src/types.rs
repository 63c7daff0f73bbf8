use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::DomainError;

// ── Resource data ────────────────────────────────────────────────────────────

/// Mutable attribute bag handed to a resource's create/read operations.
///
/// Callers set the inputs (`name`, `project`, `location`, …) before invoking an
/// operation; the operation writes computed attributes and the resource id back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: Option<String>,
    fields: BTreeMap<String, Value>,
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// String value of `key`. Empty strings count as unset.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn require_str(&self, key: &str) -> Result<&str, DomainError> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Err(DomainError::MissingField(key.to_string())),
            Some(Value::String(s)) if s.is_empty() => {
                Err(DomainError::MissingField(key.to_string()))
            }
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(DomainError::InvalidField {
                key: key.to_string(),
                expected: "a string",
            }),
        }
    }

    /// Copy the listed top-level keys of an API response into the data. Keys the
    /// response lacks are left untouched.
    pub fn set_from_response(&mut self, response: &Map<String, Value>, keys: &[(&str, &str)]) {
        for (api_key, field) in keys {
            if let Some(v) = response.get(*api_key) {
                self.fields.insert((*field).to_string(), v.clone());
            }
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Mark the resource as gone.
    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}
