//! Per-message mutable context.
//!
//! A [`Message`] is the unit of work handed to [`process`](crate::process)
//! by the host pipeline: a body plus two independent namespaces of named
//! slots, *headers* (typically carried on the wire) and *properties*
//! (contextual, never leaving the pipeline). Slots hold JSON values so that
//! decoded claims can be placed as a structured map as well as text.

use std::collections::HashMap;

use serde_json::Value;

/// Mutable message context: a body plus named headers and properties.
///
/// All state is message-scoped; the pipeline holds no shared mutable state
/// across messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    body: Value,
    headers: HashMap<String, Value>,
    properties: HashMap<String, Value>,
}

impl Message {
    /// Creates an empty message with a null body and no slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a message with the given body.
    pub fn from_body(body: impl Into<Value>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// Returns the body value.
    pub const fn body(&self) -> &Value {
        &self.body
    }

    /// Replaces the body value.
    pub fn set_body(&mut self, body: Value) {
        self.body = body;
    }

    /// Returns the named header, if present.
    pub fn header(&self, name: &str) -> Option<&Value> {
        self.headers.get(name)
    }

    /// Sets the named header.
    pub fn set_header(&mut self, name: impl Into<String>, value: Value) {
        self.headers.insert(name.into(), value);
    }

    /// Removes the named header, returning its previous value.
    pub fn remove_header(&mut self, name: &str) -> Option<Value> {
        self.headers.remove(name)
    }

    /// Returns the named property, if present.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Sets the named property.
    pub fn set_property(&mut self, name: impl Into<String>, value: Value) {
        self.properties.insert(name.into(), value);
    }

    /// Removes the named property, returning its previous value.
    pub fn remove_property(&mut self, name: &str) -> Option<Value> {
        self.properties.remove(name)
    }
}

/// Coerces a slot value to text.
///
/// Strings are taken as-is, `null` counts as absent, and anything else is
/// rendered as its JSON serialization.
pub(crate) fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
