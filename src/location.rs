//! Addressing of message slots.
//!
//! A [`Location`] names where in a [`Message`] a value is read from or
//! written to. The configuration string convention is:
//!
//! - absent option — the message body,
//! - a bare name — a header of that name,
//! - a name with a leading `%` — a property of that name.
//!
//! The `%` marker is applied uniformly to reading, writing and removal.

use std::fmt;

use thiserror::Error;

use crate::constants::PROPERTY_MARKER;
use crate::message::{value_to_text, Message};
use serde_json::Value;

/// A slot of a [`Message`]: the body, a named header, or a named property.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Location {
    /// The message body.
    Body,
    /// A named message header.
    Header(String),
    /// A named contextual property.
    Property(String),
}

/// Errors that can arise parsing a [`Location`] from configuration.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum LocationError {
    /// The location string has no name.
    #[error("location name cannot be empty")]
    EmptyName,
}

impl Location {
    /// Parses a location configuration string.
    ///
    /// A leading [`PROPERTY_MARKER`] selects a property, anything else a
    /// header. The body is addressed by omitting the option entirely, so
    /// there is no string form for it here.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::EmptyName`] if the name (after a marker, if
    /// any) is empty.
    pub fn parse(input: &str) -> Result<Self, LocationError> {
        match input.strip_prefix(PROPERTY_MARKER) {
            Some("") => Err(LocationError::EmptyName),
            Some(name) => Ok(Self::Property(name.to_owned())),
            None if input.is_empty() => Err(LocationError::EmptyName),
            None => Ok(Self::Header(input.to_owned())),
        }
    }

    /// Reads the slot, coerced to text. Absent slots and `null` values
    /// yield `None`.
    pub fn read(&self, message: &Message) -> Option<String> {
        match self {
            Self::Body => value_to_text(message.body()),
            Self::Header(name) => message.header(name).and_then(value_to_text),
            Self::Property(name) => message.property(name).and_then(value_to_text),
        }
    }

    /// Writes `value` to the slot.
    pub fn write(&self, message: &mut Message, value: Value) {
        match self {
            Self::Body => message.set_body(value),
            Self::Header(name) => message.set_header(name.clone(), value),
            Self::Property(name) => message.set_property(name.clone(), value),
        }
    }

    /// Removes the slot. Removing the body resets it to `null`.
    pub fn remove(&self, message: &mut Message) {
        match self {
            Self::Body => message.set_body(Value::Null),
            Self::Header(name) => {
                message.remove_header(name);
            }
            Self::Property(name) => {
                message.remove_property(name);
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body => f.write_str("body"),
            Self::Header(name) => f.write_str(name),
            Self::Property(name) => write!(f, "{PROPERTY_MARKER}{name}"),
        }
    }
}
