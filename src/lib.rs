#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

//! Sign and verify compact JWTs inside a message-processing pipeline.
//!
//! This crate is the token-processing engine of a pipeline component: the
//! host routing engine builds an [`Endpoint`] once from string configuration
//! and then calls [`process`] for every message flowing through the route.
//! Claims and tokens are read from and written to addressable slots of a
//! [`Message`] (the body, a named header, or a named contextual property),
//! selected by [`Location`] descriptors.
//!
//! Supported algorithms are HMAC-SHA256 (`HS256`) and, strictly for testing,
//! the unsecured `none` algorithm behind an explicit opt-in flag.
//!
//! ## Signing
//!
//! ```
//! use std::collections::HashMap;
//! use jwt_pipeline::{process, Endpoint, Message};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let params = HashMap::from([
//!     ("algorithm".to_owned(), "none".to_owned()),
//!     ("operation".to_owned(), "Create".to_owned()),
//!     ("reallyWantNone".to_owned(), "true".to_owned()),
//! ]);
//! let endpoint = Endpoint::build(&params)?;
//!
//! let mut message = Message::from_body(r#"{"sub":"alice"}"#);
//! process(&endpoint, &mut message)?;
//!
//! // The body now holds the compact serialization `header.payload.`
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Verifying
//!
//! ```no_run
//! use std::collections::HashMap;
//! use jwt_pipeline::{process, Endpoint, Message};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let params = HashMap::from([
//!     ("algorithm".to_owned(), "HS256".to_owned()),
//!     ("operation".to_owned(), "Decode".to_owned()),
//!     ("privateKeyLocation".to_owned(), "file:///etc/keys/hs256.b64".to_owned()),
//!     ("source".to_owned(), "Authorization".to_owned()),
//!     ("decodeFindToken".to_owned(), "true".to_owned()),
//! ]);
//! let endpoint = Endpoint::build(&params)?;
//!
//! let mut message = Message::new();
//! message.set_header("Authorization", "Bearer eyJhb...".into());
//! process(&endpoint, &mut message)?;
//!
//! // The body now holds the verified claims as a JSON string.
//! # Ok(())
//! # }
//! ```
//!
//! ## Keys
//!
//! Key material is never accepted inline: the `privateKeyLocation` option
//! and its per-message override property must name a local `file:` resource
//! whose content is the base64-encoded HMAC secret. See the [`key`] module.

pub mod algorithm;
pub mod constants;
pub mod endpoint;
pub mod extract;
pub mod key;
pub mod location;
pub mod message;
pub mod processor;
pub mod token;

// -----------------------
// Re-exports
// -----------------------

pub use crate::{
    algorithm::Algorithm,
    endpoint::{ConfigError, Endpoint, Operation, OutputType},
    extract::ExtractError,
    key::{Key, KeyError},
    location::{Location, LocationError},
    message::Message,
    processor::{process, Error},
    token::{Claims, SignError, VerifyError},
};
