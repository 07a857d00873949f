//! Per-message orchestration.
//!
//! [`process`] runs one message through the configured pipeline branch,
//! strictly in order: resolve input, resolve key, sign or verify, write
//! output, clean up the source slot. A failure in any step surfaces
//! immediately and leaves both the source and the target slot untouched,
//! so the original input stays available for diagnosis.

use log::debug;
use serde_json::Value;
use thiserror::Error;

use crate::endpoint::{ConfigError, Endpoint, Operation, OutputType};
use crate::extract::{self, ExtractError};
use crate::key::{self, KeyError};
use crate::location::Location;
use crate::message::Message;
use crate::token::{self, Claims, SignError, VerifyError};

/// Errors surfaced to the caller for one message.
///
/// None of these are retried automatically; a structurally invalid message
/// cannot succeed on a second attempt.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Endpoint configuration error.
    #[error("endpoint configuration error")]
    Config(#[from] ConfigError),

    /// Key resolution error.
    #[error("key resolution error")]
    Key(#[from] KeyError),

    /// The source slot holds no claims to sign.
    #[error("no claims found at the source location")]
    MissingClaims,

    /// The source slot holds no token to decode.
    #[error("no token found at the source location")]
    MissingToken,

    /// The source text is not valid claims JSON.
    #[error("cannot parse claims JSON")]
    ClaimsParse(#[source] serde_json::Error),

    /// Token extraction from the source text failed.
    #[error("token extraction error")]
    Extract(#[from] ExtractError),

    /// Signing failed.
    #[error("signing error")]
    Sign(#[from] SignError),

    /// Verification failed.
    #[error("verification error")]
    Verify(#[from] VerifyError),
}

/// Processes one message against the endpoint configuration.
///
/// Create reads claims JSON from the source slot, signs them and writes the
/// compact token to the target slot. Decode reads a token from the source
/// slot (optionally extracting it from free-form text), verifies it and
/// writes the claims to the target slot as a JSON string or a map,
/// depending on the endpoint's output type. Source and target default to
/// the body.
///
/// After success, an explicitly configured source slot is removed unless
/// `retainSource` is set; the body is always retained.
///
/// # Errors
///
/// Returns an [`Error`] describing the first failing step. On failure the
/// message is left exactly as it was received.
pub fn process(endpoint: &Endpoint, message: &mut Message) -> Result<(), Error> {
    let source = endpoint.source().unwrap_or(&Location::Body);
    let target = endpoint.target().unwrap_or(&Location::Body);

    debug!(
        "Processing message: operation={:?} algorithm={} source={source} target={target}",
        endpoint.operation(),
        endpoint.algorithm(),
    );

    let raw = source.read(message).ok_or(match endpoint.operation() {
        Operation::Create => Error::MissingClaims,
        Operation::Decode => Error::MissingToken,
    })?;

    let input = if endpoint.operation() == Operation::Decode && endpoint.decode_find_token() {
        extract::find_token(&raw)?.to_owned()
    } else {
        raw
    };

    let key = key::resolve(endpoint, message)?;

    let output = match endpoint.operation() {
        Operation::Create => {
            let claims = Claims::parse(&input).map_err(Error::ClaimsParse)?;
            let token = token::sign(
                &claims,
                endpoint.algorithm(),
                key.as_ref(),
                endpoint.really_want_none(),
            )?;
            Value::String(token)
        }
        Operation::Decode => {
            let claims = token::verify(
                &input,
                endpoint.algorithm(),
                key.as_ref(),
                endpoint.really_want_none(),
            )?;
            match endpoint.output_type() {
                OutputType::Json => Value::String(claims.to_json()),
                OutputType::Map => claims.into_value(),
            }
        }
    };

    target.write(message, output);

    // Cleanup runs only on success and only for explicit source slots; the
    // body is always retained.
    if let Some(source) = endpoint.source() {
        if !endpoint.retain_source() {
            debug!("Removing source slot: {source}");
            source.remove(message);
        }
    }

    Ok(())
}
