//! JWT construction, signing, verification and decoding.
//!
//! [`sign`] produces the compact serialization
//! `base64url(header).base64url(payload).base64url(signature)`; the
//! signature segment is empty for the unsecured `none` algorithm.
//! [`verify`] accepts exactly the configured algorithm, never the one the
//! token declares for itself, which closes the classic
//! algorithm-confusion/downgrade hole.
//!
//! Claims validation is limited to signature correctness: expiry, audience
//! and issuer checks are out of scope for this component.

use base64ct::{Base64UrlUnpadded, Encoding as _};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::algorithm::Algorithm;
use crate::key::Key;

/// A JSON object of application-defined claims.
///
/// Round-trips losslessly through JSON serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Parses claims from JSON text. The text must be a JSON object.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error if the text is not valid
    /// JSON or not an object.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self)
    }

    /// Serializes the claims as compact JSON text.
    pub fn to_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    /// Consumes the claims, yielding them as a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Returns the claims as a map.
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Errors that can arise signing claims into a token.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SignError {
    /// The `none` algorithm was selected without the explicit opt-in.
    #[error("algorithm 'none' is not allowed without explicit opt-in")]
    NoneNotAllowed,

    /// A signing algorithm was selected but no key was resolved.
    #[error("no key available for signing")]
    MissingKey,

    /// Error returned by the JWT encoding library.
    #[error("cannot encode token")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Errors that can arise verifying and decoding a token.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum VerifyError {
    /// The `none` algorithm was selected without the explicit opt-in.
    #[error("algorithm 'none' is not allowed without explicit opt-in")]
    NoneNotAllowed,

    /// A verifying algorithm was selected but no key was resolved.
    #[error("no key available for verification")]
    MissingKey,

    /// The token declares a different algorithm than the endpoint is
    /// configured to accept.
    #[error("token algorithm {found:?} does not match configured algorithm {expected}")]
    AlgorithmMismatch {
        /// The algorithm the endpoint is configured to accept.
        expected: &'static str,
        /// The algorithm the token declares.
        found: String,
    },

    /// The signature does not verify against the key, or a signature is
    /// present where none is expected.
    #[error("invalid token signature")]
    InvalidSignature,

    /// The token is not a well-formed compact serialization, or its header
    /// or claims are not valid base64url-encoded JSON.
    #[error("malformed compact serialization")]
    MalformedToken,
}

/// Maximum size for a decoded JWT segment. Caps allocations on adversarial
/// input; far above any realistic header or claims payload.
const MAX_SEGMENT_SIZE: usize = 64 * 1024;

/// Builds a signed, compact-serialized JWT from `claims`.
///
/// The header carries `typ: "JWT"` and the algorithm's wire identifier.
/// The `none` algorithm requires `allow_none` and produces an unsigned
/// token with an empty signature segment; `HS256` requires a key.
///
/// # Errors
///
/// Returns a [`SignError`] if the algorithm policy or key requirement is
/// not met, or the encoding library fails.
pub fn sign(
    claims: &Claims,
    algorithm: Algorithm,
    key: Option<&Key>,
    allow_none: bool,
) -> Result<String, SignError> {
    match algorithm {
        Algorithm::None => {
            if !allow_none {
                return Err(SignError::NoneNotAllowed);
            }

            let header = serde_json::json!({"typ": "JWT", "alg": algorithm.identifier()});
            let header_b64 = Base64UrlUnpadded::encode_string(header.to_string().as_bytes());
            let payload_b64 = Base64UrlUnpadded::encode_string(claims.to_json().as_bytes());

            // Unsecured JWS: empty signature segment, trailing dot kept.
            Ok(format!("{header_b64}.{payload_b64}."))
        }
        Algorithm::HS256 => {
            let key = key.ok_or(SignError::MissingKey)?;
            let header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256);

            Ok(jsonwebtoken::encode(
                &header,
                claims,
                &EncodingKey::from_secret(key.as_bytes()),
            )?)
        }
    }
}

/// Verifies a compact JWT against `algorithm` and `key`, producing claims.
///
/// The token's declared algorithm must equal the configured one; tokens
/// declaring anything else are rejected before any signature work. The
/// `none` algorithm requires `allow_none` and an empty signature segment.
///
/// # Errors
///
/// Returns a [`VerifyError`] on policy, structural or signature failure.
pub fn verify(
    token: &str,
    algorithm: Algorithm,
    key: Option<&Key>,
    allow_none: bool,
) -> Result<Claims, VerifyError> {
    let declared = declared_algorithm(token)?;
    if declared != algorithm.identifier() {
        return Err(VerifyError::AlgorithmMismatch {
            expected: algorithm.identifier(),
            found: declared,
        });
    }

    match algorithm {
        Algorithm::None => {
            if !allow_none {
                return Err(VerifyError::NoneNotAllowed);
            }
            verify_unsecured(token)
        }
        Algorithm::HS256 => {
            let key = key.ok_or(VerifyError::MissingKey)?;

            let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
            validation.validate_exp = false;
            validation.validate_aud = false;
            validation.required_spec_claims.clear();

            let data = jsonwebtoken::decode::<Map<String, Value>>(
                token,
                &DecodingKey::from_secret(key.as_bytes()),
                &validation,
            )
            .map_err(|err| match err.kind() {
                ErrorKind::InvalidSignature => VerifyError::InvalidSignature,
                ErrorKind::InvalidAlgorithm => VerifyError::AlgorithmMismatch {
                    expected: algorithm.identifier(),
                    found: String::new(),
                },
                _ => VerifyError::MalformedToken,
            })?;

            Ok(Claims(data.claims))
        }
    }
}

/// Reads the `alg` identifier out of the token header without trusting
/// anything else about the token.
fn declared_algorithm(token: &str) -> Result<String, VerifyError> {
    #[derive(Deserialize)]
    struct Header {
        alg: String,
    }

    let header_b64 = token.split('.').next().unwrap_or_default();
    let header_json = decode_segment(header_b64)?;
    let header: Header =
        serde_json::from_slice(&header_json).map_err(|_| VerifyError::MalformedToken)?;

    Ok(header.alg)
}

/// Decodes an unsecured (`alg: none`) token: two or three segments, the
/// third empty.
fn verify_unsecured(token: &str) -> Result<Claims, VerifyError> {
    let parts: Vec<&str> = token.split('.').collect();

    let payload_b64 = match parts.as_slice() {
        [_, payload] | [_, payload, ""] => *payload,
        [_, _, _] => return Err(VerifyError::InvalidSignature),
        _ => return Err(VerifyError::MalformedToken),
    };

    let payload = decode_segment(payload_b64)?;
    let claims: Map<String, Value> =
        serde_json::from_slice(&payload).map_err(|_| VerifyError::MalformedToken)?;

    Ok(Claims(claims))
}

/// Decodes a base64url (no padding) segment with a size cap.
fn decode_segment(segment: &str) -> Result<Vec<u8>, VerifyError> {
    // Base64url expands data by ~33%, so the encoded length bounds the
    // decoded size. Reject oversized input before allocating.
    if segment.len() > MAX_SEGMENT_SIZE * 4 / 3 {
        return Err(VerifyError::MalformedToken);
    }

    Base64UrlUnpadded::decode_vec(segment).map_err(|_| VerifyError::MalformedToken)
}
