//! Symmetric key resolution.
//!
//! Keys are never accepted inline: both the `privateKeyLocation` endpoint
//! option and the per-message override property
//! ([`JWT_PRIVATE_KEY_LOCATION`]) must name a local `file:` resource whose
//! content is the base64-encoded HMAC secret. Accepting unreviewed key
//! bytes from a header or property would defeat the point of restricting
//! keys to vetted resources, so anything that does not parse as a locator
//! is rejected as raw key material.
//!
//! Resolution performs no caching: every call re-reads and re-decodes the
//! resource. Callers that resolve keys on a hot path pay that I/O per
//! message.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use base64ct::{Base64, Encoding as _};
use log::debug;
use thiserror::Error;
use url::Url;
use zeroize::Zeroize;

use crate::algorithm::Algorithm;
use crate::constants::JWT_PRIVATE_KEY_LOCATION;
use crate::endpoint::Endpoint;
use crate::message::{value_to_text, Message};

const FILE_SCHEME: &str = "file";

/// Raw HMAC secret bytes, zeroized on drop.
///
/// A `Key` is owned exclusively by the resolution call that produced it and
/// is discarded with the message; it is never stored in process-wide state.
#[derive(Clone, Eq, PartialEq, Zeroize)]
#[zeroize(drop)]
pub struct Key {
    bytes: Vec<u8>,
}

impl Key {
    /// Returns the secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for Key {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never expose secret material through Debug output.
        write!(f, "Key({} bytes)", self.bytes.len())
    }
}

/// Errors that can arise validating a key locator or resolving a [`Key`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KeyError {
    /// Neither the endpoint nor the message provides a key location and the
    /// algorithm requires a key.
    #[error("no key location provided")]
    MissingLocation,

    /// The location does not parse as a resource locator at all. This is
    /// what raw key bytes in an option or property look like.
    #[error("key location must be a resource locator, not key material")]
    RawKeyMaterial,

    /// The location names a network resource.
    #[error("remote key locations are not allowed: {0}")]
    RemoteLocation(String),

    /// The location scheme is neither `file:` nor a known network scheme.
    #[error("unsupported key location scheme: {0}")]
    UnsupportedScheme(String),

    /// The `file:` locator does not translate to a local path.
    #[error("file: key location does not name a local path")]
    InvalidPath,

    /// The key resource could not be read.
    #[error("cannot read key resource: {location}")]
    ResourceUnavailable {
        /// The locator that failed to resolve.
        location: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The key resource content is not valid base64.
    #[error("key resource content is not valid base64")]
    MalformedKey,
}

/// Validates that `location` is a local, non-network resource locator and
/// returns the filesystem path it names.
///
/// Accepted: `file:` URIs. Rejected: network schemes (`http:`, `https:`),
/// other schemes, and anything that does not parse as a URI (treated as
/// raw key material).
///
/// # Errors
///
/// Returns the corresponding [`KeyError`] variant for each rejection.
pub fn validate_locator(location: &str) -> Result<PathBuf, KeyError> {
    let url = Url::parse(location).map_err(|_| KeyError::RawKeyMaterial)?;

    match url.scheme() {
        FILE_SCHEME => url.to_file_path().map_err(|()| KeyError::InvalidPath),
        "http" | "https" => Err(KeyError::RemoteLocation(location.to_owned())),
        other => Err(KeyError::UnsupportedScheme(other.to_owned())),
    }
}

/// Resolves the HMAC key for one message.
///
/// A key location carried in the message property
/// [`JWT_PRIVATE_KEY_LOCATION`] takes precedence over the endpoint's
/// configured location. The override is validated here, since it arrives
/// per message; the configured location was already validated when the
/// endpoint was built.
///
/// With no location available at all, resolution succeeds with `None` only
/// for the `none` algorithm; any signing algorithm requires a key.
///
/// # Errors
///
/// Returns a [`KeyError`] if the location is missing, invalid, unreadable,
/// or its content is not valid base64.
pub fn resolve(endpoint: &Endpoint, message: &Message) -> Result<Option<Key>, KeyError> {
    let override_location = message
        .property(JWT_PRIVATE_KEY_LOCATION)
        .and_then(value_to_text);

    let location = match override_location
        .as_deref()
        .or_else(|| endpoint.private_key_location())
    {
        Some(location) => location,
        None if endpoint.algorithm() == Algorithm::None => return Ok(None),
        None => return Err(KeyError::MissingLocation),
    };

    debug!("Resolving key: location={location}");

    let path = validate_locator(location)?;
    let content = fs::read_to_string(&path).map_err(|source| KeyError::ResourceUnavailable {
        location: location.to_owned(),
        source,
    })?;

    let bytes = Base64::decode_vec(content.trim()).map_err(|_| KeyError::MalformedKey)?;

    Ok(Some(Key::from(bytes)))
}
