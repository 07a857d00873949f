//! Endpoint configuration.
//!
//! An [`Endpoint`] is built once from the string options the host routing
//! engine collected for a route, validated eagerly, and then shared
//! read-only across every message the route processes. All option
//! cross-checks happen here, before any message I/O: in particular the
//! `none` algorithm opt-in and the key-location restrictions.

use std::collections::HashMap;

use thiserror::Error;

use crate::algorithm::Algorithm;
use crate::key::{self, KeyError};
use crate::location::{Location, LocationError};

/// The pipeline branch an endpoint executes.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Operation {
    /// Sign claims and encode a JWT.
    Create,
    /// Verify and decode a JWT into claims.
    Decode,
}

impl Operation {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "Create" => Self::Create,
            "Decode" => Self::Decode,
            _ => return None,
        })
    }
}

/// Representation of decoded claims written to the target slot.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum OutputType {
    /// A JSON string.
    #[default]
    Json,
    /// A structured JSON object (map).
    Map,
}

impl OutputType {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "Json" => Self::Json,
            "Map" => Self::Map,
            _ => return None,
        })
    }
}

/// Errors that can arise building an [`Endpoint`] from configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required option is absent.
    #[error("missing required option: {0}")]
    MissingOption(&'static str),

    /// An option name is not recognized.
    #[error("unknown option: {0}")]
    UnknownOption(String),

    /// The `algorithm` option is not a supported algorithm.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// The `operation` option is not a supported operation.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// The `outputType` option is not a supported output type.
    #[error("unknown output type: {0}")]
    UnknownOutputType(String),

    /// A boolean option holds something other than `true`/`false`.
    #[error("option {option} expects true or false, got {value:?}")]
    InvalidFlag {
        /// The option name.
        option: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Algorithm `none` selected without `reallyWantNone=true`.
    #[error("algorithm 'none' is not allowed, set reallyWantNone=true to allow it")]
    NoneNotEnabled,

    /// `retainSource=true` without an explicit `source` — the body is
    /// always retained, so there is nothing the flag could apply to.
    #[error("retainSource requires an explicit source location")]
    RetainSourceWithoutSource,

    /// `decodeFindToken=true` on a Create endpoint — there is no token to
    /// search for when signing.
    #[error("decodeFindToken is only valid for the Decode operation")]
    FindTokenOnCreate,

    /// A `source`/`target` location string is invalid.
    #[error("invalid location")]
    Location(#[from] LocationError),

    /// The `privateKeyLocation` option is not an acceptable locator.
    #[error("invalid key location")]
    KeyLocation(#[from] KeyError),
}

/// Immutable per-route configuration.
///
/// Built once via [`Endpoint::build`] and shared read-only afterwards; safe
/// to use from concurrent message pipelines.
#[derive(Debug, Clone)]
pub struct Endpoint {
    algorithm: Algorithm,
    operation: Operation,
    really_want_none: bool,
    private_key_location: Option<String>,
    source: Option<Location>,
    target: Option<Location>,
    retain_source: bool,
    decode_find_token: bool,
    output_type: OutputType,
}

impl Endpoint {
    /// Builds an endpoint from string options.
    ///
    /// Recognized options (see the crate docs for semantics): `algorithm`,
    /// `operation`, `reallyWantNone`, `privateKeyLocation`, `source`,
    /// `target`, `retainSource`, `decodeFindToken`, `outputType`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unknown or malformed options and for
    /// inconsistent combinations. All failures happen here, before any
    /// message is processed.
    pub fn build(params: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut algorithm = None;
        let mut operation = None;
        let mut really_want_none = false;
        let mut private_key_location = None;
        let mut source = None;
        let mut target = None;
        let mut retain_source = false;
        let mut decode_find_token = false;
        let mut output_type = OutputType::default();

        for (option, value) in params {
            match option.as_str() {
                "algorithm" => {
                    algorithm = Some(
                        Algorithm::parse(value)
                            .ok_or_else(|| ConfigError::UnknownAlgorithm(value.clone()))?,
                    );
                }
                "operation" => {
                    operation = Some(
                        Operation::parse(value)
                            .ok_or_else(|| ConfigError::UnknownOperation(value.clone()))?,
                    );
                }
                "reallyWantNone" => really_want_none = parse_flag("reallyWantNone", value)?,
                "privateKeyLocation" => {
                    // Network locations and raw key material are rejected
                    // here, at configuration time.
                    key::validate_locator(value)?;
                    private_key_location = Some(value.clone());
                }
                "source" => source = Some(Location::parse(value)?),
                "target" => target = Some(Location::parse(value)?),
                "retainSource" => retain_source = parse_flag("retainSource", value)?,
                "decodeFindToken" => decode_find_token = parse_flag("decodeFindToken", value)?,
                "outputType" => {
                    output_type = OutputType::parse(value)
                        .ok_or_else(|| ConfigError::UnknownOutputType(value.clone()))?;
                }
                _ => return Err(ConfigError::UnknownOption(option.clone())),
            }
        }

        let algorithm = algorithm.ok_or(ConfigError::MissingOption("algorithm"))?;
        let operation = operation.ok_or(ConfigError::MissingOption("operation"))?;

        if algorithm == Algorithm::None && !really_want_none {
            return Err(ConfigError::NoneNotEnabled);
        }
        if retain_source && source.is_none() {
            return Err(ConfigError::RetainSourceWithoutSource);
        }
        if decode_find_token && operation == Operation::Create {
            return Err(ConfigError::FindTokenOnCreate);
        }

        Ok(Self {
            algorithm,
            operation,
            really_want_none,
            private_key_location,
            source,
            target,
            retain_source,
            decode_find_token,
            output_type,
        })
    }

    /// Returns the configured algorithm.
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the configured operation.
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns whether the `none` algorithm has been explicitly enabled.
    pub const fn really_want_none(&self) -> bool {
        self.really_want_none
    }

    /// Returns the configured key location, if any.
    pub fn private_key_location(&self) -> Option<&str> {
        self.private_key_location.as_deref()
    }

    /// Returns the configured input location; `None` means the body.
    pub const fn source(&self) -> Option<&Location> {
        self.source.as_ref()
    }

    /// Returns the configured output location; `None` means the body.
    pub const fn target(&self) -> Option<&Location> {
        self.target.as_ref()
    }

    /// Returns whether the source slot is kept after success.
    pub const fn retain_source(&self) -> bool {
        self.retain_source
    }

    /// Returns whether Decode searches the source text for a single token.
    pub const fn decode_find_token(&self) -> bool {
        self.decode_find_token
    }

    /// Returns the decoded-claims output representation.
    pub const fn output_type(&self) -> OutputType {
        self.output_type
    }
}

fn parse_flag(option: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            option,
            value: value.to_owned(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn build_minimal_hs256_endpoint() {
        let endpoint =
            Endpoint::build(&params(&[("algorithm", "HS256"), ("operation", "Create")])).unwrap();

        assert_eq!(endpoint.algorithm(), Algorithm::HS256);
        assert_eq!(endpoint.operation(), Operation::Create);
        assert_eq!(endpoint.source(), None);
        assert_eq!(endpoint.target(), None);
        assert!(!endpoint.retain_source());
        assert_eq!(endpoint.output_type(), OutputType::Json);
    }

    #[test]
    fn build_requires_algorithm_and_operation() {
        let err = Endpoint::build(&params(&[("operation", "Create")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingOption("algorithm")));

        let err = Endpoint::build(&params(&[("algorithm", "HS256")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingOption("operation")));
    }

    #[test]
    fn none_requires_opt_in() {
        let err =
            Endpoint::build(&params(&[("algorithm", "none"), ("operation", "Create")])).unwrap_err();
        assert!(matches!(err, ConfigError::NoneNotEnabled));

        let endpoint = Endpoint::build(&params(&[
            ("algorithm", "none"),
            ("operation", "Create"),
            ("reallyWantNone", "true"),
        ]))
        .unwrap();
        assert_eq!(endpoint.algorithm(), Algorithm::None);
    }

    #[test]
    fn rejects_unknown_values() {
        let err =
            Endpoint::build(&params(&[("algorithm", "RS256"), ("operation", "Create")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownAlgorithm(_)));

        let err =
            Endpoint::build(&params(&[("algorithm", "HS256"), ("operation", "Sign")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOperation(_)));

        let err = Endpoint::build(&params(&[
            ("algorithm", "HS256"),
            ("operation", "Decode"),
            ("outputType", "Xml"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOutputType(_)));

        let err = Endpoint::build(&params(&[
            ("algorithm", "HS256"),
            ("operation", "Create"),
            ("frobnicate", "yes"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOption(_)));
    }

    #[test]
    fn rejects_malformed_flags() {
        let err = Endpoint::build(&params(&[
            ("algorithm", "HS256"),
            ("operation", "Create"),
            ("retainSource", "yes"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidFlag {
                option: "retainSource",
                ..
            }
        ));
    }

    #[test]
    fn retain_source_requires_explicit_source() {
        let err = Endpoint::build(&params(&[
            ("algorithm", "HS256"),
            ("operation", "Create"),
            ("retainSource", "true"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::RetainSourceWithoutSource));
    }

    #[test]
    fn find_token_requires_decode() {
        let err = Endpoint::build(&params(&[
            ("algorithm", "HS256"),
            ("operation", "Create"),
            ("decodeFindToken", "true"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::FindTokenOnCreate));
    }

    #[test]
    fn key_location_is_validated_at_build_time() {
        let err = Endpoint::build(&params(&[
            ("algorithm", "HS256"),
            ("operation", "Create"),
            ("privateKeyLocation", "https://example.org/key"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::KeyLocation(KeyError::RemoteLocation(_))
        ));

        // Raw key material instead of a locator.
        let err = Endpoint::build(&params(&[
            ("algorithm", "HS256"),
            ("operation", "Create"),
            ("privateKeyLocation", "c2VjcmV0LWtleQ=="),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::KeyLocation(KeyError::RawKeyMaterial)
        ));
    }

    #[test]
    fn source_and_target_locations_parse() {
        let endpoint = Endpoint::build(&params(&[
            ("algorithm", "HS256"),
            ("operation", "Decode"),
            ("source", "Authorization"),
            ("target", "%DecodedClaims"),
        ]))
        .unwrap();

        assert_eq!(
            endpoint.source(),
            Some(&Location::Header("Authorization".to_owned()))
        );
        assert_eq!(
            endpoint.target(),
            Some(&Location::Property("DecodedClaims".to_owned()))
        );
    }
}
