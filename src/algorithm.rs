//! Signing algorithms supported by the pipeline.

use std::fmt;

/// Algorithms accepted for signing and verifying tokens.
///
/// This is deliberately a small subset of the registered JWS algorithms:
/// symmetric HMAC-SHA256 and the unsecured `none` mode. Asymmetric
/// algorithms are out of scope for this component.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Algorithm {
    /// No signature. For testing purposes only; must be explicitly enabled
    /// with the `reallyWantNone` endpoint option.
    None,
    /// HMAC using SHA-256.
    HS256,
}

impl Algorithm {
    /// Parses a wire/config identifier (`"none"` or `"HS256"`).
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "none" => Self::None,
            "HS256" => Self::HS256,
            _ => return None,
        })
    }

    /// Returns the identifier used in the JWT `alg` header.
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::HS256 => "HS256",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}
