//! Well-known names used within the jwt-pipeline crate.

/// Name of the message property that overrides the configured key location
/// for a single message.
///
/// The value must be a resource locator, exactly like the
/// `privateKeyLocation` endpoint option. Raw key material placed here is
/// rejected during key resolution.
pub const JWT_PRIVATE_KEY_LOCATION: &str = "JwtPrivateKeyLocation";

/// Leading marker distinguishing a property location from a header location
/// in configuration strings, e.g. `%JwtClaims`.
pub const PROPERTY_MARKER: char = '%';
