//! End-to-end pipeline tests: endpoint configuration through message
//! processing, with key material loaded from filesystem resources.

use std::collections::HashMap;
use std::io::Write as _;

use jwt_pipeline::{
    constants::JWT_PRIVATE_KEY_LOCATION, process, Endpoint, Error, KeyError, Message, VerifyError,
};
use serde_json::{json, Value};
use tempfile::NamedTempFile;

const CLAIMS: &str = r#"{"sub":"alice"}"#;

// base64 of two distinct HMAC secrets.
const KEY_B64: &str = "dGhlLXJpZ2h0LWhtYWMtc2VjcmV0LWJ5dGVz";
const WRONG_KEY_B64: &str = "YS1jb21wbGV0ZWx5LWRpZmZlcmVudC1zZWNyZXQ=";

fn endpoint(pairs: &[(&str, &str)]) -> Endpoint {
    let params: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    Endpoint::build(&params).expect("endpoint config should build")
}

fn key_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write key");
    file
}

fn file_url(file: &NamedTempFile) -> String {
    format!("file://{}", file.path().display())
}

fn claims_of(text: &str) -> Value {
    serde_json::from_str(text).expect("claims JSON")
}

#[test]
fn hs256_sign_then_decode_round_trips_claims() {
    let key = key_file(KEY_B64);
    let location = file_url(&key);

    let create = endpoint(&[
        ("algorithm", "HS256"),
        ("operation", "Create"),
        ("privateKeyLocation", &location),
    ]);
    let mut message = Message::from_body(CLAIMS);
    process(&create, &mut message).unwrap();

    let token = message.body().as_str().expect("token in body").to_owned();
    assert_eq!(token.split('.').count(), 3);

    let decode = endpoint(&[
        ("algorithm", "HS256"),
        ("operation", "Decode"),
        ("privateKeyLocation", &location),
    ]);
    let mut message = Message::from_body(token);
    process(&decode, &mut message).unwrap();

    let decoded = claims_of(message.body().as_str().expect("claims in body"));
    assert_eq!(decoded, claims_of(CLAIMS));
}

#[test]
fn hs256_decode_with_wrong_key_fails_with_signature_error() {
    let right = key_file(KEY_B64);
    let wrong = key_file(WRONG_KEY_B64);

    let create = endpoint(&[
        ("algorithm", "HS256"),
        ("operation", "Create"),
        ("privateKeyLocation", &file_url(&right)),
    ]);
    let mut message = Message::from_body(CLAIMS);
    process(&create, &mut message).unwrap();
    let token = message.body().clone();

    let decode = endpoint(&[
        ("algorithm", "HS256"),
        ("operation", "Decode"),
        ("privateKeyLocation", &file_url(&wrong)),
    ]);
    let mut message = Message::new();
    message.set_body(token);

    let err = process(&decode, &mut message).unwrap_err();
    assert!(matches!(
        err,
        Error::Verify(VerifyError::InvalidSignature)
    ));
}

#[test]
fn key_location_in_message_property_overrides_endpoint() {
    let key = key_file(KEY_B64);

    // No key location configured on the endpoint at all.
    let create = endpoint(&[("algorithm", "HS256"), ("operation", "Create")]);

    let mut message = Message::from_body(CLAIMS);
    message.set_property(JWT_PRIVATE_KEY_LOCATION, file_url(&key).into());
    process(&create, &mut message).unwrap();

    let token = message.body().as_str().expect("token in body").to_owned();

    // The token verifies against the same key, configured statically.
    let decode = endpoint(&[
        ("algorithm", "HS256"),
        ("operation", "Decode"),
        ("privateKeyLocation", &file_url(&key)),
    ]);
    let mut message = Message::from_body(token);
    process(&decode, &mut message).unwrap();
    assert_eq!(
        claims_of(message.body().as_str().unwrap()),
        claims_of(CLAIMS)
    );
}

#[test]
fn raw_key_in_message_property_is_rejected() {
    let create = endpoint(&[("algorithm", "HS256"), ("operation", "Create")]);

    let mut message = Message::from_body(CLAIMS);
    // The decoded key itself instead of a locator.
    message.set_property(JWT_PRIVATE_KEY_LOCATION, KEY_B64.into());

    let err = process(&create, &mut message).unwrap_err();
    assert!(matches!(err, Error::Key(KeyError::RawKeyMaterial)));

    // The message is left as received.
    assert_eq!(message.body().as_str(), Some(CLAIMS));
}

#[test]
fn raw_key_in_configuration_is_rejected() {
    let params: HashMap<String, String> = [
        ("algorithm", "HS256"),
        ("operation", "Create"),
        ("privateKeyLocation", KEY_B64),
    ]
    .iter()
    .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
    .collect();

    assert!(Endpoint::build(&params).is_err());
}

#[test]
fn none_sign_and_decode_from_named_slots() {
    let create = endpoint(&[
        ("algorithm", "none"),
        ("operation", "Create"),
        ("reallyWantNone", "true"),
        ("source", "%JwtClaims"),
        ("target", "JwtToken"),
    ]);

    let mut message = Message::new();
    message.set_property("JwtClaims", CLAIMS.into());
    process(&create, &mut message).unwrap();

    // Source property consumed, target header written, body untouched.
    assert_eq!(message.property("JwtClaims"), None);
    assert!(message.body().is_null());
    let token = message
        .header("JwtToken")
        .and_then(Value::as_str)
        .expect("token in header")
        .to_owned();
    assert!(token.ends_with('.'));

    let decode = endpoint(&[
        ("algorithm", "none"),
        ("operation", "Decode"),
        ("reallyWantNone", "true"),
        ("source", "JwtToken"),
        ("retainSource", "true"),
        ("outputType", "Map"),
    ]);
    process(&decode, &mut message).unwrap();

    // retainSource keeps the token header in place.
    assert_eq!(
        message.header("JwtToken").and_then(Value::as_str),
        Some(token.as_str())
    );
    assert_eq!(message.body(), &json!({"sub": "alice"}));
}

#[test]
fn decode_finds_token_inside_bearer_header() {
    let key = key_file(KEY_B64);
    let location = file_url(&key);

    let create = endpoint(&[
        ("algorithm", "HS256"),
        ("operation", "Create"),
        ("privateKeyLocation", &location),
    ]);
    let mut message = Message::from_body(CLAIMS);
    process(&create, &mut message).unwrap();
    let token = message.body().as_str().unwrap().to_owned();

    let decode = endpoint(&[
        ("algorithm", "HS256"),
        ("operation", "Decode"),
        ("privateKeyLocation", &location),
        ("source", "Authorization"),
        ("decodeFindToken", "true"),
    ]);
    let mut message = Message::new();
    message.set_header("Authorization", format!("Bearer {token}").into());
    process(&decode, &mut message).unwrap();

    assert_eq!(
        claims_of(message.body().as_str().unwrap()),
        claims_of(CLAIMS)
    );
    // Default cleanup removes the consumed header.
    assert_eq!(message.header("Authorization"), None);
}
