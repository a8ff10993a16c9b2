// Bearer tokens signed with the test secret

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use crudkit::config::JwtConfig;
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;

pub const TEST_ISSUER: &str = "crudkit-tests";
pub const TEST_AUDIENCE: &str = "crudkit-api";
pub const TEST_SECRET: &str = "test-secret-key-with-at-least-32-bytes!";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        issuer: TEST_ISSUER.to_string(),
        audience: TEST_AUDIENCE.to_string(),
        secret_key: TEST_SECRET.to_string(),
    }
}

/// Sign arbitrary claims with HS256
pub fn sign_token(claims: &Value, secret: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    let signing_input = format!("{}.{}", header, payload);

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    format!("{}.{}", signing_input, signature)
}

/// Token accepted by the test app for the next hour
pub fn valid_token() -> String {
    let now = chrono::Utc::now().timestamp();
    sign_token(
        &json!({
            "sub": "test-user",
            "iss": TEST_ISSUER,
            "aud": TEST_AUDIENCE,
            "iat": now,
            "nbf": now,
            "exp": now + 3600,
        }),
        TEST_SECRET,
    )
}

pub fn expired_token() -> String {
    let now = chrono::Utc::now().timestamp();
    sign_token(
        &json!({"iss": TEST_ISSUER, "aud": TEST_AUDIENCE, "exp": now - 7200}),
        TEST_SECRET,
    )
}

pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", valid_token()))
}
