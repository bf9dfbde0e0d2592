// tests/common/mod.rs
pub use serde_json::json;

use httpmock::Method::POST;
use httpmock::{Mock, MockServer};
use reqwest::Client;

use crate::auth::token_provider::TokenProvider;
use crate::cache::credential::Credential;
use crate::cache::credential_cache::CredentialCache;
use crate::config::service::{OAuth2Config, ScopeValue};
use crate::helpers::time::now_i64;
use crate::sensor::generator::SensorReading;
use crate::submission::coordinator::SubmissionCoordinator;

pub const TOKEN_PATH: &str = "/oauth/token";
pub const DATA_PATH: &str = "/v1/data/iot-data/";

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .build()
        .expect("reqwest client")
}

pub fn oauth2_config(auth_url: &str) -> OAuth2Config {
    OAuth2Config {
        auth_url: Some(auth_url.to_owned()),
        client_id: Some("abc123".to_owned()),
        client_secret: Some("ssh-secret".to_owned()),
        request_scope: Some(ScopeValue::One("api.write".to_owned())),
    }
}

pub fn provider(auth_server: &MockServer, cache: &CredentialCache) -> TokenProvider {
    TokenProvider::init(&oauth2_config(&auth_server.base_url()), cache.clone(), build_reqwest_client())
        .expect("valid oauth2 config")
}

pub fn coordinator(api_server: &MockServer) -> SubmissionCoordinator {
    SubmissionCoordinator::new(&api_server.base_url(), build_reqwest_client())
}

/// The fixed reading used across scenarios.
pub fn reading() -> SensorReading {
    SensorReading {
        device_id: "iot-device-12".to_owned(),
        timestamp: "2024-01-01T00:00:00.000Z".to_owned(),
        data1: 23.1,
        data2: 24.9,
        data3: 26.0,
    }
}

pub fn reading_json() -> serde_json::Value {
    json!({
        "deviceId": "iot-device-12",
        "timestamp": "2024-01-01T00:00:00.000Z",
        "data1": 23.1,
        "data2": 24.9,
        "data3": 26.0
    })
}

/// Cache entry expiring `ttl` seconds from now.
pub async fn seed_cache(cache: &CredentialCache, token: &str, ttl: i64) {
    cache.set(Credential::new(token.to_owned(), now_i64() + ttl)).await;
}

pub fn token_mock<'a>(server: &'a MockServer, token: &str, expires_in: i64) -> Mock<'a> {
    let body = json!({"access_token": token, "expires_in": expires_in, "token_type": "Bearer"});
    server.mock(|when, then| {
        when.method(POST).path(TOKEN_PATH);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(body);
    })
}

pub fn data_mock<'a>(server: &'a MockServer, token: &str, status: u16, body: serde_json::Value) -> Mock<'a> {
    let bearer = format!("Bearer {}", token);
    server.mock(|when, then| {
        when.method(POST)
            .path(DATA_PATH)
            .header("authorization", bearer)
            .json_body(reading_json());
        then.status(status)
            .header("Content-Type", "application/json")
            .json_body(body);
    })
}

pub fn created_record() -> serde_json::Value {
    json!({
        "id": 7,
        "deviceId": "iot-device-12",
        "timestamp": "2024-01-01T00:00:00.000Z",
        "data1": 23.1,
        "data2": 24.9,
        "data3": 26.0,
        "createdAt": "2024-01-01T00:00:01.000Z",
        "updatedAt": "2024-01-01T00:00:01.000Z"
    })
}
