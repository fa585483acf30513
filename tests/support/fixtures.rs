//! Catalog and token fixtures served by wiremock.

use dataspace_core::{ClientConfig, Credentials, Endpoints};
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "analyst@example.com";
pub const PASSWORD: &str = "hunter2";
pub const TOKEN: &str = "eyJhbGciOiJSUzI1NiJ9.test";

/// Client configuration with every endpoint pointed at `server`.
pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(Credentials::new(USERNAME, PASSWORD))
        .with_endpoints(Endpoints::with_base(&server.uri()))
}

/// Mounts a password-grant endpoint answering with [`TOKEN`].
pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "expires_in": 600,
            "token_type": "Bearer",
        })))
        .mount(server)
        .await;
}

/// Mounts a catalog endpoint answering every query with `body`.
pub async fn mount_catalog(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/odata/v1/Products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts a product archive endpoint for `id`.
pub async fn mount_archive(server: &MockServer, id: &str, status: u16, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/odata/v1/Products({id})/$value")))
        .respond_with(ResponseTemplate::new(status).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// One catalog product with `(Name, Value)` attributes.
pub fn product(id: &str, name: &str, attributes: &[(&str, Value)]) -> Value {
    let attributes: Vec<Value> = attributes
        .iter()
        .map(|(name, value)| {
            json!({
                "@odata.type": "#OData.CSC.StringAttribute",
                "Name": name,
                "Value": value,
            })
        })
        .collect();
    json!({
        "@odata.mediaContentType": "application/octet-stream",
        "Id": id,
        "Name": name,
        "ContentType": "application/octet-stream",
        "ContentLength": 1_024_000,
        "Online": true,
        "Footprint": null,
        "ContentDate": {
            "Start": "2023-01-03T05:42:17.000Z",
            "End": "2023-01-03T05:42:42.000Z",
        },
        "Attributes": attributes,
    })
}

/// A catalog response body wrapping `products`.
pub fn catalog_body(products: Vec<Value>) -> Value {
    json!({
        "@odata.context": "$metadata#Products(Attributes())",
        "value": products,
    })
}
