//! Stub RikiTraki backend for integration tests
//!
//! Simulates the token, profile, vehicle and track routes with wiremock:
//! - HTTP Basic login on `/api/v1/token/` issuing fixed tokens
//! - `JWT <token>` bearer checks on the protected vehicle routes
//! - a fixed vehicle collection so count and listing agree

#![allow(dead_code)]

use base64::{engine::general_purpose, Engine as _};
use rikitraki_client::{Credentials, TrackerClient};
use rikitraki_shared::{ConnectionConfig, TimeoutConfig};
use serde_json::{json, Map, Value};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const TEST_USER: &str = "testuser";
pub const TEST_PASSWORD: &str = "testpass";
pub const TEST_TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.test.token";

pub const OTHER_USER: &str = "otheruser";
pub const OTHER_PASSWORD: &str = "otherpass";
pub const OTHER_TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.other.token";

/// A vehicle held by the stub
#[derive(Clone, Debug)]
pub struct StubVehicle {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub blob_type: String,
    pub blob: Vec<u8>,
}

impl StubVehicle {
    pub fn new(id: &str, name: &str, blob: &[u8]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            owner: TEST_USER.to_string(),
            blob_type: "glb".to_string(),
            blob: blob.to_vec(),
        }
    }

    fn record(&self, include_blob: bool) -> Value {
        let mut record = json!({
            "vehicleName": self.name,
            "vehicleDescription": format!("{} description", self.name),
            "vehicleOwner": self.owner,
            "vehicleBlobType": self.blob_type,
            "createdDate": "2024-01-15T10:30:00.000Z"
        });
        if include_blob {
            record["vehicleBlob"] = json!(general_purpose::STANDARD.encode(&self.blob));
        }
        record
    }
}

pub struct MockTrackerServer {
    pub server: MockServer,
    pub base_url: String,
}

pub fn basic_auth(user: &str, password: &str) -> String {
    format!(
        "Basic {}",
        general_purpose::STANDARD.encode(format!("{user}:{password}"))
    )
}

pub fn jwt_auth(token: &str) -> String {
    format!("JWT {token}")
}

impl MockTrackerServer {
    /// Stub with login and profile routes mounted
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();

        let stub = Self { server, base_url };
        stub.setup_auth_endpoints().await;
        stub
    }

    /// Stub holding `vehicles`, with count and listing routes mounted
    pub async fn with_vehicles(vehicles: &[StubVehicle]) -> Self {
        let stub = Self::new().await;
        stub.setup_vehicle_endpoints(vehicles).await;
        stub
    }

    /// Client for this stub with the test user's credentials
    pub fn client(&self) -> TrackerClient {
        self.client_with(Credentials::new(TEST_USER, TEST_PASSWORD))
    }

    pub fn client_with(&self, credentials: Credentials) -> TrackerClient {
        TrackerClient::with_connection(
            &ConnectionConfig::from_url(&self.base_url).unwrap(),
            &TimeoutConfig::default(),
            credentials,
        )
        .unwrap()
    }

    async fn setup_auth_endpoints(&self) {
        for (user, password, token) in [
            (TEST_USER, TEST_PASSWORD, TEST_TOKEN),
            (OTHER_USER, OTHER_PASSWORD, OTHER_TOKEN),
        ] {
            Mock::given(method("GET"))
                .and(path("/api/v1/token/"))
                .and(header("authorization", basic_auth(user, password).as_str()))
                .respond_with(ResponseTemplate::new(200).set_body_string(token))
                .with_priority(1)
                .mount(&self.server)
                .await;

            Mock::given(method("GET"))
                .and(path("/api/v1/users/me"))
                .and(header("authorization", jwt_auth(token).as_str()))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "username": user,
                    "email": format!("{user}@example.com")
                })))
                .with_priority(1)
                .mount(&self.server)
                .await;
        }

        // Anything else on the token route is a bad login
        Mock::given(method("GET"))
            .and(path("/api/v1/token/"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .with_priority(10)
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/users/me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .with_priority(10)
            .mount(&self.server)
            .await;
    }

    async fn setup_vehicle_endpoints(&self, vehicles: &[StubVehicle]) {
        Mock::given(method("GET"))
            .and(path("/api/v1/vehicles/number"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "numberOfVehicles": vehicles.len()
            })))
            .mount(&self.server)
            .await;

        let listing = if vehicles.is_empty() {
            ResponseTemplate::new(204)
        } else {
            let records: Map<String, Value> = vehicles
                .iter()
                .map(|v| (v.id.clone(), v.record(false)))
                .collect();
            ResponseTemplate::new(200).set_body_json(json!({ "vehicles": records }))
        };

        Mock::given(method("GET"))
            .and(path("/api/v1/vehicles"))
            .and(header("authorization", jwt_auth(TEST_TOKEN).as_str()))
            .respond_with(listing)
            .with_priority(1)
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/vehicles"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .with_priority(10)
            .mount(&self.server)
            .await;

        for vehicle in vehicles {
            let mut with_blob = vehicle.record(true);
            with_blob["vehicleId"] = json!(vehicle.id);

            Mock::given(method("GET"))
                .and(path(format!("/api/v1/vehicles/{}", vehicle.id)))
                .and(wiremock::matchers::query_param("blob", "true"))
                .respond_with(ResponseTemplate::new(200).set_body_json(with_blob))
                .with_priority(1)
                .mount(&self.server)
                .await;

            Mock::given(method("GET"))
                .and(path(format!("/api/v1/vehicles/{}", vehicle.id)))
                .respond_with(ResponseTemplate::new(200).set_body_json(vehicle.record(false)))
                .with_priority(2)
                .mount(&self.server)
                .await;
        }
    }

    /// Bodies of every request the stub received on `route`
    pub async fn bodies_for(&self, route: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == route)
            .filter_map(|r| serde_json::from_slice(&r.body).ok())
            .collect()
    }

    /// `Authorization` headers the stub saw on `route`, in order
    pub async fn auth_headers_for(&self, route: &str) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == route)
            .filter_map(|r| {
                r.headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(|s| s.to_string())
            })
            .collect()
    }
}
