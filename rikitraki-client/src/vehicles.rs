//! Vehicle operations

use crate::client::{Auth, TrackerClient};
use reqwest::{Method, StatusCode};
use rikitraki_shared::{
    codec, CreatedVehicle, NewVehicle, Result, Vehicle, VehicleCount, VehicleList, VehicleQuery,
    VehicleRecord,
};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

impl TrackerClient {
    /// Number of vehicles the backend holds. No token needed.
    pub async fn get_vehicle_count(&self) -> Result<u64> {
        let url = self.url(&["api", "v1", "vehicles", "number"])?;
        let request = self.request(Method::GET, &url, Auth::None).await?;
        let response = self.dispatch(Method::GET, &url, request).await?;

        let count: VehicleCount = serde_json::from_str(&response.text().await?)?;
        Ok(count.number_of_vehicles)
    }

    /// Vehicles matching `query`, keyed by id. The backend returns the whole
    /// filtered set in one response.
    pub async fn list_vehicles(&self, query: &VehicleQuery) -> Result<BTreeMap<String, VehicleRecord>> {
        let url = self.url(&["api", "v1", "vehicles"])?;
        let request = self
            .request(Method::GET, &url, Auth::Required)
            .await?
            .query(query);
        let response = self.dispatch(Method::GET, &url, request).await?;

        if response.status() == StatusCode::NO_CONTENT {
            debug!("No vehicles matched {:?}", query);
            return Ok(BTreeMap::new());
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let list: VehicleList = serde_json::from_str(&text)?;
        Ok(list.into_records())
    }

    /// A single vehicle, with its payload when `include_blob` is set.
    /// Sends the active token if there is one.
    pub async fn get_vehicle(&self, id: &str, include_blob: bool) -> Result<VehicleRecord> {
        let url = self.url(&["api", "v1", "vehicles", id])?;
        let mut request = self.request(Method::GET, &url, Auth::IfAvailable).await?;
        if include_blob {
            request = request.query(&[("blob", "true")]);
        }
        let response = self.dispatch(Method::GET, &url, request).await?;

        let mut record: VehicleRecord = serde_json::from_str(&response.text().await?)?;
        if record.id.is_none() {
            record.id = Some(id.to_string());
        }
        Ok(record)
    }

    /// Upload a new vehicle. The payload travels base64-encoded in the JSON
    /// body; the returned vehicle carries the id the backend assigned.
    pub async fn create_vehicle(
        &self,
        name: &str,
        description: &str,
        owner: &str,
        blob: &[u8],
        blob_type: &str,
    ) -> Result<Vehicle> {
        let url = self.url(&["api", "v1", "vehicles"])?;
        let request = self.request(Method::POST, &url, Auth::Required).await?;

        debug!(
            "Creating vehicle '{}' ({} bytes, sha1 {})",
            name,
            blob.len(),
            codec::digest(blob)
        );

        let envelope = NewVehicle {
            name,
            description,
            owner,
            blob: codec::encode(blob),
            blob_type,
        };
        let response = self
            .dispatch(Method::POST, &url, request.json(&envelope))
            .await?;

        let created: CreatedVehicle = serde_json::from_str(&response.text().await?)?;
        info!("Created vehicle '{}' with id {}", name, created.id);

        Ok(Vehicle {
            id: created.id,
            name: created.name.unwrap_or_else(|| name.to_string()),
            description: description.to_string(),
            owner: owner.to_string(),
            blob_type: blob_type.to_string(),
            blob: blob.to_vec(),
        })
    }

    /// [`TrackerClient::create_vehicle`] with the payload read from a file
    pub async fn create_vehicle_from_file(
        &self,
        name: &str,
        description: &str,
        owner: &str,
        path: impl AsRef<Path>,
        blob_type: &str,
    ) -> Result<Vehicle> {
        let blob = tokio::fs::read(path.as_ref()).await?;
        self.create_vehicle(name, description, owner, &blob, blob_type)
            .await
    }

    /// Delete a vehicle by id; returns the backend's response text
    pub async fn delete_vehicle(&self, id: &str) -> Result<String> {
        let url = self.url(&["api", "v1", "vehicles", id])?;
        let request = self.request(Method::DELETE, &url, Auth::Required).await?;
        let response = self.dispatch(Method::DELETE, &url, request).await?;

        info!("Deleted vehicle {}", id);
        Ok(response.text().await?)
    }
}
