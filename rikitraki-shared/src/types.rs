//! Wire and domain types for the RikiTraki API

use crate::{codec, Result, TrackerError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Filters for a vehicle listing. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VehicleQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "vehicleId", skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,

    /// Ask the backend to embed each vehicle's payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob: Option<bool>,
}

impl VehicleQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn vehicle_id(mut self, id: impl Into<String>) -> Self {
        self.vehicle_id = Some(id.into());
        self
    }

    pub fn with_blob(mut self, include: bool) -> Self {
        self.blob = Some(include);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A vehicle as the backend reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    #[serde(rename = "vehicleId", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "vehicleName", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "vehicleDescription", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "vehicleOwner", default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(rename = "vehicleBlobType", default, skip_serializing_if = "Option::is_none")]
    pub blob_type: Option<String>,

    #[serde(rename = "vehicleType", default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,

    #[serde(rename = "createdDate", default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,

    /// Present only when the payload was requested
    #[serde(rename = "vehicleBlob", default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<Value>,

    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VehicleRecord {
    /// Decoded payload, if the record carries one.
    ///
    /// Accepts plain base64 text as well as the two shapes a Node/Mongo
    /// backend may serialize binary data into: `{"type": "Buffer",
    /// "data": [..]}` and `{"$binary": ..}`.
    pub fn blob_bytes(&self) -> Result<Option<Vec<u8>>> {
        let Some(blob) = &self.blob else {
            return Ok(None);
        };

        match blob {
            Value::Null => Ok(None),
            Value::String(text) => Ok(Some(codec::decode(text)?)),
            Value::Object(obj) if obj.get("type").and_then(Value::as_str) == Some("Buffer") => {
                let data = obj
                    .get("data")
                    .and_then(Value::as_array)
                    .ok_or_else(|| unexpected_blob("Buffer without data"))?;
                data.iter()
                    .map(|b| {
                        b.as_u64()
                            .and_then(|n| u8::try_from(n).ok())
                            .ok_or_else(|| unexpected_blob("Buffer data is not bytes"))
                    })
                    .collect::<Result<Vec<u8>>>()
                    .map(Some)
            }
            Value::Object(obj) => match obj.get("$binary") {
                Some(Value::String(text)) => Ok(Some(codec::decode(text)?)),
                Some(Value::Object(inner)) => match inner.get("base64").and_then(Value::as_str) {
                    Some(text) => Ok(Some(codec::decode(text)?)),
                    None => Err(unexpected_blob("$binary without base64")),
                },
                _ => Err(unexpected_blob("unknown object shape")),
            },
            _ => Err(unexpected_blob("not a string or object")),
        }
    }
}

fn unexpected_blob(detail: &str) -> TrackerError {
    TrackerError::Config(format!("Unexpected vehicleBlob encoding: {detail}"))
}

/// Body of `GET /api/v1/vehicles`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleList {
    #[serde(default)]
    pub vehicles: BTreeMap<String, VehicleRecord>,
}

impl VehicleList {
    /// Records keyed by id, with `id` filled in from the key where the
    /// backend left it out of the record.
    pub fn into_records(self) -> BTreeMap<String, VehicleRecord> {
        self.vehicles
            .into_iter()
            .map(|(key, mut record)| {
                if record.id.is_none() {
                    record.id = Some(key.clone());
                }
                (key, record)
            })
            .collect()
    }
}

/// Body of `GET /api/v1/vehicles/number`
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleCount {
    #[serde(rename = "numberOfVehicles")]
    pub number_of_vehicles: u64,
}

/// JSON envelope for `POST /api/v1/vehicles`
#[derive(Debug, Clone, Serialize)]
pub struct NewVehicle<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub owner: &'a str,
    /// Base64 payload
    pub blob: String,
    #[serde(rename = "blobtype")]
    pub blob_type: &'a str,
}

/// Body returned by a successful create
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedVehicle {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A vehicle with its payload decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner: String,
    pub blob_type: String,
    pub blob: Vec<u8>,
}

impl Vehicle {
    pub fn digest(&self) -> String {
        codec::digest(&self.blob)
    }
}

/// Error body the backend sends with non-success responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    /// Text, or a list of validator errors
    #[serde(default)]
    pub description: Option<Value>,
}

impl ErrorBody {
    pub fn description_text(&self) -> Option<String> {
        match &self.description {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}
