//! Client for the RikiTraki tracking service: token handling plus vehicle
//! and track operations

pub mod auth;
pub mod client;
mod tracks;
mod vehicles;

pub use auth::{authorization_header, TokenManager, AUTH_SCHEME};
pub use client::TrackerClient;
pub use rikitraki_shared::{
    codec, Credentials, Result, TrackerConfig, TrackerError, Vehicle, VehicleQuery, VehicleRecord,
};
