//! Shared types and utilities for the RikiTraki tracking-service client

pub mod codec;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod token_inspector;
pub mod types;

pub use config::{ConnectionConfig, LoggingConfig, Scheme, TimeoutConfig, TrackerConfig};
pub use credentials::Credentials;
pub use error::{Result, TrackerError};
pub use token_inspector::{describe_token, TokenClaims, TokenInspector};
pub use types::*;
