//! Server-side components of the `rangebuzz` HTTP service.
//!
//! ## Submodules
//!
//! - [`config`] - CLI/environment configuration.
//! - [`error`] - HTTP error mapping for validation and shutdown failures.
//! - [`service`] - the service object, its routes and shutdown sequence.
//! - [`telemetry`] - logging subscriber and optional OpenTelemetry export.

pub mod config;
pub mod error;
pub mod service;
pub mod telemetry;
