//! HTTP service implementation and shutdown coordination.
//!
//! ## Structure
//!
//! - [`handler`] - the [`handler::RangeService`] object, its axum routes and
//!   its scoped shutdown sequence.

pub mod handler;
