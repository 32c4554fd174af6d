//! Crowd analytics and capacity planning engine.
//!
//! Re-exports the engine crate together with the shared sample and
//! resource contracts and the telemetry bootstrap.

pub use common;
pub use crowd_analytics::*;
pub use telemetry;
