//! podchaosmonkey library
//!
//! Periodically deletes one random running pod of a namespace, using a
//! watch-fed local mirror to find candidates.

pub mod chaos;
pub mod config;
pub mod error;
pub mod k8s;
pub mod shutdown;
pub mod telemetry;
