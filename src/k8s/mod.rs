//! Kubernetes integration for podchaosmonkey
//!
//! This module holds everything that talks to the cluster:
//! - Connecting to the API server
//! - Mirroring running pods through a list+watch reflector
//! - Deleting pods, optionally in dry-run mode

mod client;
mod mirror;

#[cfg(test)]
pub use client::MockPodDeleter;
pub use client::{connect, health_check, KubePodDeleter, PodDeleter};
pub use mirror::{spawn_pod_mirror, CandidateMirror, PodMirror};
