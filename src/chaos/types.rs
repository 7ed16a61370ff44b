//! Candidate keys, deletion requests and cycle outcomes

use std::fmt;

use k8s_openapi::api::core::v1::Pod;

/// Identifies one running pod eligible for termination
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateKey {
    pub namespace: String,
    pub name: String,
}

impl CandidateKey {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// Build the key for a pod, if its metadata carries both namespace and name
    pub fn from_pod(pod: &Pod) -> Option<Self> {
        let namespace = pod.metadata.namespace.as_deref()?;
        let name = pod.metadata.name.as_deref()?;
        Some(Self::new(namespace, name))
    }
}

/// Formats as `namespace/name`, the usual cache key notation
impl fmt::Display for CandidateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A single intended pod removal, built and dropped within one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRequest {
    pub key: CandidateKey,
    /// Ask the API server to validate the deletion without applying it
    pub simulate_only: bool,
}

/// What a successful cycle ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The mirror held no running pods
    NoCandidates,
    /// The chosen key left the mirror before it could be resolved
    VanishedFromMirror(CandidateKey),
    /// The API server no longer knew the pod when the delete arrived
    AlreadyDeleted(CandidateKey),
    /// The pod was deleted
    Deleted(CandidateKey),
    /// The deletion was accepted in dry-run mode, nothing changed
    Simulated(CandidateKey),
}

impl CycleOutcome {
    /// The pod this cycle targeted, if it got as far as choosing one
    pub fn target(&self) -> Option<&CandidateKey> {
        match self {
            CycleOutcome::NoCandidates => None,
            CycleOutcome::VanishedFromMirror(key)
            | CycleOutcome::AlreadyDeleted(key)
            | CycleOutcome::Deleted(key)
            | CycleOutcome::Simulated(key) => Some(key),
        }
    }
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::NoCandidates => write!(f, "no-candidates"),
            CycleOutcome::VanishedFromMirror(_) => write!(f, "vanished-from-mirror"),
            CycleOutcome::AlreadyDeleted(_) => write!(f, "already-deleted"),
            CycleOutcome::Deleted(_) => write!(f, "deleted"),
            CycleOutcome::Simulated(_) => write!(f, "simulated"),
        }
    }
}
