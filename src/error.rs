//! Error types for podchaosmonkey

use thiserror::Error;

use crate::chaos::CandidateKey;

/// Errors surfaced by a chaos cycle or by startup
#[derive(Debug, Error)]
pub enum ChaosError {
    /// The local mirror could not answer a lookup
    #[error("fetching pod {key} from the mirror failed: {message}")]
    Mirror { key: CandidateKey, message: String },

    /// The mirror handed back something that is not the pod we asked for
    #[error("cached object for {key} is not a usable pod: {reason}")]
    ShapeMismatch { key: CandidateKey, reason: String },

    /// The API server rejected the deletion for a reason other than not-found
    #[error("deleting pod {key} failed: {source}")]
    Delete {
        key: CandidateKey,
        #[source]
        source: kube::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("kubernetes client error: {0}")]
    Kube(#[from] kube::Error),

    #[error("failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("failed to infer cluster configuration: {0}")]
    InferConfig(#[from] kube::config::InferConfigError),
}

impl ChaosError {
    pub fn config(message: &str) -> Self {
        ChaosError::Config(message.to_string())
    }

    pub fn shape_mismatch(key: &CandidateKey, reason: &str) -> Self {
        ChaosError::ShapeMismatch {
            key: key.clone(),
            reason: reason.to_string(),
        }
    }
}

pub type ChaosResult<T> = Result<T, ChaosError>;
