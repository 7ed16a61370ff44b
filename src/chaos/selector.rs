//! Victim selection strategies
//!
//! The orchestrator never draws random numbers itself. It asks a
//! [`VictimSelector`], so tests can swap in a deterministic choice.

use rand::seq::SliceRandom;

use super::types::CandidateKey;

/// Picks the pod to terminate from a non-empty candidate list
pub trait VictimSelector: Send + Sync {
    /// `keys` is never empty; callers skip the cycle instead.
    fn select(&self, keys: &[CandidateKey]) -> CandidateKey;
}

impl<F> VictimSelector for F
where
    F: Fn(&[CandidateKey]) -> CandidateKey + Send + Sync,
{
    fn select(&self, keys: &[CandidateKey]) -> CandidateKey {
        self(keys)
    }
}

/// Uniform random choice, not suitable for anything security related
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl VictimSelector for RandomSelector {
    fn select(&self, keys: &[CandidateKey]) -> CandidateKey {
        if let [only] = keys {
            return only.clone();
        }

        keys.choose(&mut rand::thread_rng())
            .cloned()
            .expect("victim selection requires at least one candidate")
    }
}

/// Always picks the key at a fixed position, clamped to the last one
#[derive(Debug, Clone, Copy)]
pub struct IndexSelector(pub usize);

impl VictimSelector for IndexSelector {
    fn select(&self, keys: &[CandidateKey]) -> CandidateKey {
        let index = self.0.min(keys.len().saturating_sub(1));
        keys[index].clone()
    }
}
