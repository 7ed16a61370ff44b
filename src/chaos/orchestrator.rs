//! The deletion cycle
//!
//! Each cycle reads the mirrored candidates, picks a victim, re-resolves it
//! against the mirror and asks the API server to delete it. Races where the
//! victim disappears along the way are absorbed, they are normal churn.

use tracing::{debug, info, instrument};

use super::selector::VictimSelector;
use super::types::{CandidateKey, CycleOutcome, DeletionRequest};
use crate::error::{ChaosError, ChaosResult};
use crate::k8s::{CandidateMirror, PodDeleter};

/// Deletes one random running pod per cycle
pub struct PodChaosMonkey<C, M> {
    client: C,
    mirror: M,
    namespace: String,
    simulate_only: bool,
}

impl<C, M> PodChaosMonkey<C, M>
where
    C: PodDeleter,
    M: CandidateMirror,
{
    pub fn new(client: C, mirror: M, namespace: &str, simulate_only: bool) -> Self {
        Self {
            client,
            mirror,
            namespace: namespace.to_string(),
            simulate_only,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn simulate_only(&self) -> bool {
        self.simulate_only
    }

    /// Run one selection and deletion pass.
    ///
    /// Only API failures other than not-found, a failing mirror lookup, or a
    /// mirrored object that does not match its key end up as errors.
    #[instrument(skip_all, fields(namespace = %self.namespace))]
    pub async fn run_cycle<S>(&self, selector: &S) -> ChaosResult<CycleOutcome>
    where
        S: VictimSelector + ?Sized,
    {
        let keys = self.mirror.list_candidate_keys();
        if keys.is_empty() {
            debug!("No running pod found in namespace");
            return Ok(CycleOutcome::NoCandidates);
        }
        debug!(candidates = keys.len(), "Candidate snapshot taken");

        let key = selector.select(&keys);

        let pod = match self.mirror.get_by_key(&key)? {
            Some(pod) => pod,
            None => {
                info!(pod = %key, "Pod not found in mirror, skipping deletion");
                return Ok(CycleOutcome::VanishedFromMirror(key));
            }
        };
        debug!(pod = %key, "Pod candidate found for deletion");

        let name = self.check_shape(
            &key,
            pod.metadata.name.as_deref(),
            pod.metadata.namespace.as_deref(),
        )?;

        let request = DeletionRequest {
            key: CandidateKey::new(&key.namespace, name),
            simulate_only: self.simulate_only,
        };

        info!(pod = %key, dry_run = self.simulate_only, "Deleting pod");
        match self.client.delete_pod(&request).await {
            Ok(()) if self.simulate_only => {
                info!(pod = %key, "Pod deletion validated in dry-run mode");
                Ok(CycleOutcome::Simulated(key))
            }
            Ok(()) => {
                info!(pod = %key, "Pod deleted");
                Ok(CycleOutcome::Deleted(key))
            }
            Err(kube::Error::Api(ae)) if ae.code == 404 => {
                info!(pod = %key, "Pod candidate was already deleted");
                Ok(CycleOutcome::AlreadyDeleted(key))
            }
            Err(source) => Err(ChaosError::Delete { key, source }),
        }
    }

    /// Make sure the mirrored pod is the one the key names, in our namespace
    fn check_shape<'a>(
        &self,
        key: &CandidateKey,
        name: Option<&'a str>,
        namespace: Option<&str>,
    ) -> ChaosResult<&'a str> {
        let name = name.ok_or_else(|| ChaosError::shape_mismatch(key, "pod has no name"))?;
        if name != key.name {
            return Err(ChaosError::shape_mismatch(
                key,
                &format!("mirror returned pod '{}'", name),
            ));
        }
        if let Some(namespace) = namespace {
            if namespace != key.namespace {
                return Err(ChaosError::shape_mismatch(
                    key,
                    &format!("mirror returned a pod from namespace '{}'", namespace),
                ));
            }
        }
        if key.namespace != self.namespace {
            return Err(ChaosError::shape_mismatch(
                key,
                &format!("pod is outside the monitored namespace '{}'", self.namespace),
            ));
        }
        Ok(name)
    }
}
