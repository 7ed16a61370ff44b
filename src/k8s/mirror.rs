//! Local mirror of running pods
//!
//! Keeps a reflector store in sync with the API server through a
//! list+watch stream, so each chaos cycle reads candidates from memory
//! instead of listing pods over the network.

use std::sync::Arc;

use futures::StreamExt;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    api::Api,
    runtime::{
        reflector::{self, ObjectRef, Store},
        watcher::{self, Event as WatchEvent},
        WatchStreamExt,
    },
    Client,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::chaos::CandidateKey;
use crate::error::ChaosResult;

/// Only pods the API server reports as running are candidates
const RUNNING_POD_FIELD_SELECTOR: &str = "status.phase=Running";

/// Read access to the set of candidate pods
pub trait CandidateMirror: Send + Sync {
    /// Snapshot of every key currently believed to be running
    fn list_candidate_keys(&self) -> Vec<CandidateKey>;

    /// Local lookup, `Ok(None)` when the key is no longer mirrored
    fn get_by_key(&self, key: &CandidateKey) -> ChaosResult<Option<Arc<Pod>>>;
}

/// Candidate mirror backed by a kube reflector store
#[derive(Clone)]
pub struct PodMirror {
    store: Store<Pod>,
}

impl PodMirror {
    pub fn new(store: Store<Pod>) -> Self {
        Self { store }
    }

    /// Number of pods currently mirrored
    fn len(&self) -> usize {
        self.store.state().len()
    }
}

impl CandidateMirror for PodMirror {
    fn list_candidate_keys(&self) -> Vec<CandidateKey> {
        self.store
            .state()
            .iter()
            .filter_map(|pod| CandidateKey::from_pod(pod))
            .collect()
    }

    fn get_by_key(&self, key: &CandidateKey) -> ChaosResult<Option<Arc<Pod>>> {
        let obj_ref = ObjectRef::<Pod>::new(&key.name).within(&key.namespace);
        Ok(self.store.get(&obj_ref))
    }
}

/// Start mirroring running pods of `namespace` in a background task,
/// optionally narrowed to pods matching `label_selector`.
///
/// The task runs until `shutdown` is cancelled or the watch stream ends.
pub fn spawn_pod_mirror(
    client: Client,
    namespace: &str,
    label_selector: Option<&str>,
    shutdown: CancellationToken,
) -> (PodMirror, JoinHandle<()>) {
    let pods: Api<Pod> = Api::namespaced(client, namespace);
    let (store, writer) = reflector::store();
    let mirror = PodMirror::new(store);

    let mut watcher_config = watcher::Config::default().fields(RUNNING_POD_FIELD_SELECTOR);
    if let Some(labels) = label_selector {
        watcher_config = watcher_config.labels(labels);
    }
    let stream =
        reflector::reflector(writer, watcher::watcher(pods, watcher_config)).default_backoff();

    let namespace = namespace.to_string();
    let labels = label_selector.unwrap_or_default().to_string();
    let task_mirror = mirror.clone();
    let handle = tokio::spawn(async move {
        info!(namespace = %namespace, labels = %labels, "Pod mirror started");
        let mut stream = stream.boxed();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!(mirrored = task_mirror.len(), "Pod mirror stopping");
                    break;
                }
                event = stream.next() => match event {
                    Some(Ok(event)) => log_watch_event(&event),
                    Some(Err(e)) => {
                        // the backoff wrapper retries, keep consuming
                        error!("Pod watcher error: {}", e);
                    }
                    None => {
                        warn!("Pod watcher stream ended");
                        break;
                    }
                },
            }
        }
    });

    (mirror, handle)
}

fn log_watch_event(event: &WatchEvent<Pod>) {
    match event {
        WatchEvent::Applied(pod) => {
            if let Some(key) = CandidateKey::from_pod(pod) {
                debug!(pod = %key, "Pod mirrored");
            }
        }
        WatchEvent::Deleted(pod) => {
            if let Some(key) = CandidateKey::from_pod(pod) {
                debug!(pod = %key, "Pod dropped from mirror");
            }
        }
        WatchEvent::Restarted(pods) => {
            info!("Pod mirror resynced, {} running pods found", pods.len());
        }
    }
}
