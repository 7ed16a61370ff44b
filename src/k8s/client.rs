//! Kubernetes client bootstrap and the pod deletion seam

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    api::{Api, DeleteParams},
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};
use tracing::{debug, info, instrument};

use crate::chaos::DeletionRequest;
use crate::error::ChaosResult;

/// Build a client from an explicit kubeconfig file, or infer one
/// (in-cluster service account first, then the default kubeconfig)
#[instrument(skip_all)]
pub async fn connect(kubeconfig: Option<&str>) -> ChaosResult<Client> {
    let config = match kubeconfig {
        Some(path) => {
            info!(path, "Loading kubeconfig");
            let kubeconfig = Kubeconfig::read_from(path)?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?
        }
        None => Config::infer().await?,
    };

    Ok(Client::try_from(config)?)
}

/// Check the API server is reachable, returning its version string
pub async fn health_check(client: &Client) -> ChaosResult<String> {
    let version = client.apiserver_version().await?;
    info!(version = %version.git_version, "Kubernetes cluster is healthy");
    Ok(version.git_version)
}

/// The one control-plane call the orchestrator needs.
///
/// A pod that is already gone must come back as `kube::Error::Api` with
/// code 404 so callers can tell it apart from real failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PodDeleter: Send + Sync {
    async fn delete_pod(&self, request: &DeletionRequest) -> Result<(), kube::Error>;
}

/// Deletes pods through the API server
#[derive(Clone)]
pub struct KubePodDeleter {
    client: Client,
}

impl KubePodDeleter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PodDeleter for KubePodDeleter {
    #[instrument(skip(self, request), fields(pod = %request.key, dry_run = request.simulate_only))]
    async fn delete_pod(&self, request: &DeletionRequest) -> Result<(), kube::Error> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &request.key.namespace);
        let params = DeleteParams {
            dry_run: request.simulate_only,
            ..DeleteParams::default()
        };

        pods.delete(&request.key.name, &params).await?;
        debug!("Delete accepted by the API server");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chaos::CandidateKey;
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};

    /// A client whose "API server" records request URIs and answers
    /// with the given status and body
    fn recording_client(status: u16, body: serde_json::Value) -> (Client, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let body = body.to_string();

        let service = tower::service_fn(move |req: http::Request<hyper::Body>| {
            recorder
                .lock()
                .unwrap()
                .push(format!("{} {}", req.method(), req.uri()));
            let response = http::Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(hyper::Body::from(body.clone()))
                .unwrap();
            async move { Ok::<_, Infallible>(response) }
        });

        (Client::new(service, "workloads"), seen)
    }

    fn pod_body(name: &str) -> serde_json::Value {
        serde_json::json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": { "name": name, "namespace": "workloads" }
        })
    }

    fn request(simulate_only: bool) -> DeletionRequest {
        DeletionRequest {
            key: CandidateKey::new("workloads", "pod0"),
            simulate_only,
        }
    }

    #[tokio::test]
    async fn test_delete_pod_hits_pod_endpoint() {
        let (client, seen) = recording_client(200, pod_body("pod0"));
        let deleter = KubePodDeleter::new(client);

        deleter.delete_pod(&request(false)).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with("DELETE /api/v1/namespaces/workloads/pods/pod0"));
        assert!(!seen[0].contains("dryRun"));
    }

    #[tokio::test]
    async fn test_delete_pod_dry_run_reaches_server() {
        let (client, seen) = recording_client(200, pod_body("pod0"));
        let deleter = KubePodDeleter::new(client);

        deleter.delete_pod(&request(true)).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("dryRun=All"), "got {}", seen[0]);
    }

    #[tokio::test]
    async fn test_delete_pod_not_found_is_distinguishable() {
        let status = serde_json::json!({
            "kind": "Status",
            "apiVersion": "v1",
            "metadata": {},
            "status": "Failure",
            "message": "pods \"pod0\" not found",
            "reason": "NotFound",
            "code": 404
        });
        let (client, _) = recording_client(404, status);
        let deleter = KubePodDeleter::new(client);

        let err = deleter.delete_pod(&request(false)).await.unwrap_err();
        assert!(matches!(err, kube::Error::Api(ref ae) if ae.code == 404), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_delete_pod_forbidden() {
        let status = serde_json::json!({
            "kind": "Status",
            "apiVersion": "v1",
            "metadata": {},
            "status": "Failure",
            "message": "pods \"pod0\" is forbidden",
            "reason": "Forbidden",
            "code": 403
        });
        let (client, _) = recording_client(403, status);
        let deleter = KubePodDeleter::new(client);

        let err = deleter.delete_pod(&request(false)).await.unwrap_err();
        assert!(matches!(err, kube::Error::Api(ref ae) if ae.code == 403), "got {:?}", err);
    }
}
