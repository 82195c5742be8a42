use super::{namespace_manifest, pod_manifest, EventSummary, PodSummary};
use crate::error::{Error, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Event, Namespace, Pod};
use kube::api::{DeleteParams, ListParams, LogParams, PostParams};
use kube::config::KubeConfigOptions;
use kube::{Api, Client, Config};
use tracing::{debug, error, info, warn};

/// Kubeconfig context used when none is configured
pub const DEFAULT_CONTEXT: &str = "kind-mcp-server";

/// Cluster operations backing the MCP tools
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Pods in `namespace`, or in every namespace when `None`
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<PodSummary>>;

    /// Last `tail_lines` lines of the pod's log
    async fn pod_logs(&self, pod: &str, namespace: &str, tail_lines: i64) -> Result<String>;

    async fn create_pod(&self, pod: &str, namespace: &str, image: &str) -> Result<()>;

    async fn create_namespace(&self, name: &str) -> Result<()>;

    async fn delete_pod(&self, pod: &str, namespace: &str) -> Result<()>;

    async fn delete_namespace(&self, name: &str) -> Result<()>;

    /// All events recorded in `namespace`
    async fn list_events(&self, namespace: &str) -> Result<Vec<EventSummary>>;
}

/// [`ClusterApi`] over a live API server
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the kubeconfig `context`, falling back to the
    /// in-cluster service account
    pub async fn connect(context: &str) -> Result<Self> {
        let config = load_config(context).await?;
        let client = Client::try_from(config)?;
        Ok(Self::new(client))
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

async fn load_config(context: &str) -> Result<Config> {
    let options = KubeConfigOptions {
        context: Some(context.to_string()),
        ..Default::default()
    };

    match Config::from_kubeconfig(&options).await {
        Ok(config) => {
            info!("Loaded Kubernetes configuration from kubeconfig (context {})", context);
            Ok(config)
        }
        Err(e) => {
            warn!("Could not load kubeconfig context {}: {}", context, e);
            match Config::incluster() {
                Ok(config) => {
                    info!("Loaded in-cluster Kubernetes configuration");
                    Ok(config)
                }
                Err(e) => {
                    error!("Could not load Kubernetes configuration: {}", e);
                    Err(Error::KubeConfig(e.to_string()))
                }
            }
        }
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<PodSummary>> {
        let api: Api<Pod> = match namespace {
            Some(ns) => self.pods(ns),
            None => Api::all(self.client.clone()),
        };
        let pods = api.list(&ListParams::default()).await?;
        debug!("Listed {} pods", pods.items.len());
        Ok(pods.items.iter().map(PodSummary::from).collect())
    }

    async fn pod_logs(&self, pod: &str, namespace: &str, tail_lines: i64) -> Result<String> {
        let params = LogParams {
            tail_lines: Some(tail_lines),
            ..Default::default()
        };
        Ok(self.pods(namespace).logs(pod, &params).await?)
    }

    async fn create_pod(&self, pod: &str, namespace: &str, image: &str) -> Result<()> {
        let manifest = pod_manifest(pod, namespace, image);
        self.pods(namespace)
            .create(&PostParams::default(), &manifest)
            .await?;
        info!("Created pod {}/{}", namespace, pod);
        Ok(())
    }

    async fn create_namespace(&self, name: &str) -> Result<()> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        namespaces
            .create(&PostParams::default(), &namespace_manifest(name))
            .await?;
        info!("Created namespace {}", name);
        Ok(())
    }

    async fn delete_pod(&self, pod: &str, namespace: &str) -> Result<()> {
        self.pods(namespace)
            .delete(pod, &DeleteParams::default())
            .await?;
        info!("Deleted pod {}/{}", namespace, pod);
        Ok(())
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        namespaces.delete(name, &DeleteParams::default()).await?;
        info!("Deleted namespace {}", name);
        Ok(())
    }

    async fn list_events(&self, namespace: &str) -> Result<Vec<EventSummary>> {
        let events: Api<Event> = Api::namespaced(self.client.clone(), namespace);
        let list = events.list(&ListParams::default()).await?;
        Ok(list.items.iter().map(EventSummary::from).collect())
    }
}
