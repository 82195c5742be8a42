//! Mock Cluster
//!
//! In-memory ClusterApi implementation for handler and transport tests

use async_trait::async_trait;
use mcp_k8s::k8s::{ClusterApi, EventSummary, PodSummary};
use mcp_k8s::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct State {
    pods: Vec<PodSummary>,
    namespaces: Vec<String>,
    events: Vec<(String, EventSummary)>,
    logs: HashMap<(String, String), String>,
    last_tail_lines: Option<i64>,
    failure: Option<String>,
}

/// Mock cluster whose contents tests seed and inspect
#[derive(Clone, Default)]
pub struct MockCluster {
    state: Arc<Mutex<State>>,
}

impl MockCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_pod(&self, name: &str, namespace: &str, phase: &str) {
        self.state.lock().await.pods.push(PodSummary {
            name: name.to_string(),
            namespace: Some(namespace.to_string()),
            phase: Some(phase.to_string()),
            ..Default::default()
        });
    }

    pub async fn add_event(&self, namespace: &str, pod: &str, reason: &str, message: &str) {
        self.state.lock().await.events.push((
            namespace.to_string(),
            EventSummary {
                involved_name: Some(pod.to_string()),
                message: Some(message.to_string()),
                reason: Some(reason.to_string()),
                event_type: Some("Normal".to_string()),
                source_component: Some("kubelet".to_string()),
                ..Default::default()
            },
        ));
    }

    pub async fn set_logs(&self, pod: &str, namespace: &str, logs: &str) {
        self.state
            .lock()
            .await
            .logs
            .insert((namespace.to_string(), pod.to_string()), logs.to_string());
    }

    /// Make every subsequent call fail with `message`
    pub async fn fail_with(&self, message: &str) {
        self.state.lock().await.failure = Some(message.to_string());
    }

    pub async fn pods(&self) -> Vec<PodSummary> {
        self.state.lock().await.pods.clone()
    }

    pub async fn namespaces(&self) -> Vec<String> {
        self.state.lock().await.namespaces.clone()
    }

    pub async fn last_tail_lines(&self) -> Option<i64> {
        self.state.lock().await.last_tail_lines
    }

    async fn check(&self) -> Result<()> {
        match &self.state.lock().await.failure {
            Some(message) => Err(Error::Internal(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClusterApi for MockCluster {
    async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<PodSummary>> {
        self.check().await?;
        let state = self.state.lock().await;
        Ok(state
            .pods
            .iter()
            .filter(|p| namespace.is_none() || p.namespace.as_deref() == namespace)
            .cloned()
            .collect())
    }

    async fn pod_logs(&self, pod: &str, namespace: &str, tail_lines: i64) -> Result<String> {
        self.check().await?;
        let mut state = self.state.lock().await;
        state.last_tail_lines = Some(tail_lines);
        state
            .logs
            .get(&(namespace.to_string(), pod.to_string()))
            .cloned()
            .ok_or_else(|| Error::Internal(format!("pods \"{}\" not found", pod)))
    }

    async fn create_pod(&self, pod: &str, namespace: &str, image: &str) -> Result<()> {
        self.check().await?;
        let mut state = self.state.lock().await;
        state.pods.push(PodSummary {
            name: pod.to_string(),
            namespace: Some(namespace.to_string()),
            phase: Some("Pending".to_string()),
            container_state: Some(format!("waiting (pulling {})", image)),
            ..Default::default()
        });
        Ok(())
    }

    async fn create_namespace(&self, name: &str) -> Result<()> {
        self.check().await?;
        let mut state = self.state.lock().await;
        if state.namespaces.iter().any(|n| n == name) {
            return Err(Error::Internal(format!(
                "namespaces \"{}\" already exists",
                name
            )));
        }
        state.namespaces.push(name.to_string());
        Ok(())
    }

    async fn delete_pod(&self, pod: &str, namespace: &str) -> Result<()> {
        self.check().await?;
        let mut state = self.state.lock().await;
        let before = state.pods.len();
        state
            .pods
            .retain(|p| !(p.name == pod && p.namespace.as_deref() == Some(namespace)));
        if state.pods.len() == before {
            return Err(Error::Internal(format!("pods \"{}\" not found", pod)));
        }
        Ok(())
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        self.check().await?;
        let mut state = self.state.lock().await;
        state.namespaces.retain(|n| n != name);
        Ok(())
    }

    async fn list_events(&self, namespace: &str) -> Result<Vec<EventSummary>> {
        self.check().await?;
        let state = self.state.lock().await;
        Ok(state
            .events
            .iter()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, e)| e.clone())
            .collect())
    }
}
