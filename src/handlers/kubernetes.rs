//! Kubernetes tool handler
//!
//! Exposes pod and namespace operations as MCP tools. Cluster failures are
//! reported as tool results flagged `isError`, so the model sees the message;
//! malformed calls are JSON-RPC errors.

use crate::{
    error::{Error, Result},
    k8s::{render_events, render_pods, ClusterApi},
    protocol::McpProtocol,
    types::{CallToolResult, ServerCapabilities, ServerInfo, Tool, ToolsCapability},
};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{error, info};

/// Name announced in `initialize`
pub const SERVER_NAME: &str = "k8s_pod_query";

const DEFAULT_NAMESPACE: &str = "default";
const DEFAULT_IMAGE: &str = "nginx";
const DEFAULT_TAIL_LINES: i64 = 50;

pub struct KubernetesHandler {
    cluster: Arc<dyn ClusterApi>,
}

impl KubernetesHandler {
    pub fn new(cluster: Arc<dyn ClusterApi>) -> Self {
        Self { cluster }
    }

    async fn get_pods(&self, namespace: Option<&str>) -> CallToolResult {
        match self.cluster.list_pods(namespace).await {
            Ok(pods) if pods.is_empty() => CallToolResult::text("No pods found."),
            Ok(pods) => CallToolResult::text(render_pods(&pods)),
            Err(e) => failure("Error retrieving pods", e),
        }
    }

    async fn get_pod_logs(&self, pod: &str, namespace: &str, tail_lines: i64) -> CallToolResult {
        match self.cluster.pod_logs(pod, namespace, tail_lines).await {
            Ok(logs) => CallToolResult::text(logs),
            Err(e) => failure("Error retrieving pod logs", e),
        }
    }

    async fn create_pod(&self, pod: &str, namespace: &str, image: &str) -> CallToolResult {
        match self.cluster.create_pod(pod, namespace, image).await {
            Ok(()) => {
                CallToolResult::text(format!("Pod {} created in namespace {}.", pod, namespace))
            }
            Err(e) => failure("Error creating pod", e),
        }
    }

    async fn create_namespace(&self, namespace: &str) -> CallToolResult {
        match self.cluster.create_namespace(namespace).await {
            Ok(()) => CallToolResult::text(format!("Namespace {} created.", namespace)),
            Err(e) => failure("Error creating namespace", e),
        }
    }

    async fn delete_pod(&self, pod: &str, namespace: &str) -> CallToolResult {
        match self.cluster.delete_pod(pod, namespace).await {
            Ok(()) => {
                CallToolResult::text(format!("Pod {} deleted from namespace {}.", pod, namespace))
            }
            Err(e) => failure("Error deleting pod", e),
        }
    }

    async fn delete_namespace(&self, namespace: &str) -> CallToolResult {
        match self.cluster.delete_namespace(namespace).await {
            Ok(()) => CallToolResult::text(format!("Namespace {} deleted.", namespace)),
            Err(e) => failure("Error deleting namespace", e),
        }
    }

    async fn get_pod_events(&self, pod: &str, namespace: &str) -> CallToolResult {
        match self.cluster.list_events(namespace).await {
            Ok(events) => {
                let pod_events: Vec<_> = events.into_iter().filter(|e| e.concerns(pod)).collect();
                if pod_events.is_empty() {
                    CallToolResult::text("No events found for this pod.")
                } else {
                    CallToolResult::text(render_events(&pod_events))
                }
            }
            Err(e) => failure("Error retrieving pod events", e),
        }
    }
}

fn failure(context: &str, err: Error) -> CallToolResult {
    error!("{}: {}", context, err);
    CallToolResult::error(format!("{}: {}", context, err))
}

#[async_trait]
impl McpProtocol for KubernetesHandler {
    async fn initialize(&self) -> Result<(ServerInfo, ServerCapabilities)> {
        info!("Client initialized with {}", SERVER_NAME);
        Ok((
            ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
        ))
    }

    async fn list_tools(&self) -> Result<Vec<Tool>> {
        Ok(tool_definitions())
    }

    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<CallToolResult> {
        info!("Calling tool {}", name);
        let args = ToolArgs(&arguments);

        let result = match name {
            "get_pods" => {
                let namespace = args.optional_str("namespace")?;
                self.get_pods(namespace.as_deref()).await
            }
            "get_pod_logs" => {
                let pod = args.required_str("pod_name")?;
                let namespace = args.str_or("namespace", DEFAULT_NAMESPACE)?;
                let tail_lines = args.tail_lines()?;
                self.get_pod_logs(&pod, &namespace, tail_lines).await
            }
            "create_pod" => {
                let pod = args.required_str("pod_name")?;
                let namespace = args.str_or("namespace", DEFAULT_NAMESPACE)?;
                let image = args.str_or("image", DEFAULT_IMAGE)?;
                self.create_pod(&pod, &namespace, &image).await
            }
            "create_namespace" => {
                let namespace = args.required_str("namespace")?;
                self.create_namespace(&namespace).await
            }
            "delete_pod" => {
                let pod = args.required_str("pod_name")?;
                let namespace = args.str_or("namespace", DEFAULT_NAMESPACE)?;
                self.delete_pod(&pod, &namespace).await
            }
            "delete_namespace" => {
                let namespace = args.required_str("namespace")?;
                self.delete_namespace(&namespace).await
            }
            "get_pod_events" => {
                let pod = args.required_str("pod_name")?;
                let namespace = args.str_or("namespace", DEFAULT_NAMESPACE)?;
                self.get_pod_events(&pod, &namespace).await
            }
            other => return Err(Error::InvalidParams(format!("Unknown tool: {}", other))),
        };

        Ok(result)
    }
}

/// Typed access to `tools/call` arguments
struct ToolArgs<'a>(&'a Map<String, Value>);

impl ToolArgs<'_> {
    /// Absent and `null` both mean "not given"
    fn optional_str(&self, key: &str) -> Result<Option<String>> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Err(Error::InvalidParams(format!(
                "'{}' must not be empty",
                key
            ))),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(Error::InvalidParams(format!("'{}' must be a string", key))),
        }
    }

    fn required_str(&self, key: &str) -> Result<String> {
        self.optional_str(key)?
            .ok_or_else(|| Error::InvalidParams(format!("Missing '{}' argument", key)))
    }

    fn str_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self
            .optional_str(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    fn tail_lines(&self) -> Result<i64> {
        match self.0.get("tail_lines") {
            None | Some(Value::Null) => Ok(DEFAULT_TAIL_LINES),
            Some(value) => match value.as_i64() {
                Some(n) if n >= 0 => Ok(n),
                _ => Err(Error::InvalidParams(
                    "'tail_lines' must be a non-negative integer".to_string(),
                )),
            },
        }
    }
}

fn tool(name: &str, description: &str, input_schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// The seven tools served by [`KubernetesHandler`]
pub fn tool_definitions() -> Vec<Tool> {
    let pod_name = json!({"type": "string", "description": "Pod name"});
    let namespace = json!({
        "type": "string",
        "description": "Namespace",
        "default": DEFAULT_NAMESPACE
    });

    vec![
        tool(
            "get_pods",
            "Get pod information for one namespace, or for all namespaces when none is given",
            json!({
                "type": "object",
                "properties": {
                    "namespace": {
                        "type": ["string", "null"],
                        "description": "Optional namespace; omit to list pods in every namespace"
                    }
                }
            }),
        ),
        tool(
            "get_pod_logs",
            "Get the logs of a pod",
            json!({
                "type": "object",
                "properties": {
                    "pod_name": pod_name,
                    "namespace": namespace,
                    "tail_lines": {
                        "type": "integer",
                        "description": "Number of log lines to return",
                        "default": DEFAULT_TAIL_LINES
                    }
                },
                "required": ["pod_name"]
            }),
        ),
        tool(
            "create_pod",
            "Create a new single-container pod",
            json!({
                "type": "object",
                "properties": {
                    "pod_name": pod_name,
                    "namespace": namespace,
                    "image": {
                        "type": "string",
                        "description": "Container image",
                        "default": DEFAULT_IMAGE
                    }
                },
                "required": ["pod_name"]
            }),
        ),
        tool(
            "create_namespace",
            "Create a new namespace",
            json!({
                "type": "object",
                "properties": {
                    "namespace": {"type": "string", "description": "Namespace name"}
                },
                "required": ["namespace"]
            }),
        ),
        tool(
            "delete_pod",
            "Delete a pod",
            json!({
                "type": "object",
                "properties": {
                    "pod_name": pod_name,
                    "namespace": namespace
                },
                "required": ["pod_name"]
            }),
        ),
        tool(
            "delete_namespace",
            "Delete a namespace",
            json!({
                "type": "object",
                "properties": {
                    "namespace": {"type": "string", "description": "Namespace name"}
                },
                "required": ["namespace"]
            }),
        ),
        tool(
            "get_pod_events",
            "Get the events recorded for a pod",
            json!({
                "type": "object",
                "properties": {
                    "pod_name": pod_name,
                    "namespace": namespace
                },
                "required": ["pod_name"]
            }),
        ),
    ]
}
