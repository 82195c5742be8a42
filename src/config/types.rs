use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Kubernetes client configuration
    pub kubernetes: KubernetesConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Anthropic API key handed over by the launcher (`ANTHROPIC_API_KEY`).
    /// Never serialized or logged.
    #[serde(skip)]
    pub anthropic_api_key: Option<SecretString>,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Transport to serve
    pub transport: TransportKind,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            transport: TransportKind::Sse,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// HTTP with Server-Sent Events
    #[default]
    Sse,
    /// Newline-delimited JSON-RPC on stdin/stdout
    Stdio,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Sse => "sse",
            TransportKind::Stdio => "stdio",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    /// Kubeconfig context tried before the in-cluster configuration
    pub context: String,
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            context: crate::k8s::DEFAULT_CONTEXT.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (error, warn, info, debug, trace)
    pub level: String,

    /// Log format
    pub format: LogFormat,

    /// Directory for daily-rotated log files; stderr only when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Pretty-printed format
    #[default]
    Pretty,

    /// JSON format
    Json,
}
