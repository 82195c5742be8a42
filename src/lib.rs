//! # mcp-k8s
//!
//! Model Context Protocol (MCP) server exposing Kubernetes pod and namespace
//! operations as tools.
//!
//! The server speaks JSON-RPC 2.0 over HTTP + Server-Sent Events or over
//! stdio. Tool calls are served by [`handlers::KubernetesHandler`], which
//! talks to the cluster through the [`k8s::ClusterApi`] trait.

pub mod config;
pub mod error;
pub mod handlers;
pub mod k8s;
pub mod launch;
pub mod logging;
pub mod protocol;
pub mod transport;
pub mod types;

pub use error::{Error, Result};
pub use protocol::McpProtocol;
pub use transport::SseServer;
