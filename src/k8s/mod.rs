//! Kubernetes access for the MCP tools.
//!
//! [`ClusterApi`] is the seam between the tool handler and the cluster.
//! [`KubeCluster`] talks to a real API server through `kube`; tests supply
//! in-memory implementations.

mod cluster;
mod manifest;
mod render;
mod summary;

pub use cluster::{ClusterApi, KubeCluster, DEFAULT_CONTEXT};
pub use manifest::{namespace_manifest, pod_manifest};
pub use render::{render_events, render_pods};
pub use summary::{EventSummary, PodSummary};
