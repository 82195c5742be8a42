//! Handler implementations for different target systems
//!
//! Each handler implements [`McpProtocol`](crate::protocol::McpProtocol).

pub mod kubernetes;

pub use kubernetes::KubernetesHandler;
