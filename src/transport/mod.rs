//! Transport layer for MCP communication.
//!
//! Two transports are supported: HTTP + Server-Sent Events for networked
//! clients, and newline-delimited stdio for clients that spawn the server.

pub mod sse;
pub mod stdio;

pub use sse::{SessionRegistry, SseServer, MESSAGES_PATH};
pub use stdio::{serve_lines, serve_stdio};
