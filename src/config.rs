//! Server configuration: defaults, TOML file, `MCP_K8S_*` environment and
//! command-line overrides.

mod loader;
mod types;

pub use loader::{CliOverrides, ConfigLoader, ENV_PREFIX};
pub use types::{KubernetesConfig, LogFormat, LoggingConfig, McpConfig, ServerConfig, TransportKind};

use crate::error::{Error, Result};
use std::net::{SocketAddr, ToSocketAddrs};

impl McpConfig {
    /// Resolve `server.host` and `server.port` to a bindable address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        (self.server.host.as_str(), self.server.port)
            .to_socket_addrs()
            .map_err(|e| Error::Config(format!("Invalid bind address {}: {}", self.server.host, e)))?
            .next()
            .ok_or_else(|| {
                Error::Config(format!("Bind address {} did not resolve", self.server.host))
            })
    }

    /// Sample configuration file with every key at its default
    pub fn sample_config() -> Result<String> {
        let body = toml::to_string_pretty(&McpConfig::default())
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(format!(
            r#"# mcp-k8s configuration file
#
# Save as mcp-k8s.toml (or config/mcp-k8s.toml), or pass --config <path>.
# Every key can be overridden from the environment, e.g.
#   MCP_K8S_SERVER__PORT=9000
#   MCP_K8S_KUBERNETES__CONTEXT=my-cluster
# The Anthropic API key is only read from ANTHROPIC_API_KEY.
#
# [logging]
# dir = "/var/log/mcp-k8s"   # daily-rotated files in addition to stderr

{}"#,
            body
        ))
    }
}
