use super::types::{McpConfig, TransportKind};
use crate::error::{Error, Result};
use crate::launch::API_KEY_ENV;
use config::{Config, ConfigBuilder, Environment, File};
use config::builder::DefaultState;
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable prefix, e.g. `MCP_K8S_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "MCP_K8S";

/// Files probed when no explicit configuration file is given
const DEFAULT_CONFIG_FILES: [&str; 2] = ["mcp-k8s.toml", "config/mcp-k8s.toml"];

/// Values given on the command line; they win over every other source
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub transport: Option<TransportKind>,
    pub context: Option<String>,
    pub log_level: Option<String>,
}

/// Configuration loader with builder pattern
///
/// Sources, lowest precedence first: built-in defaults, configuration file,
/// environment, command line.
pub struct ConfigLoader {
    config_file: Option<PathBuf>,
    load_env: bool,
    cli_override: CliOverrides,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            config_file: None,
            load_env: false,
            cli_override: CliOverrides::default(),
        }
    }

    /// Load configuration from file; the file must exist when given
    pub fn load_from_file(mut self, path: Option<&Path>) -> Self {
        self.config_file = path.map(Path::to_path_buf);
        self
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn load_from_cli(mut self, overrides: CliOverrides) -> Self {
        self.cli_override = overrides;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<McpConfig> {
        let mut builder = Config::builder().add_source(Config::try_from(&McpConfig::default())?);

        if let Some(config_path) = &self.config_file {
            debug!("Loading configuration file {}", config_path.display());
            builder = builder.add_source(File::from(config_path.as_path()).required(true));
        } else {
            for path in DEFAULT_CONFIG_FILES {
                builder = builder.add_source(File::with_name(path).required(false));
            }
        }

        if self.load_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        builder = apply_overrides(builder, &self.cli_override)?;

        let mut config: McpConfig = builder.build()?.try_deserialize()?;

        if self.load_env {
            config.anthropic_api_key = std::env::var(API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .map(SecretString::from);
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_overrides(
    mut builder: ConfigBuilder<DefaultState>,
    cli: &CliOverrides,
) -> Result<ConfigBuilder<DefaultState>> {
    if let Some(host) = &cli.host {
        builder = builder.set_override("server.host", host.as_str())?;
    }
    if let Some(port) = cli.port {
        builder = builder.set_override("server.port", i64::from(port))?;
    }
    if let Some(transport) = cli.transport {
        builder = builder.set_override("server.transport", transport.as_str())?;
    }
    if let Some(context) = &cli.context {
        builder = builder.set_override("kubernetes.context", context.as_str())?;
    }
    if let Some(level) = &cli.log_level {
        builder = builder.set_override("logging.level", level.as_str())?;
    }
    Ok(builder)
}

impl McpConfig {
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::Config("server.host must not be empty".to_string()));
        }
        if self.server.port == 0 {
            return Err(Error::Config("server.port must not be 0".to_string()));
        }
        if self.kubernetes.context.trim().is_empty() {
            return Err(Error::Config(
                "kubernetes.context must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
