//! Launch descriptor for MCP registries.
//!
//! A registry hands the user's configuration object (`{"anthropicApiKey": ...}`)
//! to a command function that returns the process to start. This module holds
//! the configuration schema and that mapping. The mapping is pure: the same
//! configuration always yields the same command.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Configuration property carrying the API key
pub const API_KEY_PROPERTY: &str = "anthropicApiKey";

/// Environment variable the API key is injected as
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// User-supplied launch configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchConfig {
    pub anthropic_api_key: String,
}

impl std::fmt::Debug for LaunchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchConfig")
            .field("anthropic_api_key", &"[REDACTED]")
            .finish()
    }
}

impl LaunchConfig {
    /// Validate a raw configuration object against [`config_schema`]
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::Launch("configuration must be an object".to_string()))?;

        let key = match object.get(API_KEY_PROPERTY) {
            None | Some(Value::Null) => {
                return Err(Error::Launch(format!("{} is required", API_KEY_PROPERTY)))
            }
            Some(Value::String(key)) => key,
            Some(_) => {
                return Err(Error::Launch(format!("{} must be a string", API_KEY_PROPERTY)))
            }
        };

        if key.trim().is_empty() {
            return Err(Error::Launch(format!("{} must not be empty", API_KEY_PROPERTY)));
        }

        Ok(Self {
            anthropic_api_key: key.clone(),
        })
    }

    pub fn from_json(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(&value)
    }
}

/// JSON schema of the launch configuration object
pub fn config_schema() -> Value {
    json!({
        "type": "object",
        "required": [API_KEY_PROPERTY],
        "properties": {
            API_KEY_PROPERTY: {
                "type": "string",
                "description": "The API key for the Anthropic API."
            }
        }
    })
}

/// Process to start: program, arguments and extra environment
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchCommand {
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl std::fmt::Debug for LaunchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env: BTreeMap<&str, &str> = self.env.keys().map(|k| (k.as_str(), "[REDACTED]")).collect();
        f.debug_struct("LaunchCommand")
            .field("command", &self.command)
            .field("args", &self.args)
            .field("env", &env)
            .finish()
    }
}

/// Program and arguments a [`LaunchCommand`] is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTemplate {
    pub command: String,
    pub args: Vec<String>,
}

impl Default for LaunchTemplate {
    /// The registry descriptor's runner invocation: `uv run mcp-k8s.py`
    fn default() -> Self {
        Self {
            command: "uv".to_string(),
            args: vec!["run".to_string(), "mcp-k8s.py".to_string()],
        }
    }
}

impl LaunchTemplate {
    /// Run this crate's binary on stdio
    pub fn native(program: impl Into<String>) -> Self {
        Self {
            command: program.into(),
            args: vec![
                "serve".to_string(),
                "--transport".to_string(),
                "stdio".to_string(),
            ],
        }
    }

    pub fn command_for(&self, config: &LaunchConfig) -> LaunchCommand {
        let mut env = BTreeMap::new();
        env.insert(API_KEY_ENV.to_string(), config.anthropic_api_key.clone());

        LaunchCommand {
            command: self.command.clone(),
            args: self.args.clone(),
            env,
        }
    }
}

/// Map a configuration to the descriptor's default launch command
pub fn launch_command(config: &LaunchConfig) -> LaunchCommand {
    LaunchTemplate::default().command_for(config)
}
