//! mcp-k8s binary entry point
//!
//! ```bash
//! # SSE server on 0.0.0.0:8081 using the kind-mcp-server context
//! mcp-k8s
//!
//! # stdio transport for clients that spawn the server
//! mcp-k8s serve --transport stdio
//!
//! # command a registry would run for a given configuration
//! mcp-k8s launch-command --config-json '{"anthropicApiKey":"sk-..."}'
//!
//! # same, but runnable: starts this binary on stdio
//! mcp-k8s launch-command --native --config-json '{"anthropicApiKey":"sk-..."}'
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mcp_k8s::{
    config::{CliOverrides, ConfigLoader, McpConfig, TransportKind},
    handlers::{kubernetes::tool_definitions, KubernetesHandler},
    k8s::KubeCluster,
    launch::{config_schema, launch_command, LaunchConfig, LaunchTemplate},
    logging,
    transport::{serve_stdio, SseServer},
    McpProtocol,
};
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, info};

/// Kubernetes pod and namespace tools over the Model Context Protocol
#[derive(Parser, Debug)]
#[command(name = "mcp-k8s", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server (default)
    Serve(ServeArgs),

    /// Print the command a registry launches for a configuration object
    LaunchCommand {
        /// Configuration object, e.g. '{"anthropicApiKey":"..."}'
        #[arg(long, env = "MCP_K8S_LAUNCH_CONFIG", hide_env_values = true)]
        config_json: String,

        /// Print a runnable command that starts this binary on stdio.
        ///
        /// Without this flag the output is the registry descriptor form
        /// (`uv run mcp-k8s.py`), which expects that script to be installed
        /// next to the registry runner and is not shipped with this crate.
        #[arg(long)]
        native: bool,
    },

    /// Print the JSON schema of the launch configuration
    ConfigSchema,

    /// Print a sample configuration file
    SampleConfig,
}

#[derive(Args, Debug, Clone, Default)]
struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Transport to serve
    #[arg(short, long, value_enum)]
    transport: Option<TransportKind>,

    /// Kubeconfig context to use
    #[arg(long)]
    context: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ServeArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            host: self.host.clone(),
            port: self.port,
            transport: self.transport,
            context: self.context.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => serve(args).await,
        Command::LaunchCommand {
            config_json,
            native,
        } => {
            let config = LaunchConfig::from_json(&config_json)?;
            let command = if native {
                let exe = std::env::current_exe().context("Failed to locate current executable")?;
                LaunchTemplate::native(exe.to_string_lossy()).command_for(&config)
            } else {
                launch_command(&config)
            };
            println!("{}", serde_json::to_string_pretty(&command)?);
            Ok(())
        }
        Command::ConfigSchema => {
            println!("{}", serde_json::to_string_pretty(&config_schema())?);
            Ok(())
        }
        Command::SampleConfig => {
            print!("{}", McpConfig::sample_config()?);
            Ok(())
        }
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let config = ConfigLoader::new()
        .load_from_file(args.config.as_deref())
        .load_from_env()
        .load_from_cli(args.overrides())
        .build()
        .context("Failed to load configuration")?;

    let _log_guard = logging::init_logging(&config.logging)?;

    info!("Starting mcp-k8s v{}", env!("CARGO_PKG_VERSION"));
    if config.anthropic_api_key.is_some() {
        info!("Anthropic API key provided");
    } else {
        debug!("No Anthropic API key in environment");
    }

    let cluster = KubeCluster::connect(&config.kubernetes.context)
        .await
        .context("Failed to create Kubernetes client")?;
    let handler: Arc<dyn McpProtocol> = Arc::new(KubernetesHandler::new(Arc::new(cluster)));

    info!("Available tools:");
    for tool in tool_definitions() {
        info!("  - {}: {}", tool.name, tool.description);
    }

    match config.server.transport {
        TransportKind::Sse => SseServer::new(handler).serve(config.bind_addr()?).await?,
        TransportKind::Stdio => serve_stdio(handler.as_ref()).await?,
    }

    Ok(())
}
