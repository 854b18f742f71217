//! kubediag CLI
//!
//! Command-line front end for the kubediag cluster diagnostics

mod commands;
mod output;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use kubediag_core::logging::LoggingConfig;
use kubediag_core::{DiagClient, DiagConfig};
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to $KUBEDIAG_CONFIG or ~/.config/kubediag/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    context: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run node, pod and event health checks
    Health,
    /// CPU and memory usage relative to requests
    Usage {
        /// Only show pods in this namespace
        #[arg(short, long)]
        namespace: Option<String>,
    },
    /// Redis cluster diagnostics
    Redis {
        #[command(subcommand)]
        command: RedisCommands,
    },
    /// List alertmanager alerts
    Alerts,
    /// Run a shell command in a container
    Exec {
        namespace: String,
        pod: String,
        /// Container name
        #[arg(short, long)]
        container: String,
        /// Command line passed to `sh -c`
        #[arg(required = true, trailing_var_arg = true)]
        command: Vec<String>,
    },
    /// Read-only cluster inventory
    Info {
        #[command(subcommand)]
        command: InfoCommands,
    },
    /// Set the trace level of a service
    DebugLevel {
        namespace: String,
        pod: String,
        container: String,
        /// Trace level, e.g. DEBUG_3
        level: String,
        /// Trace endpoint port (defaults to trace.port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Load-balancer IP (or hostname) of the configured service
    ServiceIp {
        #[arg(short, long)]
        namespace: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum RedisCommands {
    /// Cluster status from the custom resource
    Status,
    /// Key count of every primary
    Dbsize,
    /// Delete every key in the cluster
    Flush {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum InfoCommands {
    /// Kubernetes server version
    Version,
    /// Current context and API server
    Context,
    /// Node names and role counts
    Nodes,
    /// Namespace names
    Namespaces,
    /// Pod names in a namespace
    Pods { namespace: String },
    /// Container names of a pod
    Containers { pod: String },
    /// API resources advertised by the server
    ApiResources,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print a sample configuration file
    Sample,
    /// Print the resolved configuration
    Show,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Completions { shell } => {
            generate_completions(*shell);
            return Ok(());
        }
        Commands::Config {
            command: ConfigCommands::Sample,
        } => {
            print!("{}", DiagConfig::generate_sample());
            return Ok(());
        }
        _ => {}
    }

    let config_path = cli.config.clone().or_else(DiagConfig::find_config_file);
    let mut config =
        DiagConfig::load_from(config_path.as_deref()).context("Failed to load configuration")?;
    if let Some(context) = cli.context.clone() {
        config.cluster.context = Some(context);
    }

    // Guard must live until exit so buffered file logs are flushed
    let _log_guard = LoggingConfig::from(&config.logging)
        .init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    if let Commands::Config {
        command: ConfigCommands::Show,
    } = &cli.command
    {
        return output::print_yaml(&config);
    }

    let client = DiagClient::connect(&config.cluster)
        .await
        .context("Failed to connect to cluster")?;
    tracing::debug!(?client, "Connected");

    let format = cli.output;
    match cli.command {
        Commands::Health => {
            commands::health::handle_health_command(&client, &config, format).await?
        }
        Commands::Usage { namespace } => {
            commands::usage::handle_usage_command(&client, namespace.as_deref(), format).await?
        }
        Commands::Redis { command } => {
            commands::redis::handle_redis_command(command, &client, &config, format).await?
        }
        Commands::Alerts => {
            commands::alerts::handle_alerts_command(&client, &config, format).await?
        }
        Commands::Exec {
            namespace,
            pod,
            container,
            command,
        } => {
            commands::exec::handle_exec_command(
                &client,
                &config,
                &namespace,
                &pod,
                &container,
                &command.join(" "),
            )
            .await?
        }
        Commands::Info { command } => {
            commands::info::handle_info_command(command, &client, format).await?
        }
        Commands::DebugLevel {
            namespace,
            pod,
            container,
            level,
            port,
        } => {
            commands::exec::handle_debug_level_command(
                &client,
                &config,
                &namespace,
                &pod,
                &container,
                &level,
                port.unwrap_or(config.trace.port),
            )
            .await?
        }
        Commands::ServiceIp { namespace, name } => {
            let namespace = namespace.unwrap_or_else(|| config.services.namespace.clone());
            let name = name.unwrap_or_else(|| config.services.name.clone());
            commands::info::handle_service_ip_command(&client, &namespace, &name).await?
        }
        Commands::Config { .. } | Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Generate shell completions
fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut io::stdout());
}
