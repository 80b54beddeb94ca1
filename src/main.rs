//! Unreal Bridge - command-line front end.
//!
//! ```text
//! unreal-bridge tools                               List the tool catalogue
//! unreal-bridge tool get_actors                     Run a tool, print its text
//! unreal-bridge tool find_assets --args '{"asset_name":"Floor"}'
//! unreal-bridge call get_project_dir                Send a raw command, print the reply JSON
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use unreal_bridge::operations::{run_tool, TOOLS};
use unreal_bridge::{BridgeClient, BridgeConfig, FramingMode, Reply};

#[derive(Parser, Debug)]
#[command(
    name = "unreal-bridge",
    version,
    about = "Send commands to the Unreal Editor socket plugin"
)]
struct Cli {
    /// Plugin host (overrides UNREAL_BRIDGE_HOST).
    #[arg(long, global = true)]
    host: Option<String>,

    /// Plugin port (overrides UNREAL_BRIDGE_PORT).
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Wire framing: `unframed` or `content_length`.
    #[arg(long, global = true)]
    framing: Option<FramingMode>,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a raw plugin command and print the reply as JSON.
    Call {
        /// Plugin command name, e.g. `get_actors`.
        command: String,
        /// Parameter object as JSON.
        #[arg(long)]
        params: Option<String>,
    },
    /// Run a tool from the catalogue and print its text output.
    Tool {
        /// Tool name, see `tools`.
        name: String,
        /// Tool arguments as a JSON object.
        #[arg(long)]
        args: Option<String>,
    },
    /// List the tool catalogue.
    Tools,
}

fn parse_json_arg(raw: Option<&str>, what: &str) -> Result<Value> {
    match raw {
        Some(text) => serde_json::from_str(text).with_context(|| format!("Invalid {what} JSON")),
        None => Ok(Value::Null),
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "unreal_bridge=debug"
    } else {
        "unreal_bridge=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Resolve the config from env and flags, then make the startup connection attempt.
async fn start_client(
    host: Option<String>,
    port: Option<u16>,
    framing: Option<FramingMode>,
) -> BridgeClient {
    let mut config = BridgeConfig::from_env();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(framing) = framing {
        config.framing = framing;
    }

    tracing::info!("Starting Unreal Engine bridge v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(
        "endpoint {} framing {}",
        config.endpoint(),
        config.framing.as_str()
    );

    let mut client = BridgeClient::new(config);
    client.connect_on_startup().await;
    client
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        host,
        port,
        framing,
        verbose,
        command,
    } = Cli::parse();
    init_logging(verbose);

    match command {
        Command::Tools => {
            for (name, description) in TOOLS {
                println!("{name:<32} {description}");
            }
        }
        Command::Call { command, params } => {
            let params = parse_json_arg(params.as_deref(), "params")?;
            let mut client = start_client(host, port, framing).await;
            let reply = client.execute(&command, params).await;
            client.disconnect();
            println!("{}", serde_json::to_string_pretty(&reply.to_value())?);
            if let Reply::Error(e) = &reply {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
        Command::Tool { name, args } => {
            let args = parse_json_arg(args.as_deref(), "args")?;
            let mut client = start_client(host, port, framing).await;
            let text = run_tool(&mut client, &name, args).await;
            client.disconnect();
            println!("{text}");
        }
    }

    Ok(())
}
