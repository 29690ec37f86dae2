mod manage;
mod queries;
mod script;

use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand, ValueEnum};
use futures::{TryFuture, TryFutureExt, future::Either, pin_mut};
use labdash_client::{
    LabClient, LabClientConfig,
    api::LabAuthClient,
    orchestration::{QueryCache, SessionScreen},
};
use manage::{DeviceAction, DeviceTypeAction, SoftwareAction, VideoAction};
use queries::QueryTarget;
use script::ScriptCommand;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base URL of the laboratory API (e.g., http://localhost:8000).
    #[arg(short, long, env = "LABDASH_URL", value_parser = clap::value_parser!(url::Url))]
    url: url::Url,
    /// Bearer token attached to all requests.
    #[arg(long, env = "LABDASH_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// YAML file with the client configuration.
    #[arg(short, long, env = "LABDASH_CONFIG")]
    config: Option<PathBuf>,
    /// Request timeout in seconds. Overrides the configuration file.
    #[arg(long)]
    timeout: Option<u64>,
    /// Output format.
    #[arg(short, long, env, value_enum, default_value = "json")]
    format: Formats,
    /// Increases logging verbosity. `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum Formats {
    /// Output in JSON format.
    Json,
    /// Output in YAML format.
    Yaml,
}

impl Formats {
    pub fn serialize<T: serde::Serialize>(&self, value: T) -> anyhow::Result<String> {
        match self {
            Formats::Json => Ok(serde_json::to_string_pretty(&value)?),
            Formats::Yaml => Ok(serde_yaml::to_string(&value)?),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Perform a query.
    #[clap(visible_alias = "q")]
    Query {
        #[clap(subcommand)]
        target: QueryTarget,
    },
    /// Manage devices.
    Device {
        #[clap(subcommand)]
        action: DeviceAction,
    },
    /// Manage software.
    Software {
        #[clap(subcommand)]
        action: SoftwareAction,
    },
    /// Manage device types.
    DeviceType {
        #[clap(subcommand)]
        action: DeviceTypeAction,
    },
    /// Log in and print the issued tokens.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "LABDASH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out the session of the given token.
    Logout,
    /// Run experiment scripts.
    Script {
        #[clap(subcommand)]
        command: ScriptCommand,
    },
    /// Control the camera video stream.
    Video {
        #[clap(subcommand)]
        action: VideoAction,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<LabClientConfig> {
    let mut cfg = match &cli.config {
        Some(path) => {
            let file = std::fs::File::open(path)?;
            serde_yaml::from_reader::<_, LabClientConfig>(file)?
        }
        None => LabClientConfig::default(),
    };
    if let Some(timeout) = cli.timeout {
        cfg.timeout = Duration::from_secs(timeout);
    }
    Ok(cfg)
}

fn either_err<A, B>(either: Either<(<A as TryFuture>::Error, B), (<B as TryFuture>::Error, A)>) -> anyhow::Error
where
    A: TryFuture,
    B: TryFuture,
    A::Error: Into<anyhow::Error>,
    B::Error: Into<anyhow::Error>,
{
    match either {
        Either::Left((e, _)) => e.into(),
        Either::Right((e, _)) => e.into(),
    }
}

async fn execute(cli: Cli, client: LabClient) -> anyhow::Result<()> {
    let cache = QueryCache::new();
    let format = cli.format;

    let output = match cli.command {
        Commands::Query { target } => target.execute(client, cache, format).await?,
        Commands::Device { action } => action.execute(client, cache, format).await?,
        Commands::Software { action } => action.execute(client, cache, format).await?,
        Commands::DeviceType { action } => action.execute(client, cache, format).await?,
        Commands::Video { action } => action.execute(client, cache, format).await?,
        Commands::Login { username, password } => {
            let session = SessionScreen::new(client.clone(), cache);
            let user = session.login(&username, &password).await?;
            format.serialize(serde_json::json!({
                "user": user,
                "access_token": client.access_token(),
            }))?
        }
        Commands::Logout => {
            let session = SessionScreen::new(client, cache);
            session.logout().await?;
            format.serialize(serde_json::json!({ "authenticated": session.view().authenticated }))?
        }
        Commands::Script { command } => {
            command.execute(client, cache, format).await?;
            return Ok(());
        }
    };

    println!("{output}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cfg = load_config(&cli)?;
    let client = LabClient::new(cli.url.clone(), cfg)?;
    if let Some(token) = cli.token.clone() {
        client.set_access_token(Some(token));
    }

    // Script runs handle the interrupt themselves to stop the experiment.
    if matches!(cli.command, Commands::Script { .. }) {
        return execute(cli, client).await;
    }

    let exit_fut = tokio::signal::ctrl_c().inspect_ok(|_| {
        eprintln!("\nInterrupted.");
    });
    pin_mut!(exit_fut);

    let exec_fut = execute(cli, client);
    pin_mut!(exec_fut);

    futures::future::try_select(exit_fut, exec_fut)
        .map_err(either_err)
        .await?;

    Ok(())
}
