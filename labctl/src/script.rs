use std::time::Duration;

use clap::{Subcommand, ValueEnum};
use futures::{future::Either, pin_mut};
use labdash_client::{
    LabClient,
    api::types::{ExperimentDetail, Id, ScriptName},
    orchestration::{DashboardScreen, QueryCache, ScriptOutcome, device_config},
};

use crate::Formats;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum StartMode {
    /// Runs the experiment on the server.
    Start,
    /// Runs the experiment locally on the device host.
    StartLocal,
}

impl From<StartMode> for ScriptName {
    fn from(value: StartMode) -> Self {
        match value {
            StartMode::Start => ScriptName::Start,
            StartMode::StartLocal => ScriptName::StartLocal,
        }
    }
}

#[derive(Subcommand, Debug)]
pub(crate) enum ScriptCommand {
    /// Starts an experiment and follows it until it finishes.
    ///
    /// Interrupting the command stops the experiment.
    Run {
        /// Id of the device to run the experiment on.
        #[arg(short, long)]
        device_id: String,
        /// Software name used by the experiment.
        #[arg(short, long)]
        software: Option<String>,
        #[arg(long, value_enum, default_value = "start")]
        command: StartMode,
        /// Experiment parameters as a JSON object.
        #[arg(short, long, default_value = "{}")]
        params: String,
        /// Seconds between two experiment status polls.
        #[arg(short, long, default_value_t = 2)]
        interval: u64,
    },
}

impl ScriptCommand {
    pub(crate) async fn execute(self, client: LabClient, cache: QueryCache, format: Formats) -> anyhow::Result<()> {
        match self {
            ScriptCommand::Run {
                device_id,
                software,
                command,
                params,
                interval,
            } => {
                let parameters: serde_json::Value = serde_json::from_str(&params)?;
                let dashboard = DashboardScreen::new(client, cache);

                let device_id = Id::new(device_id);
                let devices = dashboard.load().await?;
                let device = devices
                    .iter()
                    .find(|d| d.id == device_id)
                    .ok_or_else(|| anyhow::anyhow!("device {} not found", device_id.inner()))?;
                let config = device_config(device, software.as_deref());

                let started = dashboard.submit(command.into(), config.clone(), parameters).await?;
                if let ScriptOutcome::Started(run) = started {
                    println!("{}", format.serialize(&run)?);
                }

                let follow_fut = follow(&dashboard, Duration::from_secs(interval.max(1)), format);
                pin_mut!(follow_fut);
                let exit_fut = tokio::signal::ctrl_c();
                pin_mut!(exit_fut);

                match futures::future::select(exit_fut, follow_fut).await {
                    Either::Left((interrupted, _)) => {
                        interrupted?;
                        eprintln!("\nInterrupted, stopping the experiment.");
                        let outcome = dashboard
                            .submit(ScriptName::Stop, config, serde_json::json!({}))
                            .await?;
                        if let ScriptOutcome::Stopped(output) = outcome {
                            println!("{}", format.serialize(&output)?);
                        }
                        Ok(())
                    }
                    Either::Right((finished, _)) => {
                        let detail = finished?;
                        tracing::info!(status = ?detail.and_then(|d| d.status), "experiment ended");
                        Ok(())
                    }
                }
            }
        }
    }
}

/// Polls the experiment of the dashboard until it reaches a terminal status or disappears.
async fn follow(
    dashboard: &DashboardScreen<LabClient>,
    interval: Duration,
    format: Formats,
) -> anyhow::Result<Option<ExperimentDetail>> {
    loop {
        tokio::time::sleep(interval).await;

        let Some(detail) = dashboard.experiment_details().await? else {
            tracing::warn!("experiment is no longer known to the server");
            return Ok(None);
        };
        println!("{}", format.serialize(&detail)?);

        if detail.status.is_some_and(|s| s.is_terminal()) {
            return Ok(Some(detail));
        }
    }
}
