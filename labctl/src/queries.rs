use clap::Subcommand;
use labdash_client::{
    LabClient,
    api::{LabQueryClient, types::*},
    orchestration::{
        DashboardScreen, DeviceDetailScreen, DeviceScreen, DeviceTypeScreen, QueryCache, SessionScreen,
        SoftwareScreen,
    },
};

use crate::Formats;

#[derive(Subcommand, Debug)]
pub(crate) enum QueryTarget {
    /// Lists all devices with their device type and software.
    Devices,
    /// Gets a single device and its reservation status.
    Device { id: String },
    /// Lists all software.
    Software,
    /// Lists all device types.
    DeviceTypes,
    /// Gets the experiment form of a device type and software.
    ScriptConfig {
        /// Device type name.
        #[arg(short, long)]
        device_name: String,
        /// Software name.
        #[arg(short, long)]
        software: String,
    },
    /// Gets the status and measured data of an experiment.
    Experiment { id: String },
    /// Gets the camera status.
    Camera,
    /// Gets the video stream status.
    Video,
    /// Gets the currently authenticated user.
    Me,
    /// Gets a user by id.
    User { id: String },
}

impl QueryTarget {
    pub(crate) async fn execute(self, client: LabClient, cache: QueryCache, format: Formats) -> anyhow::Result<String> {
        match self {
            QueryTarget::Devices => {
                let screen = DeviceScreen::new(client, cache);
                screen.load().await?;
                format.serialize(screen.view().rows)
            }
            QueryTarget::Device { id } => {
                let screen = DeviceDetailScreen::new(client, cache, Id::new(id));
                screen.load().await?;
                let view = screen.view();
                format.serialize(serde_json::json!({
                    "device": view.device,
                    "reserved": view.reserved,
                }))
            }
            QueryTarget::Software => {
                let screen = SoftwareScreen::new(client, cache);
                screen.load().await?;
                format.serialize(screen.view().rows)
            }
            QueryTarget::DeviceTypes => {
                let screen = DeviceTypeScreen::new(client, cache);
                screen.load().await?;
                format.serialize(screen.view().rows)
            }
            QueryTarget::ScriptConfig { device_name, software } => {
                let screen = DashboardScreen::new(client, cache);
                let config = screen
                    .script_config(ScriptConfigInput {
                        device_name: Some(device_name),
                        software: Some(software),
                    })
                    .await?;
                format.serialize(config)
            }
            QueryTarget::Experiment { id } => {
                format.serialize(client.query_experiment_details(&Id::new(id)).await?)
            }
            QueryTarget::Camera => format.serialize(client.query_camera_status().await?),
            QueryTarget::Video => format.serialize(client.query_video_stream_status().await?),
            QueryTarget::Me => {
                let session = SessionScreen::new(client, cache);
                format.serialize(session.restore().await?)
            }
            QueryTarget::User { id } => format.serialize(client.query_user(&Id::new(id)).await?),
        }
    }
}
