use clap::{Args, Subcommand};
use labdash_client::{
    LabClient,
    api::types::*,
    orchestration::{
        DashboardScreen, DeviceDetailScreen, DeviceRow, DeviceScreen, DeviceTypeScreen, QueryCache, SoftwareScreen,
    },
};

use crate::Formats;

#[derive(Debug, Clone, Args)]
pub(crate) struct DeviceArgs {
    /// Device name.
    #[arg(short, long)]
    name: String,
    /// Serial port the device is attached to.
    #[arg(short, long)]
    port: String,
    /// Id of the device type.
    #[arg(short = 't', long)]
    device_type: String,
    /// Ids of the installed software.
    #[arg(short, long, value_delimiter = ',')]
    software: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum DeviceAction {
    /// Creates a new device.
    Create(DeviceArgs),
    /// Updates an existing device.
    Update {
        id: String,
        #[clap(flatten)]
        device: DeviceArgs,
    },
    /// Removes a device.
    Remove { id: String },
    /// Reserves or releases a device.
    Reserve {
        id: String,
        /// Releases the reservation instead.
        #[arg(long)]
        release: bool,
    },
}

impl DeviceAction {
    pub(crate) async fn execute(self, client: LabClient, cache: QueryCache, format: Formats) -> anyhow::Result<String> {
        match self {
            DeviceAction::Create(args) => {
                let screen = DeviceScreen::new(client, cache);
                let device = screen
                    .submit(CreateDeviceInput {
                        device_type_id: Id::new(args.device_type),
                        name: args.name,
                        port: args.port,
                        software: args.software.into_iter().map(Id::new).collect(),
                        status: None,
                    })
                    .await?;
                format.serialize(DeviceRow::from(&device))
            }
            DeviceAction::Update { id, device: args } => {
                let screen = DeviceScreen::new(client, cache);
                let device = screen
                    .edit(UpdateDeviceInput {
                        id: Id::new(id),
                        device_type: Id::new(args.device_type),
                        name: args.name,
                        port: args.port,
                        software: args.software.into_iter().map(Id::new).collect(),
                    })
                    .await?;
                format.serialize(DeviceRow::from(&device))
            }
            DeviceAction::Remove { id } => {
                let screen = DeviceScreen::new(client, cache);
                let device = screen.remove(&Id::new(id)).await?;
                format.serialize(DeviceRow::from(&device))
            }
            DeviceAction::Reserve { id, release } => {
                let screen = DeviceDetailScreen::new(client, cache, Id::new(id));
                let updated = screen.set_reserved(!release).await?;
                format.serialize(serde_json::json!({
                    "id": screen.id(),
                    "reserved": !release,
                    "updated": updated,
                }))
            }
        }
    }
}

#[derive(Subcommand, Debug)]
pub(crate) enum SoftwareAction {
    /// Creates new software.
    Create { name: String },
    /// Renames software.
    Update { id: String, name: String },
    /// Removes software that no device uses.
    Remove { id: String },
}

impl SoftwareAction {
    pub(crate) async fn execute(self, client: LabClient, cache: QueryCache, format: Formats) -> anyhow::Result<String> {
        let screen = SoftwareScreen::new(client, cache);
        match self {
            SoftwareAction::Create { name } => format.serialize(screen.submit(CreateSoftwareInput { name }).await?),
            SoftwareAction::Update { id, name } => format.serialize(
                screen
                    .edit(UpdateSoftwareInput {
                        id: Id::new(id),
                        name,
                    })
                    .await?,
            ),
            SoftwareAction::Remove { id } => format.serialize(screen.remove(&Id::new(id)).await?),
        }
    }
}

#[derive(Subcommand, Debug)]
pub(crate) enum DeviceTypeAction {
    /// Creates a new device type.
    Create { name: String },
    /// Renames a device type.
    Update { id: String, name: String },
    /// Removes a device type that no device uses.
    Remove { id: String },
}

impl DeviceTypeAction {
    pub(crate) async fn execute(self, client: LabClient, cache: QueryCache, format: Formats) -> anyhow::Result<String> {
        let screen = DeviceTypeScreen::new(client, cache);
        match self {
            DeviceTypeAction::Create { name } => {
                format.serialize(screen.submit(CreateDeviceTypeInput { name }).await?)
            }
            DeviceTypeAction::Update { id, name } => format.serialize(
                screen
                    .edit(UpdateDeviceTypeInput {
                        id: Id::new(id),
                        name,
                    })
                    .await?,
            ),
            DeviceTypeAction::Remove { id } => format.serialize(screen.remove(&Id::new(id)).await?),
        }
    }
}

#[derive(Subcommand, Debug)]
pub(crate) enum VideoAction {
    /// Starts the camera video stream.
    Start,
    /// Stops the camera video stream.
    Stop,
}

impl VideoAction {
    pub(crate) async fn execute(self, client: LabClient, cache: QueryCache, format: Formats) -> anyhow::Result<String> {
        let dashboard = DashboardScreen::new(client, cache);
        let status = match self {
            VideoAction::Start => dashboard.start_video_stream().await?,
            VideoAction::Stop => dashboard.stop_video_stream().await?,
        };
        format.serialize(status)
    }
}
