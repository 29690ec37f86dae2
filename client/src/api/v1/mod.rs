use crate::errors;

mod graphql;
pub mod operations;

pub mod types {
    pub use cynic::Id;

    pub use super::graphql::{
        DeviceStatus, ExperimentStatus, ScriptName,
        auth::{AuthPayload, LoginInput, LogoutResponse, RefreshTokenPayload, SocialLoginInput, User},
        catalog::{
            CreateDeviceTypeInput, CreateSoftwareInput, DeviceType, Software, UpdateDeviceTypeInput,
            UpdateSoftwareInput,
        },
        devices::{CreateDeviceInput, Device, DeviceReservation, DeviceReservationInput, UpdateDeviceInput},
        media::{CameraStatus, StopVideoStreamStatus, VideoStreamStarted, VideoStreamStatus},
        scripts::{
            ArrayOfData, ConfigItem, DeviceConfigInput, ExperimentDetail, RunScriptInput, ScriptConfig,
            ScriptConfigInput, ScriptOutput, ScriptRun, SelectOption,
        },
    };
}

/// Operation fragments and variables used by client implementations.
pub(crate) mod internal {
    pub(crate) use super::graphql::ensure_valid_id;
    pub use super::graphql::{
        auth::{
            LoginVariables, MutateLogin, MutateLogout, MutateRefreshToken, MutateSocialLogin, QueryMe, QueryUser,
            RefreshTokenInput, RefreshTokenVariables, SocialLoginVariables, UserVariables,
        },
        catalog::{
            CreateDeviceTypeVariables, CreateSoftwareVariables, MutateCreateDeviceType, MutateCreateSoftware,
            MutateRemoveDeviceType, MutateRemoveSoftware, MutateUpdateDeviceType, MutateUpdateSoftware,
            QueryDeviceTypes, QuerySoftware, RemoveVariables, UpdateDeviceTypeVariables, UpdateSoftwareVariables,
        },
        devices::{
            CreateDeviceVariables, DeviceIdVariables, DeviceReservationVariables, MutateCreateDevice,
            MutateDeviceReservation, MutateRemoveDevice, MutateUpdateDevice, QueryDevice, QueryDeviceReservation,
            QueryDevices, UpdateDeviceVariables,
        },
        media::{MutateStartVideoStream, MutateStopVideoStream, QueryCameraStatus, QueryVideoStreamStatus},
        scripts::{
            ExperimentVariables, MutateChangeScript, MutateRunScript, MutateStopScript, QueryExperimentDetails,
            QueryScriptConfig, RunScriptVariables, ScriptConfigVariables,
        },
    };
}

pub(crate) type Result<T> = std::result::Result<T, errors::LabClientError>;

/// Read-only operations of the laboratory API.
#[async_trait::async_trait]
pub trait LabQueryClient {
    /// Lists all devices together with their device type and installed software.
    async fn query_devices(&self) -> Result<Vec<types::Device>>;
    async fn query_device(&self, id: &types::Id) -> Result<types::Device>;
    async fn query_device_reservation(&self, id: &types::Id) -> Result<types::DeviceReservation>;
    async fn query_device_types(&self) -> Result<Vec<types::DeviceType>>;
    async fn query_software(&self) -> Result<Vec<types::Software>>;
    /// Gets the experiment form description for the given device and software.
    async fn query_script_config(&self, selector: types::ScriptConfigInput) -> Result<Vec<types::ScriptConfig>>;
    /// Gets the current state and measured data of an experiment.
    ///
    /// Returns `None` if the server does not know the experiment.
    async fn query_experiment_details(&self, experiment_id: &types::Id) -> Result<Option<types::ExperimentDetail>>;
    async fn query_camera_status(&self) -> Result<types::CameraStatus>;
    async fn query_video_stream_status(&self) -> Result<types::VideoStreamStatus>;
    /// Gets the currently authenticated user, if any.
    async fn query_me(&self) -> Result<Option<types::User>>;
    async fn query_user(&self, id: &types::Id) -> Result<Option<types::User>>;
}

/// Operations that create, change or remove devices, device types and software,
/// and control the camera video stream.
#[async_trait::async_trait]
pub trait LabMutationClient {
    async fn create_device(&self, input: types::CreateDeviceInput) -> Result<types::Device>;
    async fn update_device(&self, input: types::UpdateDeviceInput) -> Result<types::Device>;
    /// Removes a device and returns its last known state.
    async fn remove_device(&self, id: &types::Id) -> Result<types::Device>;
    /// Reserves or releases a device. Returns the number of updated devices.
    async fn update_device_reservation(&self, input: types::DeviceReservationInput) -> Result<u32>;
    async fn create_software(&self, input: types::CreateSoftwareInput) -> Result<types::Software>;
    async fn update_software(&self, input: types::UpdateSoftwareInput) -> Result<types::Software>;
    async fn remove_software(&self, id: &types::Id) -> Result<types::Software>;
    async fn create_device_type(&self, input: types::CreateDeviceTypeInput) -> Result<types::DeviceType>;
    async fn update_device_type(&self, input: types::UpdateDeviceTypeInput) -> Result<types::DeviceType>;
    async fn remove_device_type(&self, id: &types::Id) -> Result<types::DeviceType>;
    async fn start_video_stream(&self) -> Result<types::VideoStreamStarted>;
    async fn stop_video_stream(&self) -> Result<types::StopVideoStreamStatus>;
}

/// Operations that drive experiment scripts on devices.
#[async_trait::async_trait]
pub trait LabScriptClient {
    /// Starts a script run.
    ///
    /// The returned experiment identifier must be passed to [`change_script`](LabScriptClient::change_script)
    /// and [`stop_script`](LabScriptClient::stop_script) of the same run.
    async fn run_script(&self, input: types::RunScriptInput) -> Result<types::ScriptRun>;
    async fn change_script(&self, input: types::RunScriptInput) -> Result<types::ScriptOutput>;
    async fn stop_script(&self, input: types::RunScriptInput) -> Result<types::ScriptOutput>;
}

/// Operations of the authentication collaborator.
///
/// Tokens are opaque strings. Once an access token is set, it is attached to all subsequent requests.
#[async_trait::async_trait]
pub trait LabAuthClient {
    async fn login(&self, input: types::LoginInput) -> Result<types::AuthPayload>;
    async fn social_login(&self, input: types::SocialLoginInput) -> Result<types::AuthPayload>;
    async fn refresh_token(&self, refresh_token: Option<String>) -> Result<types::RefreshTokenPayload>;
    async fn logout(&self) -> Result<types::LogoutResponse>;
    /// Sets or clears the bearer token attached to subsequent requests.
    fn set_access_token(&self, token: Option<String>);
    fn access_token(&self) -> Option<String>;
}
