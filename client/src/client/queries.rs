use cynic::QueryBuilder;

use super::LabClient;
use crate::{
    api::{internal::*, operations, types::*, *},
    errors::ValidationErrorKind,
};

#[async_trait::async_trait]
impl LabQueryClient for LabClient {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn query_devices(&self) -> Result<Vec<Device>> {
        let data = self.execute(&operations::GET_DEVICES, QueryDevices::build(())).await?;

        Ok(data.devices.map(|page| page.data).unwrap_or_default())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn query_device(&self, id: &Id) -> Result<Device> {
        let data = self
            .execute(&operations::GET_DEVICE, QueryDevice::build(DeviceIdVariables { id: id.clone() }))
            .await?;

        Ok(data.get_device)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn query_device_reservation(&self, id: &Id) -> Result<DeviceReservation> {
        let data = self
            .execute(
                &operations::GET_DEVICE_RESERVATION,
                QueryDeviceReservation::build(DeviceIdVariables { id: id.clone() }),
            )
            .await?;

        Ok(data.get_device)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn query_device_types(&self) -> Result<Vec<DeviceType>> {
        let data = self
            .execute(&operations::GET_DEVICE_TYPES, QueryDeviceTypes::build(()))
            .await?;

        Ok(data.device_types.map(|page| page.data).unwrap_or_default())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn query_software(&self) -> Result<Vec<Software>> {
        let data = self.execute(&operations::GET_SOFTWARE, QuerySoftware::build(())).await?;

        Ok(data.software.map(|page| page.data).unwrap_or_default())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn query_script_config(&self, selector: ScriptConfigInput) -> Result<Vec<ScriptConfig>> {
        let data = self
            .execute(
                &operations::GET_SCRIPT_CONFIG,
                QueryScriptConfig::build(ScriptConfigVariables {
                    config_input: Some(selector),
                }),
            )
            .await?;

        Ok(data
            .config
            .and_then(|config| config.items)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .collect())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn query_experiment_details(&self, experiment_id: &Id) -> Result<Option<ExperimentDetail>> {
        let data = self
            .execute(
                &operations::GET_EXPERIMENT_DETAILS,
                QueryExperimentDetails::build(ExperimentVariables {
                    id: Some(experiment_id.clone()),
                }),
            )
            .await?;

        Ok(data.experiment_details)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn query_camera_status(&self) -> Result<CameraStatus> {
        let data = self
            .execute(&operations::GET_CAMERA_STATUS, QueryCameraStatus::build(()))
            .await?;

        Ok(data.camera_status)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn query_video_stream_status(&self) -> Result<VideoStreamStatus> {
        let data = self
            .execute(&operations::GET_VIDEO_STREAM_STATUS, QueryVideoStreamStatus::build(()))
            .await?;

        Ok(data.video_stream_status)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn query_me(&self) -> Result<Option<User>> {
        let data = self.execute(&operations::GET_ME, QueryMe::build(())).await?;

        Ok(data.me)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn query_user(&self, id: &Id) -> Result<Option<User>> {
        if id.inner().trim().is_empty() {
            return Err(ValidationErrorKind::Other("user id must not be empty".into()).into());
        }

        let data = self
            .execute(&operations::GET_USER, QueryUser::build(UserVariables { id: Some(id.clone()) }))
            .await?;

        Ok(data.user)
    }
}
