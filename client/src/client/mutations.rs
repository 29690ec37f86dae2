use cynic::MutationBuilder;
use validator::Validate;

use super::LabClient;
use crate::api::{internal::*, operations, types::*, *};

#[async_trait::async_trait]
impl LabMutationClient for LabClient {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn create_device(&self, input: CreateDeviceInput) -> Result<Device> {
        input.validate()?;
        let data = self
            .execute(
                &operations::CREATE_DEVICE,
                MutateCreateDevice::build(CreateDeviceVariables { input: Some(input) }),
            )
            .await?;

        Ok(data.create_device)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn update_device(&self, input: UpdateDeviceInput) -> Result<Device> {
        input.validate()?;
        let data = self
            .execute(
                &operations::UPDATE_DEVICE,
                MutateUpdateDevice::build(UpdateDeviceVariables { input: Some(input) }),
            )
            .await?;

        Ok(data.update_device)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn remove_device(&self, id: &Id) -> Result<Device> {
        ensure_valid_id(id)?;
        let data = self
            .execute(
                &operations::REMOVE_DEVICE,
                MutateRemoveDevice::build(DeviceIdVariables { id: id.clone() }),
            )
            .await?;

        Ok(data.remove_device)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn update_device_reservation(&self, input: DeviceReservationInput) -> Result<u32> {
        input.validate()?;
        let data = self
            .execute(
                &operations::UPDATE_DEVICE_RESERVATION,
                MutateDeviceReservation::build(DeviceReservationVariables { input: Some(input) }),
            )
            .await?;

        Ok(data.update_device_reservation_status.updated_devices_count.max(0) as u32)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn create_software(&self, input: CreateSoftwareInput) -> Result<Software> {
        input.validate()?;
        let data = self
            .execute(
                &operations::CREATE_SOFTWARE,
                MutateCreateSoftware::build(CreateSoftwareVariables { input: Some(input) }),
            )
            .await?;

        Ok(data.create_software)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn update_software(&self, input: UpdateSoftwareInput) -> Result<Software> {
        input.validate()?;
        let data = self
            .execute(
                &operations::UPDATE_SOFTWARE,
                MutateUpdateSoftware::build(UpdateSoftwareVariables { input: Some(input) }),
            )
            .await?;

        Ok(data.update_software)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn remove_software(&self, id: &Id) -> Result<Software> {
        ensure_valid_id(id)?;
        let data = self
            .execute(
                &operations::REMOVE_SOFTWARE,
                MutateRemoveSoftware::build(RemoveVariables { input: id.clone() }),
            )
            .await?;

        Ok(data.remove_software)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn create_device_type(&self, input: CreateDeviceTypeInput) -> Result<DeviceType> {
        input.validate()?;
        let data = self
            .execute(
                &operations::CREATE_DEVICE_TYPE,
                MutateCreateDeviceType::build(CreateDeviceTypeVariables { input: Some(input) }),
            )
            .await?;

        Ok(data.create_device_type)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn update_device_type(&self, input: UpdateDeviceTypeInput) -> Result<DeviceType> {
        input.validate()?;
        let data = self
            .execute(
                &operations::UPDATE_DEVICE_TYPE,
                MutateUpdateDeviceType::build(UpdateDeviceTypeVariables { input: Some(input) }),
            )
            .await?;

        Ok(data.update_device_type)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn remove_device_type(&self, id: &Id) -> Result<DeviceType> {
        ensure_valid_id(id)?;
        let data = self
            .execute(
                &operations::REMOVE_DEVICE_TYPE,
                MutateRemoveDeviceType::build(RemoveVariables { input: id.clone() }),
            )
            .await?;

        Ok(data.remove_device_type)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn start_video_stream(&self) -> Result<VideoStreamStarted> {
        let data = self
            .execute(&operations::START_VIDEO_STREAM, MutateStartVideoStream::build(()))
            .await?;

        Ok(data.start_video_stream)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn stop_video_stream(&self) -> Result<StopVideoStreamStatus> {
        let data = self
            .execute(&operations::STOP_VIDEO_STREAM, MutateStopVideoStream::build(()))
            .await?;

        Ok(data.stop_video_stream)
    }
}
