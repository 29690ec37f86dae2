use super::{
    DeviceStatus,
    catalog::{DeviceType, Software},
    schema, validate_id,
};

/// Device as displayed by the dashboard, joined with its type and installed software.
#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Device {
    pub id: cynic::Id,
    pub name: String,
    pub port: String,
    #[cynic(rename = "deviceType")]
    pub device_type: DeviceType,
    pub software: Vec<Software>,
}

#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cynic(graphql_type = "Device")]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct DeviceReservation {
    pub id: cynic::Id,
    #[cynic(rename = "is_reserved")]
    pub is_reserved: bool,
}

#[derive(cynic::QueryFragment, Debug)]
pub struct DevicePaginator {
    pub data: Vec<Device>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query")]
pub struct QueryDevices {
    pub devices: Option<DevicePaginator>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct DeviceIdVariables {
    pub id: cynic::Id,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "DeviceIdVariables")]
pub struct QueryDevice {
    #[arguments(id: $id)]
    pub get_device: Device,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "DeviceIdVariables")]
pub struct QueryDeviceReservation {
    #[arguments(id: $id)]
    pub get_device: DeviceReservation,
}

#[derive(cynic::InputObject, Debug, Clone, PartialEq, Eq, validator::Validate)]
#[cynic(graphql_type = "CreateDevice")]
pub struct CreateDeviceInput {
    #[cynic(rename = "device_type_id")]
    #[validate(custom(function = "validate_id"))]
    pub device_type_id: cynic::Id,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub port: String,
    pub software: Vec<cynic::Id>,
    pub status: Option<DeviceStatus>,
}

#[derive(cynic::InputObject, Debug, Clone, PartialEq, Eq, validator::Validate)]
#[cynic(graphql_type = "UpdateDevice")]
pub struct UpdateDeviceInput {
    #[validate(custom(function = "validate_id"))]
    pub id: cynic::Id,
    #[cynic(rename = "deviceType")]
    #[validate(custom(function = "validate_id"))]
    pub device_type: cynic::Id,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub port: String,
    pub software: Vec<cynic::Id>,
}

#[derive(cynic::InputObject, Debug, Clone, PartialEq, Eq, validator::Validate)]
#[cynic(graphql_type = "DeviceReservationStatusInput")]
pub struct DeviceReservationInput {
    #[cynic(rename = "deviceID")]
    #[validate(custom(function = "validate_id"))]
    pub device_id: cynic::Id,
    #[cynic(rename = "isReserved")]
    pub is_reserved: bool,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct CreateDeviceVariables {
    pub input: Option<CreateDeviceInput>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct UpdateDeviceVariables {
    pub input: Option<UpdateDeviceInput>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct DeviceReservationVariables {
    pub input: Option<DeviceReservationInput>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "CreateDeviceVariables")]
pub struct MutateCreateDevice {
    #[arguments(input: $input)]
    pub create_device: Device,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "UpdateDeviceVariables")]
pub struct MutateUpdateDevice {
    #[arguments(input: $input)]
    pub update_device: Device,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "DeviceIdVariables")]
pub struct MutateRemoveDevice {
    #[arguments(id: $id)]
    pub remove_device: Device,
}

#[derive(cynic::QueryFragment, Debug)]
pub struct UpdateDeviceReservationStatusResult {
    #[cynic(rename = "updatedDevicesCount")]
    pub updated_devices_count: i32,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "DeviceReservationVariables")]
pub struct MutateDeviceReservation {
    #[arguments(deviceReservationStatusInput: $input)]
    #[cynic(rename = "updateDeviceReservationStatus")]
    pub update_device_reservation_status: UpdateDeviceReservationStatusResult,
}
