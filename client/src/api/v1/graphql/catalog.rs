use super::{schema, validate_id};

#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Software {
    pub id: cynic::Id,
    pub name: String,
}

#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct DeviceType {
    pub id: cynic::Id,
    pub name: String,
}

#[derive(cynic::QueryFragment, Debug)]
pub struct SoftwarePaginator {
    pub data: Vec<Software>,
}

#[derive(cynic::QueryFragment, Debug)]
pub struct DeviceTypePaginator {
    pub data: Vec<DeviceType>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query")]
pub struct QuerySoftware {
    pub software: Option<SoftwarePaginator>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query")]
pub struct QueryDeviceTypes {
    #[cynic(rename = "device_types")]
    pub device_types: Option<DeviceTypePaginator>,
}

/// Input shared by `createSoftware` and `createDeviceType`.
#[derive(cynic::InputObject, Debug, Clone, PartialEq, Eq, validator::Validate)]
#[cynic(graphql_type = "CreateSoftware")]
pub struct CreateSoftwareInput {
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(cynic::InputObject, Debug, Clone, PartialEq, Eq, validator::Validate)]
#[cynic(graphql_type = "UpdateSoftware")]
pub struct UpdateSoftwareInput {
    #[validate(custom(function = "validate_id"))]
    pub id: cynic::Id,
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(cynic::InputObject, Debug, Clone, PartialEq, Eq, validator::Validate)]
#[cynic(graphql_type = "CreateDeviceType")]
pub struct CreateDeviceTypeInput {
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(cynic::InputObject, Debug, Clone, PartialEq, Eq, validator::Validate)]
#[cynic(graphql_type = "UpdateDeviceType")]
pub struct UpdateDeviceTypeInput {
    #[validate(custom(function = "validate_id"))]
    pub id: cynic::Id,
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct CreateSoftwareVariables {
    pub input: Option<CreateSoftwareInput>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct UpdateSoftwareVariables {
    pub input: Option<UpdateSoftwareInput>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct CreateDeviceTypeVariables {
    pub input: Option<CreateDeviceTypeInput>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct UpdateDeviceTypeVariables {
    pub input: Option<UpdateDeviceTypeInput>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct RemoveVariables {
    pub input: cynic::Id,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "CreateSoftwareVariables")]
pub struct MutateCreateSoftware {
    #[arguments(input: $input)]
    pub create_software: Software,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "UpdateSoftwareVariables")]
pub struct MutateUpdateSoftware {
    #[arguments(input: $input)]
    pub update_software: Software,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "RemoveVariables")]
pub struct MutateRemoveSoftware {
    #[arguments(id: $input)]
    pub remove_software: Software,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "CreateDeviceTypeVariables")]
pub struct MutateCreateDeviceType {
    #[arguments(input: $input)]
    pub create_device_type: DeviceType,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "UpdateDeviceTypeVariables")]
pub struct MutateUpdateDeviceType {
    #[arguments(input: $input)]
    pub update_device_type: DeviceType,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "RemoveVariables")]
pub struct MutateRemoveDeviceType {
    #[arguments(id: $input)]
    pub remove_device_type: DeviceType,
}
