use validator::Validate;

use super::{ExperimentStatus, ScriptName, schema, validate_id};

/// Outcome of a `RunScript` mutation.
///
/// The `experiment_id` correlates subsequent `ChangeScript` and `StopScript` calls.
#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cynic(graphql_type = "OutputScript")]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ScriptRun {
    pub status: Option<String>,
    #[cynic(rename = "experimentID")]
    pub experiment_id: cynic::Id,
    #[cynic(rename = "errorMessage")]
    pub error_message: String,
}

/// Outcome of a `ChangeScript` or `StopScript` mutation.
#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cynic(graphql_type = "OutputScript")]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ScriptOutput {
    pub status: Option<String>,
    #[cynic(rename = "errorMessage")]
    pub error_message: String,
}

#[derive(cynic::InputObject, Debug, Clone, PartialEq, Eq, validator::Validate)]
#[cynic(graphql_type = "DeviceConfig")]
pub struct DeviceConfigInput {
    #[cynic(rename = "deviceID")]
    #[validate(custom(function = "validate_id"))]
    pub device_id: cynic::Id,
    #[cynic(rename = "deviceName")]
    pub device_name: Option<String>,
    pub software: Option<String>,
}

#[derive(cynic::InputObject, Debug, Clone, Default, PartialEq, Eq, validator::Validate)]
pub struct RunScriptInput {
    #[validate(nested)]
    pub device: Option<DeviceConfigInput>,
    #[cynic(rename = "experimentID")]
    pub experiment_id: Option<cynic::Id>,
    #[cynic(rename = "fileName")]
    pub file_name: Option<String>,
    #[cynic(rename = "inputParameter")]
    pub input_parameter: Option<String>,
    #[cynic(rename = "scriptName")]
    pub script_name: Option<String>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct RunScriptVariables {
    pub input: Option<RunScriptInput>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "RunScriptVariables")]
pub struct MutateRunScript {
    #[arguments(runScriptInput: $input)]
    #[cynic(rename = "RunScript")]
    pub run_script: Option<ScriptRun>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "RunScriptVariables")]
pub struct MutateChangeScript {
    #[arguments(runScriptInput: $input)]
    #[cynic(rename = "ChangeScript")]
    pub change_script: Option<ScriptOutput>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "RunScriptVariables")]
pub struct MutateStopScript {
    #[arguments(runScriptInput: $input)]
    #[cynic(rename = "StopScript")]
    pub stop_script: Option<ScriptOutput>,
}

#[derive(cynic::QueryFragment, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ArrayOfData {
    pub name: String,
    pub data: Vec<Option<f64>>,
}

#[derive(cynic::QueryFragment, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ExperimentDetail {
    pub url: Option<String>,
    pub status: Option<ExperimentStatus>,
    pub values: Vec<Option<ArrayOfData>>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct ExperimentVariables {
    pub id: Option<cynic::Id>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "ExperimentVariables")]
pub struct QueryExperimentDetails {
    #[arguments(experimentID: $id)]
    pub experiment_details: Option<ExperimentDetail>,
}

#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cynic(graphql_type = "SyncServerSelectOptions")]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct SelectOption {
    pub name: String,
    pub value: i32,
}

/// Single input field of an experiment form.
#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ConfigItem {
    pub name: Option<String>,
    pub rules: Option<String>,
    #[cynic(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub placeholder: Option<String>,
    pub options: Option<Vec<Option<SelectOption>>>,
}

/// Form fields of a single script command.
#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cynic(graphql_type = "ConfigMapTuple")]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ScriptConfig {
    #[cynic(rename = "scriptName")]
    pub script_name: Option<ScriptName>,
    pub items: Option<Vec<Option<ConfigItem>>>,
}

#[derive(cynic::QueryFragment, Debug)]
pub struct Config {
    pub items: Option<Vec<Option<ScriptConfig>>>,
}

#[derive(cynic::InputObject, Debug, Clone, Default, PartialEq, Eq)]
#[cynic(graphql_type = "ConfigInput")]
pub struct ScriptConfigInput {
    #[cynic(rename = "deviceName")]
    pub device_name: Option<String>,
    pub software: Option<String>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct ScriptConfigVariables {
    pub config_input: Option<ScriptConfigInput>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "ScriptConfigVariables")]
pub struct QueryScriptConfig {
    #[arguments(configInput: $config_input)]
    #[cynic(rename = "GetConfigByDeviceType")]
    pub config: Option<Config>,
}
