pub mod auth;
pub mod catalog;
pub mod devices;
pub mod media;
pub mod scripts;

#[cynic::schema("laboratory")]
pub(crate) mod schema {}

#[derive(cynic::Enum, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceStatus {
    #[cynic(rename = "offline")]
    Offline,
    #[cynic(rename = "online")]
    Online,
}

#[derive(cynic::Enum, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExperimentStatus {
    #[cynic(rename = "failed")]
    Failed,
    #[cynic(rename = "finished")]
    Finished,
    #[cynic(rename = "running")]
    Running,
}

impl ExperimentStatus {
    /// Indicates whether the experiment will not produce any more data.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExperimentStatus::Failed | ExperimentStatus::Finished)
    }
}

#[derive(cynic::Enum, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScriptName {
    #[cynic(rename = "change")]
    Change,
    #[cynic(rename = "start")]
    Start,
    #[cynic(rename = "startLocal")]
    StartLocal,
    #[cynic(rename = "stop")]
    Stop,
    #[cynic(rename = "update")]
    Update,
}

impl ScriptName {
    /// Name of the script as expected in the `scriptName` input field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptName::Change => "change",
            ScriptName::Start => "start",
            ScriptName::StartLocal => "startLocal",
            ScriptName::Stop => "stop",
            ScriptName::Update => "update",
        }
    }
}

impl std::fmt::Display for ScriptName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn validate_id(id: &cynic::Id) -> Result<(), validator::ValidationError> {
    if id.inner().trim().is_empty() {
        return Err(validator::ValidationError::new("empty_id"));
    }
    Ok(())
}

/// Checks an identifier passed as a bare operation argument.
pub(crate) fn ensure_valid_id(id: &cynic::Id) -> Result<(), validator::ValidationErrors> {
    validate_id(id).map_err(|error| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("id", error);
        errors
    })
}
