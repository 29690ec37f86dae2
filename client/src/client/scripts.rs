use cynic::MutationBuilder;
use validator::Validate;

use super::LabClient;
use crate::{
    api::{internal::*, operations, types::*, *},
    errors::ValidationErrorKind,
};

#[async_trait::async_trait]
impl LabScriptClient for LabClient {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn run_script(&self, input: RunScriptInput) -> Result<ScriptRun> {
        input.validate()?;
        let data = self
            .execute(
                &operations::RUN_SCRIPT,
                MutateRunScript::build(RunScriptVariables { input: Some(input) }),
            )
            .await?;

        data.run_script
            .ok_or_else(|| ValidationErrorKind::Other("script run returned no experiment".into()).into())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn change_script(&self, input: RunScriptInput) -> Result<ScriptOutput> {
        input.validate()?;
        let data = self
            .execute(
                &operations::CHANGE_SCRIPT,
                MutateChangeScript::build(RunScriptVariables { input: Some(input) }),
            )
            .await?;

        data.change_script.ok_or_else(|| ValidationErrorKind::NoData.into())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn stop_script(&self, input: RunScriptInput) -> Result<ScriptOutput> {
        input.validate()?;
        let data = self
            .execute(
                &operations::STOP_SCRIPT,
                MutateStopScript::build(RunScriptVariables { input: Some(input) }),
            )
            .await?;

        data.stop_script.ok_or_else(|| ValidationErrorKind::NoData.into())
    }
}
