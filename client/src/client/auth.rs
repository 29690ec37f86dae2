use cynic::MutationBuilder;
use validator::Validate;

use super::LabClient;
use crate::api::{internal::*, operations, types::*, *};

#[async_trait::async_trait]
impl LabAuthClient for LabClient {
    #[tracing::instrument(level = "debug", skip_all, fields(username = %input.username))]
    async fn login(&self, input: LoginInput) -> Result<AuthPayload> {
        input.validate()?;
        let data = self
            .execute(&operations::LOGIN, MutateLogin::build(LoginVariables { login: Some(input) }))
            .await?;

        if let Some(token) = data.login.access_token.as_ref() {
            self.set_access_token(Some(token.clone()));
        }
        Ok(data.login)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(provider = %input.provider))]
    async fn social_login(&self, input: SocialLoginInput) -> Result<AuthPayload> {
        input.validate()?;
        let data = self
            .execute(
                &operations::SOCIAL_LOGIN,
                MutateSocialLogin::build(SocialLoginVariables { input }),
            )
            .await?;

        if let Some(token) = data.social_login.access_token.as_ref() {
            self.set_access_token(Some(token.clone()));
        }
        Ok(data.social_login)
    }

    #[tracing::instrument(level = "debug", skip_all)]
    async fn refresh_token(&self, refresh_token: Option<String>) -> Result<RefreshTokenPayload> {
        let data = self
            .execute(
                &operations::REFRESH_TOKEN,
                MutateRefreshToken::build(RefreshTokenVariables {
                    input: Some(RefreshTokenInput { refresh_token }),
                }),
            )
            .await?;

        self.set_access_token(Some(data.refresh_token.access_token.clone()));
        Ok(data.refresh_token)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn logout(&self) -> Result<LogoutResponse> {
        let data = self.execute(&operations::LOGOUT, MutateLogout::build(())).await?;

        self.set_access_token(None);
        Ok(data.logout)
    }

    fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write() = token;
    }

    fn access_token(&self) -> Option<String> {
        self.access_token.read().clone()
    }
}
