use crate::{
    api::{
        LabAuthClient, LabQueryClient, operations,
        types::{LoginInput, SocialLoginInput, User},
    },
    errors::{ErrorKind, SharedError},
    orchestration::{
        ActionResult, ActionState,
        cache::{CacheKey, QueryCache},
        state::{ActionSlot, Mount},
    },
};

/// View model of the authentication session.
#[derive(Clone, Debug, Default)]
pub struct SessionView {
    pub authenticated: bool,
    pub user: Option<User>,
    pub pending: bool,
    pub error: Option<SharedError>,
}

/// Login, logout and token refresh.
///
/// Tokens are held by the client and attached to all later requests made through it. The
/// authenticated user is kept apart from the action state, so a failed action leaves it in place.
pub struct SessionScreen<C> {
    client: C,
    cache: QueryCache,
    mount: Mount,
    session: ActionSlot<Option<User>>,
    user: parking_lot::RwLock<Option<User>>,
    refresh_token: parking_lot::RwLock<Option<String>>,
}

impl<C> SessionScreen<C>
where
    C: LabAuthClient + LabQueryClient + Send + Sync,
{
    pub fn new(client: C, cache: QueryCache) -> Self {
        Self {
            client,
            cache,
            mount: Mount::default(),
            session: ActionSlot::new("session"),
            user: Default::default(),
            refresh_token: Default::default(),
        }
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    /// Returns the session action to `Idle`. The held tokens and user are kept.
    pub fn reset(&self) {
        self.session.reset();
    }

    fn remember(&self, user: Option<User>) {
        if self.mount.is_mounted() {
            *self.user.write() = user;
        }
    }

    /// User of the current session, if any.
    pub fn user(&self) -> Option<User> {
        self.user.read().clone()
    }

    pub async fn login(&self, username: &str, password: &str) -> ActionResult<Option<User>> {
        let input = LoginInput {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.session
            .run(&self.mount, async {
                let payload = self.client.login(input).await?;
                self.cache.invalidate(&operations::LOGIN);
                *self.refresh_token.write() = payload.refresh_token;
                tracing::info!(user = ?payload.user.as_ref().and_then(|u| u.id.as_ref()), "logged in");
                self.remember(payload.user.clone());
                Ok(payload.user)
            })
            .await
    }

    pub async fn social_login(&self, provider: &str, token: &str) -> ActionResult<Option<User>> {
        let input = SocialLoginInput {
            provider: provider.to_string(),
            token: token.to_string(),
        };
        self.session
            .run(&self.mount, async {
                let payload = self.client.social_login(input).await?;
                self.cache.invalidate(&operations::SOCIAL_LOGIN);
                *self.refresh_token.write() = payload.refresh_token;
                self.remember(payload.user.clone());
                Ok(payload.user)
            })
            .await
    }

    /// Exchanges the refresh token of the last login for a new access token.
    ///
    /// The session user is not touched, whether the exchange succeeds or fails.
    pub async fn refresh(&self) -> ActionResult<Option<User>> {
        let Some(refresh_token) = self.refresh_token.read().clone() else {
            return Err(self.session.fail(
                &self.mount,
                ErrorKind::PreconditionError("no refresh token is available").into(),
            ));
        };

        self.session
            .run(&self.mount, async {
                let payload = self.client.refresh_token(Some(refresh_token)).await?;
                self.cache.invalidate(&operations::REFRESH_TOKEN);
                *self.refresh_token.write() = Some(payload.refresh_token);
                Ok(self.user())
            })
            .await
    }

    pub async fn logout(&self) -> ActionResult<Option<User>> {
        self.session
            .run(&self.mount, async {
                let response = self.client.logout().await?;
                self.cache.invalidate(&operations::LOGOUT);
                *self.refresh_token.write() = None;
                self.remember(None);
                tracing::info!(status = %response.status, "logged out");
                Ok(None)
            })
            .await
    }

    /// Restores the session from a token set on the client, e.g. one passed on the command line.
    pub async fn restore(&self) -> ActionResult<Option<User>> {
        let key = CacheKey::new(&operations::GET_ME);
        if let Some(user) = self.cache.get::<Option<User>>(&key) {
            self.remember(user.clone());
            self.session.set(&self.mount, ActionState::Success(user.clone()));
            return Ok(user);
        }

        self.session
            .run(&self.mount, async {
                let user = self.client.query_me().await?;
                self.cache.insert(key, user.clone());
                self.remember(user.clone());
                Ok(user)
            })
            .await
    }

    pub fn state(&self) -> ActionState<Option<User>> {
        self.session.get()
    }

    pub fn view(&self) -> SessionView {
        let state = self.session.get();
        SessionView {
            authenticated: self.client.access_token().is_some(),
            user: self.user(),
            pending: state.is_pending(),
            error: state.error().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        InjectedFailure, LabTestClient, LabTestState, TestAccount, api::types::Id, errors::FieldError,
        orchestration::DeviceScreen,
    };

    fn lab_state() -> LabTestState {
        LabTestState {
            accounts: vec![TestAccount {
                username: "u".into(),
                password: "p".into(),
                access_token: "tok123".into(),
                refresh_token: "ref123".into(),
                user: User {
                    id: Some(Id::new("1")),
                    name: Some("u".into()),
                    email: Some("u@x.com".into()),
                },
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn login_authenticates_and_attaches_token() -> anyhow::Result<()> {
        let client = LabTestClient::new(lab_state());
        let cache = QueryCache::new();
        let session = SessionScreen::new(client.clone(), cache.clone());
        assert!(!session.view().authenticated);

        session.login("u", "p").await?;
        let view = session.view();
        assert!(view.authenticated);
        assert_eq!(view.user.and_then(|u| u.id), Some(Id::new("1")));

        DeviceScreen::new(client.clone(), cache).load().await?;
        assert_eq!(client.tokens_seen().last(), Some(&Some("tok123".to_string())));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_fails_without_authenticating() -> anyhow::Result<()> {
        let client = LabTestClient::new(lab_state());
        let session = SessionScreen::new(client, QueryCache::new());

        let err = session.login("u", "wrong").await.unwrap_err();
        assert!(err.graphql_errors().is_some());

        let view = session.view();
        assert!(!view.authenticated);
        assert!(view.error.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_token_and_user() -> anyhow::Result<()> {
        let client = LabTestClient::new(lab_state());
        let session = SessionScreen::new(client.clone(), QueryCache::new());
        session.login("u", "p").await?;

        session.logout().await?;
        let view = session.view();
        assert!(!view.authenticated);
        assert!(view.user.is_none());
        assert!(client.access_token().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn refresh_requires_prior_login() -> anyhow::Result<()> {
        let client = LabTestClient::new(lab_state());
        let session = SessionScreen::new(client.clone(), QueryCache::new());

        let err = session.refresh().await.unwrap_err();
        assert!(err.is_precondition());
        assert_eq!(client.request_count(&operations::REFRESH_TOKEN), 0);

        session.login("u", "p").await?;
        let user = session.refresh().await?;
        assert_eq!(user.and_then(|u| u.name), Some("u".to_string()));
        assert_eq!(client.request_count(&operations::REFRESH_TOKEN), 1);
        Ok(())
    }

    #[tokio::test]
    async fn failed_refresh_keeps_user_and_later_refresh_succeeds() -> anyhow::Result<()> {
        let client = LabTestClient::new(lab_state());
        let session = SessionScreen::new(client.clone(), QueryCache::new());
        session.login("u", "p").await?;

        client.fail_operation(
            &operations::REFRESH_TOKEN,
            InjectedFailure::GraphQL(vec![FieldError::new("expired")]),
        );
        let err = session.refresh().await.unwrap_err();
        assert_eq!(err.graphql_errors().map(|e| e[0].message.as_str()), Some("expired"));

        let view = session.view();
        assert!(view.authenticated);
        assert_eq!(view.user.and_then(|u| u.id), Some(Id::new("1")));
        assert!(view.error.is_some());

        client.clear_failure(&operations::REFRESH_TOKEN);
        let user = session.refresh().await?;
        assert_eq!(user.and_then(|u| u.id), Some(Id::new("1")));
        assert!(session.state().is_success());
        Ok(())
    }

    #[tokio::test]
    async fn restore_uses_token_set_on_client() -> anyhow::Result<()> {
        let client = LabTestClient::new(lab_state());
        client.set_access_token(Some("tok123".into()));
        let session = SessionScreen::new(client.clone(), QueryCache::new());

        let user = session.restore().await?;
        assert_eq!(user.and_then(|u| u.email), Some("u@x.com".to_string()));
        assert!(session.view().authenticated);

        session.restore().await?;
        assert_eq!(client.request_count(&operations::GET_ME), 1);
        Ok(())
    }
}
