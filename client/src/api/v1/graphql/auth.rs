use super::schema;

#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct User {
    pub id: Option<cynic::Id>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Tokens issued by the authentication collaborator.
///
/// Tokens are opaque to the client.
#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct AuthPayload {
    #[cynic(rename = "access_token")]
    pub access_token: Option<String>,
    #[cynic(rename = "refresh_token")]
    pub refresh_token: Option<String>,
    #[cynic(rename = "expires_in")]
    pub expires_in: Option<i32>,
    #[cynic(rename = "token_type")]
    pub token_type: Option<String>,
    pub user: Option<User>,
}

#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct RefreshTokenPayload {
    #[cynic(rename = "access_token")]
    pub access_token: String,
    #[cynic(rename = "refresh_token")]
    pub refresh_token: String,
    #[cynic(rename = "expires_in")]
    pub expires_in: i32,
    #[cynic(rename = "token_type")]
    pub token_type: String,
}

#[derive(cynic::QueryFragment, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct LogoutResponse {
    pub status: String,
    pub message: Option<String>,
}

#[derive(cynic::InputObject, Debug, Clone, PartialEq, Eq, validator::Validate)]
pub struct LoginInput {
    #[validate(length(min = 1))]
    pub username: String,
    pub password: String,
}

#[derive(cynic::InputObject, Debug, Clone, PartialEq, Eq, validator::Validate)]
pub struct SocialLoginInput {
    #[validate(length(min = 1))]
    pub provider: String,
    #[validate(length(min = 1))]
    pub token: String,
}

#[derive(cynic::InputObject, Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenInput {
    #[cynic(rename = "refresh_token")]
    pub refresh_token: Option<String>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct LoginVariables {
    pub login: Option<LoginInput>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct SocialLoginVariables {
    pub input: SocialLoginInput,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct RefreshTokenVariables {
    pub input: Option<RefreshTokenInput>,
}

#[derive(cynic::QueryVariables, Debug)]
pub struct UserVariables {
    pub id: Option<cynic::Id>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "LoginVariables")]
pub struct MutateLogin {
    #[arguments(input: $login)]
    pub login: AuthPayload,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "SocialLoginVariables")]
pub struct MutateSocialLogin {
    #[arguments(input: $input)]
    pub social_login: AuthPayload,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation", variables = "RefreshTokenVariables")]
pub struct MutateRefreshToken {
    #[arguments(input: $input)]
    pub refresh_token: RefreshTokenPayload,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Mutation")]
pub struct MutateLogout {
    pub logout: LogoutResponse,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query")]
pub struct QueryMe {
    pub me: Option<User>,
}

#[derive(cynic::QueryFragment, Debug)]
#[cynic(graphql_type = "Query", variables = "UserVariables")]
pub struct QueryUser {
    #[arguments(id: $id)]
    pub user: Option<User>,
}
