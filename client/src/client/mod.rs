mod auth;
mod mutations;
mod queries;
mod scripts;
#[cfg(any(test, feature = "testing"))]
mod testing;

use std::{fmt::Debug, sync::Arc, time::Duration};

use cynic::GraphQlResponse;
use reqwest::redirect::Policy as RedirectPolicy;
#[cfg(any(test, feature = "testing"))]
pub use testing::{InjectedFailure, LabTestClient, LabTestState, TestAccount};

use crate::{
    api::{VERSION, operations::OperationDescriptor},
    errors::{ErrorKind, FieldError, LabClientError, ValidationErrorKind},
};

/// Configuration for the [`LabClient`].
#[derive(Clone, Debug, PartialEq, Eq, smart_default::SmartDefault, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct LabClientConfig {
    /// General timeout for all requests.
    #[default(Duration::from_secs(10))]
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// Maximum number of HTTP redirects followed per request.
    #[default(3)]
    pub redirect_limit: usize,
    /// Overrides the default `User-Agent` header.
    #[default(None)]
    pub user_agent: Option<String>,
}

mod duration_secs {
    use std::time::Duration;

    pub fn serialize<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        <u64 as serde::Deserialize>::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Client implementation of the laboratory dashboard API.
///
/// The client implements the following API traits:
/// - [`LabQueryClient`](crate::api::LabQueryClient)
/// - [`LabMutationClient`](crate::api::LabMutationClient)
/// - [`LabScriptClient`](crate::api::LabScriptClient)
/// - [`LabAuthClient`](crate::api::LabAuthClient)
///
/// Every operation is executed through the same generic path: the operation is serialized
/// as `{query, variables, operationName}`, POSTed to `<base_url>/graphql` and the
/// `{data, errors}` response is decoded into the operation's typed result.
#[derive(Clone, Debug)]
pub struct LabClient {
    base_url: url::Url,
    cfg: LabClientConfig,
    http: reqwest::Client,
    access_token: Arc<parking_lot::RwLock<Option<String>>>,
}

impl LabClient {
    /// Creates a new instance given the API base URL and configuration.
    pub fn new(base_url: url::Url, cfg: LabClientConfig) -> Result<Self, LabClientError> {
        let http = Self::build_reqwest_client(&cfg)?;
        Ok(Self {
            base_url,
            cfg,
            http,
            access_token: Default::default(),
        })
    }

    /// Returns the client's base URL.
    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    /// Returns the client's configuration.
    pub fn config(&self) -> &LabClientConfig {
        &self.cfg
    }

    fn graphql_url(&self) -> Result<url::Url, LabClientError> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(base.join("graphql")?)
    }

    fn build_reqwest_client(cfg: &LabClientConfig) -> Result<reqwest::Client, LabClientError> {
        let user_agent = cfg
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("labdash-client/{}-{}", env!("CARGO_PKG_VERSION"), VERSION));

        reqwest::Client::builder()
            .timeout(cfg.timeout)
            .brotli(true)
            .gzip(true)
            .zstd(true)
            .deflate(true)
            .user_agent(user_agent)
            .redirect(RedirectPolicy::limited(cfg.redirect_limit))
            .build()
            .map_err(|e| ErrorKind::ConfigurationError(e.to_string()).into())
    }

    /// Executes a single typed operation.
    ///
    /// Transport failures map to [`ErrorKind::NetworkError`], bodies that do not decode into `Q`
    /// map to [`ErrorKind::ValidationError`] and server-reported errors to [`ErrorKind::GraphQLError`].
    async fn execute<Q, V>(
        &self,
        descriptor: &'static OperationDescriptor,
        op: cynic::Operation<Q, V>,
    ) -> Result<Q, LabClientError>
    where
        Q: cynic::QueryFragment + cynic::serde::de::DeserializeOwned + Debug + 'static,
        V: cynic::QueryVariables + cynic::serde::Serialize,
    {
        tracing::debug!(
            operation = descriptor.name,
            kind = ?descriptor.kind,
            query = ?serde_json::to_string(&op),
            "sending lab query"
        );

        let mut request = self
            .http
            .post(self.graphql_url()?)
            .header("Accept", "application/json")
            .json(&op);

        if let Some(token) = self.access_token.read().as_ref() {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        let status = resp.status();
        let status_error = resp.error_for_status_ref().err();
        let body = resp.bytes().await?;
        tracing::trace!(
            operation = descriptor.name,
            %status,
            body = %String::from_utf8_lossy(body.as_ref()),
            "received lab response"
        );

        let decoded = serde_json::from_slice::<GraphQlResponse<Q>>(&body);
        match decoded {
            Ok(response) => {
                tracing::debug!(operation = descriptor.name, ?response, "decoded lab response");
                response_to_data(response)
            }
            // A non-GraphQL body on an error status is a transport or URL problem, not a contract mismatch.
            Err(error) => match status_error {
                Some(status_error) if is_transient(status) => Err(ErrorKind::NetworkError(status_error).into()),
                Some(_) => Err(ErrorKind::ConfigurationError(format!(
                    "server responded with status {status} to {}",
                    descriptor.name
                ))
                .into()),
                None => Err(error.into()),
            },
        }
    }
}

/// Statuses reported by overloaded servers or gateways in front of them.
fn is_transient(status: reqwest::StatusCode) -> bool {
    status.is_server_error()
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status == reqwest::StatusCode::TOO_MANY_REQUESTS
}

pub(crate) fn response_to_data<Q>(response: GraphQlResponse<Q>) -> Result<Q, LabClientError> {
    match (response.data, response.errors) {
        (Some(data), None) => Ok(data),
        (Some(data), Some(errors)) if errors.is_empty() => Ok(data),
        (Some(data), Some(errors)) => {
            tracing::error!(?errors, "operation succeeded but errors were encountered");
            Ok(data)
        }
        (None, Some(errors)) if !errors.is_empty() => {
            Err(ErrorKind::GraphQLError(errors.into_iter().map(FieldError::from).collect()).into())
        }
        (None, _) => Err(ValidationErrorKind::NoData.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: serde_json::Value) -> GraphQlResponse<serde_json::Value> {
        serde_json::from_value(json).expect("valid response envelope")
    }

    #[test]
    fn data_without_errors_is_returned() {
        let data = response_to_data(response(serde_json::json!({ "data": { "me": null } }))).unwrap();
        assert_eq!(data, serde_json::json!({ "me": null }));
    }

    #[test]
    fn partial_errors_do_not_hide_data() {
        let data = response_to_data(response(serde_json::json!({
            "data": { "me": null },
            "errors": [{ "message": "not authenticated" }]
        })))
        .unwrap();
        assert_eq!(data, serde_json::json!({ "me": null }));
    }

    #[test]
    fn all_server_errors_are_surfaced_with_paths() {
        let err = response_to_data(response(serde_json::json!({
            "errors": [
                { "message": "in use", "path": ["removeSoftware"] },
                { "message": "second", "path": ["removeSoftware", 0, "name"] }
            ]
        })))
        .unwrap_err();

        let errors = err.graphql_errors().expect("graphql error");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "in use");
        assert_eq!(errors[0].to_string(), "removeSoftware: in use");
        assert_eq!(errors[1].to_string(), "removeSoftware.0.name: second");
    }

    #[test]
    fn missing_data_is_a_validation_error() {
        // Such envelopes are rejected while decoding, so they are built by hand here.
        let empty_errors = GraphQlResponse::<serde_json::Value> {
            data: None,
            errors: Some(vec![]),
        };
        let err = response_to_data(empty_errors).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::ValidationError(ValidationErrorKind::NoData)
        ));

        let nothing = GraphQlResponse::<serde_json::Value> {
            data: None,
            errors: None,
        };
        assert!(response_to_data(nothing).unwrap_err().is_validation());
    }

    #[test]
    fn graphql_url_keeps_base_path() -> anyhow::Result<()> {
        let client = LabClient::new("http://localhost:8080/api".parse()?, Default::default())?;
        assert_eq!(client.graphql_url()?.as_str(), "http://localhost:8080/api/graphql");

        let client = LabClient::new("http://localhost:8080".parse()?, Default::default())?;
        assert_eq!(client.graphql_url()?.as_str(), "http://localhost:8080/graphql");
        Ok(())
    }
}
