#![allow(dead_code)]

use std::sync::Arc;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Body {
    Json(serde_json::Value),
    Raw(String),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path_and_query: String,
    pub authorization: Option<String>,
    pub body: Option<Body>,
}

impl RecordedRequest {
    /// JSON body of the request, or `Null` if the body was not JSON.
    pub fn json(&self) -> serde_json::Value {
        match &self.body {
            Some(Body::Json(value)) => value.clone(),
            _ => serde_json::Value::Null,
        }
    }

    /// GraphQL document sent with the request.
    pub fn query(&self) -> String {
        self.json()["query"].as_str().unwrap_or_default().to_string()
    }
}

impl From<&mockito::Request> for RecordedRequest {
    fn from(value: &mockito::Request) -> Self {
        Self {
            method: value.method().to_string(),
            path_and_query: value.path_and_query().to_string(),
            authorization: value
                .header("authorization")
                .first()
                .and_then(|h| h.to_str().ok())
                .map(str::to_string),
            body: match value.header("content-type").first() {
                Some(h) if h == &"application/json" => {
                    Some(Body::Json(serde_json::from_slice(value.body().unwrap()).unwrap()))
                }
                _ => Some(Body::Raw(value.utf8_lossy_body().unwrap().to_string())),
            },
        }
    }
}

pub struct RequestRecorder {
    requests: Arc<parking_lot::Mutex<Vec<RecordedRequest>>>,
}

impl std::fmt::Debug for RequestRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestRecorder")
            .field("requests", &self.requests.lock())
            .finish()
    }
}

impl Default for RequestRecorder {
    fn default() -> Self {
        Self {
            requests: Arc::new(parking_lot::Mutex::new(Vec::with_capacity(2))),
        }
    }
}

impl RequestRecorder {
    pub fn as_matcher(&self) -> impl Fn(&mockito::Request) -> bool + use<> {
        let requests = self.requests.clone();
        move |req| {
            requests.lock().push(RecordedRequest::from(req));
            true
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

/// Starts a mock server answering every GraphQL request with the given body.
pub async fn graphql_server(
    body: &str,
) -> anyhow::Result<(mockito::ServerGuard, mockito::Mock, RequestRecorder)> {
    let mut server = mockito::Server::new_async().await;
    let recorder = RequestRecorder::default();

    let mock = server
        .mock("POST", "/graphql")
        .with_status(200)
        .match_request(recorder.as_matcher())
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;

    Ok((server, mock, recorder))
}
