use std::sync::Arc;

/// Location of a server-reported error inside the response data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(i32),
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "{name}"),
            PathSegment::Index(idx) => write!(f, "{idx}"),
        }
    }
}

/// Single error entry returned by the GraphQL server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }

    pub fn with_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = path.into_iter().map(|p| PathSegment::Field(p.into())).collect();
        self
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            let path = self.path.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(".");
            write!(f, "{path}: {}", self.message)
        }
    }
}

impl From<cynic::GraphQlError> for FieldError {
    fn from(value: cynic::GraphQlError) -> Self {
        Self {
            path: value
                .path
                .unwrap_or_default()
                .into_iter()
                .map(|segment| match segment {
                    cynic::GraphQlErrorPathSegment::Field(name) => PathSegment::Field(name),
                    cynic::GraphQlErrorPathSegment::Index(idx) => PathSegment::Index(idx),
                })
                .collect(),
            message: value.message,
        }
    }
}

/// Reasons why a response or input did not match the declared operation contract.
#[derive(Debug, thiserror::Error)]
pub enum ValidationErrorKind {
    #[error("invalid input: {0}")]
    Input(#[from] validator::ValidationErrors),
    #[error("undecodable response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response contains no data")]
    NoData,
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("network error: {0}")]
    NetworkError(#[source] reqwest::Error),
    #[error("graphql error: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", "))]
    GraphQLError(Vec<FieldError>),
    #[error("validation error: {0}")]
    ValidationError(#[from] ValidationErrorKind),
    #[error("precondition failed: {0}")]
    PreconditionError(&'static str),
    #[error("invalid configuration: {0}")]
    ConfigurationError(String),
    #[cfg(any(test, feature = "testing"))]
    #[error("test client error: {0}")]
    MockClientError(String),
}

/// Error returned by all operations of the laboratory client.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct LabClientError {
    kind: ErrorKind,
}

impl LabClientError {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    pub fn is_network(&self) -> bool {
        matches!(self.kind, ErrorKind::NetworkError(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::ValidationError(_))
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self.kind, ErrorKind::PreconditionError(_))
    }

    /// Server-reported errors, if this is a [`ErrorKind::GraphQLError`].
    pub fn graphql_errors(&self) -> Option<&[FieldError]> {
        match &self.kind {
            ErrorKind::GraphQLError(errors) => Some(errors.as_slice()),
            _ => None,
        }
    }
}

impl From<ErrorKind> for LabClientError {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

impl From<ValidationErrorKind> for LabClientError {
    fn from(value: ValidationErrorKind) -> Self {
        ErrorKind::ValidationError(value).into()
    }
}

impl From<reqwest::Error> for LabClientError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            ValidationErrorKind::Other(value.to_string()).into()
        } else {
            ErrorKind::NetworkError(value).into()
        }
    }
}

impl From<serde_json::Error> for LabClientError {
    fn from(value: serde_json::Error) -> Self {
        ValidationErrorKind::Decode(value).into()
    }
}

impl From<validator::ValidationErrors> for LabClientError {
    fn from(value: validator::ValidationErrors) -> Self {
        ValidationErrorKind::Input(value).into()
    }
}

impl From<url::ParseError> for LabClientError {
    fn from(value: url::ParseError) -> Self {
        ErrorKind::ConfigurationError(value.to_string()).into()
    }
}

/// Error shared between the caller and the view model that recorded it.
pub type SharedError = Arc<LabClientError>;
