use std::sync::Arc;

use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};

use crate::{GraphqlError, QueryError, SessionConfig};

/// Sends a query document and returns the `data` of the response.
#[async_trait::async_trait]
pub trait GraphqlClient: Send + Sync {
    async fn query(&self, query: &str) -> Result<serde_json::Value, QueryError>;
}

pub type DynGraphqlClient = Arc<dyn GraphqlClient>;

#[derive(Debug, Serialize)]
struct Request<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct Response {
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

/// A [`GraphqlClient`] speaking GraphQL over HTTP.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http_client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token: None,
        }
    }

    /// A client for the session described by the environment.
    pub fn for_session(config: &SessionConfig) -> Self {
        Self::new(config.endpoint()).with_token(config.token.clone())
    }

    /// The session token is sent as the user name of HTTP basic auth.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn into_dyn(self) -> DynGraphqlClient {
        Arc::new(self)
    }
}

#[async_trait::async_trait]
impl GraphqlClient for HttpClient {
    async fn query(&self, query: &str) -> Result<serde_json::Value, QueryError> {
        let mut request = self
            .http_client
            .post(&self.endpoint)
            .header(USER_AGENT, concat!("typebridge/", env!("CARGO_PKG_VERSION")))
            .header("Accept", "application/json")
            .json(&Request { query });

        if let Some(token) = &self.token {
            request = request.basic_auth(token, None::<&str>);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() && status != reqwest::StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response: Response = response.json().await?;

        if !response.errors.is_empty() {
            tracing::debug!(count = response.errors.len(), "remote API returned errors");
            return Err(QueryError::from_graphql_errors(response.errors));
        }

        response.data.ok_or(QueryError::EmptyResponse)
    }
}
