//! reqwest implementation of [`FlowApi`].

use async_trait::async_trait;
use miette::Diagnostic;
use reqwest::{RequestBuilder, Response};
use thiserror::Error;
use tracing::instrument;

use super::{ApiError, ApiOp, CreateNode, FlowApi};
use crate::flow::{Department, Flow, FlowNode, Integration};
use crate::types::{FlowId, NodeId, OrganizationId};

/// Environment variable naming the API origin, e.g. `https://api.example.com`.
pub const ENV_API_URL: &str = "BOTFLOW_API_URL";
/// Environment variable holding the bearer token, if the deployment uses one.
pub const ENV_API_TOKEN: &str = "BOTFLOW_API_TOKEN";

/// Connection settings for [`HttpFlowApi`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin the `/private/...` paths are appended to. Trailing slashes
    /// are trimmed.
    pub base_url: String,
    /// Optional bearer token sent on every request.
    pub token: Option<String>,
}

impl ClientConfig {
    /// Builds a config for the given origin with no token.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: None,
        }
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Reads the config from the environment (a `.env` file is honored),
    /// using [`ENV_API_URL`] and [`ENV_API_TOKEN`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let base_url =
            std::env::var(ENV_API_URL).map_err(|_| ConfigError::MissingApiUrl)?;
        let mut config = Self::new(base_url);
        if let Ok(token) = std::env::var(ENV_API_TOKEN) {
            if !token.is_empty() {
                config.token = Some(token);
            }
        }
        Ok(config)
    }
}

/// Failures reading [`ClientConfig`] from the environment.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("{ENV_API_URL} is not set")]
    #[diagnostic(
        code(botflow::config::missing_api_url),
        help("export BOTFLOW_API_URL=https://your-api.example.com or add it to .env")
    )]
    MissingApiUrl,
}

/// HTTP implementation of the flow-editing contract.
#[derive(Debug, Clone)]
pub struct HttpFlowApi {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpFlowApi {
    /// Creates a client over a default reqwest pool.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Creates a client over a caller-provided reqwest pool (shared
    /// connection reuse with other API consumers of the host).
    #[must_use]
    pub fn with_client(http: reqwest::Client, config: ClientConfig) -> Self {
        Self { http, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, op: ApiOp, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|source| ApiError::Transport { op, source })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            tracing::warn!(%op, status = status.as_u16(), "api call failed");
            Err(ApiError::Status {
                op,
                status: status.as_u16(),
            })
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        op: ApiOp,
        response: Response,
    ) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|source| ApiError::Decode { op, source })
    }
}

#[async_trait]
impl FlowApi for HttpFlowApi {
    #[instrument(skip(self), err)]
    async fn fetch_flow(&self, id: FlowId) -> Result<Flow, ApiError> {
        let op = ApiOp::LoadFlow;
        let request = self.http.get(self.url(&format!("/private/bot-flows/{id}")));
        let response = self.send(op, request).await?;
        Self::decode(op, response).await
    }

    #[instrument(skip(self), err)]
    async fn list_integrations(
        &self,
        organization: OrganizationId,
    ) -> Result<Vec<Integration>, ApiError> {
        let op = ApiOp::ListIntegrations;
        let request = self
            .http
            .get(self.url("/private/integrations"))
            .query(&[("organizationId", organization.0)]);
        let response = self.send(op, request).await?;
        Self::decode(op, response).await
    }

    #[instrument(skip(self), err)]
    async fn list_departments(
        &self,
        organization: OrganizationId,
    ) -> Result<Vec<Department>, ApiError> {
        let op = ApiOp::ListDepartments;
        let request = self
            .http
            .get(self.url("/private/departments"))
            .query(&[("organizationId", organization.0)]);
        let response = self.send(op, request).await?;
        Self::decode(op, response).await
    }

    #[instrument(skip(self, request), err)]
    async fn create_node(&self, request: CreateNode) -> Result<FlowNode, ApiError> {
        let op = ApiOp::CreateNode;
        let request = self
            .http
            .post(self.url("/private/bot-flows/nodes"))
            .json(&request);
        let response = self.send(op, request).await?;
        Self::decode(op, response).await
    }

    #[instrument(skip(self, draft), err)]
    async fn update_node(&self, id: NodeId, draft: &FlowNode) -> Result<(), ApiError> {
        let op = ApiOp::UpdateNode;
        let request = self
            .http
            .put(self.url(&format!("/private/bot-flows/nodes/{id}")))
            .json(draft);
        // 204 or a body echo; either way the session reloads the flow.
        self.send(op, request).await?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_node(&self, id: NodeId) -> Result<(), ApiError> {
        let op = ApiOp::DeleteNode;
        let request = self
            .http
            .delete(self.url(&format!("/private/bot-flows/nodes/{id}")));
        self.send(op, request).await?;
        Ok(())
    }
}
