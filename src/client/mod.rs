//! REST API client for the bot-flow endpoints.
//!
//! The editor owns no wire protocol of its own; it is a pure consumer of
//! the documented JSON contract:
//!
//! | Method | Path | Purpose |
//! |---|---|---|
//! | GET | `/private/bot-flows/:id` | fetch flow + nodes |
//! | GET | `/private/integrations?organizationId=` | api-node integration choices |
//! | GET | `/private/departments?organizationId=` | transfer-node department choices |
//! | POST | `/private/bot-flows/nodes` | create node `{flowId, type, content}` |
//! | PUT | `/private/bot-flows/nodes/:nodeId` | update node (full draft object) |
//! | DELETE | `/private/bot-flows/nodes/:nodeId` | delete node |
//!
//! [`FlowApi`] is the seam the session layer programs against;
//! [`HttpFlowApi`] is the reqwest implementation. There are no retries and
//! no abort controllers — cancellation is dropping the future, and two
//! rapid writes to the same node race at the server (last write wins,
//! observed only by the next full reload).

mod http;

pub use http::{ClientConfig, ConfigError, HttpFlowApi};

use async_trait::async_trait;
use miette::Diagnostic;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::flow::{Department, Flow, FlowNode, Integration};
use crate::types::{FlowId, NodeId, NodeType, OrganizationId};

/// Body of `POST /private/bot-flows/nodes`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNode {
    pub flow_id: FlowId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub content: String,
}

impl CreateNode {
    /// The defaults the editor uses for a freshly added node.
    #[must_use]
    pub fn with_defaults(flow_id: FlowId) -> Self {
        Self {
            flow_id,
            node_type: NodeType::Message,
            content: "New message".to_string(),
        }
    }
}

/// Which call failed, for notice text and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOp {
    LoadFlow,
    ListIntegrations,
    ListDepartments,
    CreateNode,
    UpdateNode,
    DeleteNode,
}

impl fmt::Display for ApiOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApiOp::LoadFlow => "load flow",
            ApiOp::ListIntegrations => "list integrations",
            ApiOp::ListDepartments => "list departments",
            ApiOp::CreateNode => "create node",
            ApiOp::UpdateNode => "save node",
            ApiOp::DeleteNode => "delete node",
        };
        f.write_str(label)
    }
}

/// Failures of the REST contract. Transport problems and non-2xx statuses
/// are deliberately the whole taxonomy — the editor renders both the same
/// way — plus a decode variant for responses that are 2xx but not the
/// promised shape.
#[derive(Debug, Error, Diagnostic)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("{op}: transport error: {source}")]
    #[diagnostic(
        code(botflow::api::transport),
        help("check connectivity and the configured base URL")
    )]
    Transport {
        op: ApiOp,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{op}: server returned {status}")]
    #[diagnostic(code(botflow::api::status))]
    Status { op: ApiOp, status: u16 },

    /// The response body did not match the documented shape.
    #[error("{op}: invalid response body: {source}")]
    #[diagnostic(code(botflow::api::decode))]
    Decode {
        op: ApiOp,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// The operation this error belongs to.
    #[must_use]
    pub fn op(&self) -> ApiOp {
        match self {
            ApiError::Transport { op, .. }
            | ApiError::Status { op, .. }
            | ApiError::Decode { op, .. } => *op,
        }
    }
}

/// The six calls the editor makes. Implemented over HTTP by
/// [`HttpFlowApi`]; tests substitute an in-memory double.
#[async_trait]
pub trait FlowApi: Send + Sync {
    /// `GET /private/bot-flows/:id`
    async fn fetch_flow(&self, id: FlowId) -> Result<Flow, ApiError>;

    /// `GET /private/integrations?organizationId=`
    async fn list_integrations(
        &self,
        organization: OrganizationId,
    ) -> Result<Vec<Integration>, ApiError>;

    /// `GET /private/departments?organizationId=`
    async fn list_departments(
        &self,
        organization: OrganizationId,
    ) -> Result<Vec<Department>, ApiError>;

    /// `POST /private/bot-flows/nodes`
    async fn create_node(&self, request: CreateNode) -> Result<FlowNode, ApiError>;

    /// `PUT /private/bot-flows/nodes/:nodeId` with the full draft object.
    async fn update_node(&self, id: NodeId, draft: &FlowNode) -> Result<(), ApiError>;

    /// `DELETE /private/bot-flows/nodes/:nodeId`
    async fn delete_node(&self, id: NodeId) -> Result<(), ApiError>;
}
