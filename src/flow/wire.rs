//! Flat wire shape of a flow node and the bridge to the typed model.
//!
//! The REST contract represents every node as one flat object with optional
//! fields for every node type:
//!
//! ```json
//! {
//!   "id": 5,
//!   "type": "api",
//!   "name": "lookup-invoice",
//!   "nextNodeId": 6,
//!   "integrationId": 2,
//!   "config": {"action": "invoices.open", "mapping": [{"from": "total", "to": "amount"}]}
//! }
//! ```
//!
//! [`RawNode`] mirrors that shape verbatim; the `TryFrom`/`From` impls here
//! move between it and [`FlowNode`]'s tagged union. Unknown `type` strings
//! and malformed `config` objects fail deserialization with a descriptive
//! error instead of producing a half-typed node.

use miette::Diagnostic;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use super::node::{ApiConfig, FlowNode, MappingRow, MenuOption, NodePayload};
use crate::types::{DepartmentId, IntegrationId, NodeId, NodeType};

/// The node object exactly as the API ships it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_node_id"
    )]
    pub next_node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<MenuOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_id: Option<IntegrationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

/// Errors raised while lifting a [`RawNode`] into the typed model.
#[derive(Debug, Error, Diagnostic)]
pub enum WireError {
    /// The `type` discriminant is not one of the seven known node types.
    #[error("node {id}: unknown node type {kind:?}")]
    #[diagnostic(
        code(botflow::wire::unknown_type),
        help("expected one of: start, message, menu, input, api, transfer, finish")
    )]
    UnknownType { id: NodeId, kind: String },

    /// The `config` object does not match the schema implied by `type`.
    #[error("node {id}: invalid {kind} config: {source}")]
    #[diagnostic(code(botflow::wire::config))]
    Config {
        id: NodeId,
        kind: NodeType,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputConfigWire {
    #[serde(default)]
    variable: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiConfigWire {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    mapping: Vec<MappingRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferConfigWire {
    #[serde(default)]
    department_id: Option<DepartmentId>,
}

fn parse_config<T>(id: NodeId, kind: NodeType, config: Option<Value>) -> Result<T, WireError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    match config {
        Some(value) if !value.is_null() => {
            serde_json::from_value(value).map_err(|source| WireError::Config { id, kind, source })
        }
        _ => Ok(T::default()),
    }
}

impl TryFrom<RawNode> for FlowNode {
    type Error = WireError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let kind: NodeType =
            raw.node_type
                .parse()
                .map_err(|_| WireError::UnknownType {
                    id: raw.id,
                    kind: raw.node_type.clone(),
                })?;

        let payload = match kind {
            NodeType::Start => NodePayload::Start {
                content: raw.content.unwrap_or_default(),
            },
            NodeType::Message => NodePayload::Message {
                content: raw.content.unwrap_or_default(),
            },
            NodeType::Menu => NodePayload::Menu {
                options: raw.options.unwrap_or_default(),
            },
            NodeType::Input => {
                let config: InputConfigWire = parse_config(raw.id, kind, raw.config)?;
                NodePayload::Input {
                    variable: config.variable,
                }
            }
            NodeType::Api => {
                let config: ApiConfigWire = parse_config(raw.id, kind, raw.config)?;
                NodePayload::Api(ApiConfig {
                    url: config.url,
                    method: config.method,
                    action: config.action,
                    mapping: config.mapping,
                    integration_id: raw.integration_id,
                })
            }
            NodeType::Transfer => {
                let config: TransferConfigWire = parse_config(raw.id, kind, raw.config)?;
                NodePayload::Transfer {
                    department_id: config.department_id,
                }
            }
            NodeType::Finish => NodePayload::Finish,
        };

        Ok(FlowNode {
            id: raw.id,
            name: raw.name,
            next_node_id: raw.next_node_id,
            payload,
        })
    }
}

impl From<FlowNode> for RawNode {
    fn from(node: FlowNode) -> Self {
        let kind = node.node_type();
        let mut raw = RawNode {
            id: node.id,
            node_type: kind.as_str().to_string(),
            name: node.name,
            content: None,
            next_node_id: node.next_node_id,
            options: None,
            integration_id: None,
            config: None,
        };

        match node.payload {
            NodePayload::Start { content } | NodePayload::Message { content } => {
                raw.content = Some(content);
            }
            NodePayload::Menu { options } => {
                raw.options = Some(options);
            }
            NodePayload::Input { variable } => {
                raw.config = Some(json!({ "variable": variable }));
            }
            NodePayload::Api(config) => {
                raw.integration_id = config.integration_id;
                raw.config = Some(json!({
                    "url": config.url,
                    "method": config.method,
                    "action": config.action,
                    "mapping": config.mapping,
                }));
            }
            NodePayload::Transfer { department_id } => {
                raw.config = Some(json!({ "departmentId": department_id }));
            }
            NodePayload::Finish => {}
        }

        raw
    }
}

/// Accepts a node id as a JSON number, a numeric string, or null. Some
/// frontends ship menu option targets as strings.
pub(crate) fn lenient_node_id<'de, D>(deserializer: D) -> Result<Option<NodeId>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(|raw| Some(NodeId(raw)))
            .ok_or_else(|| D::Error::custom(format!("node id is not an integer: {n}"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(|raw| Some(NodeId(raw)))
            .map_err(|_| D::Error::custom(format!("node id is not numeric: {s:?}"))),
        Some(other) => Err(D::Error::custom(format!(
            "node id must be a number or numeric string, got {other}"
        ))),
    }
}
