//! The tagged-union node model.
//!
//! One [`FlowNode`] is one step of the conversation. The shared fields
//! (id, display name, successor) live on the struct; everything that only
//! makes sense for a particular action kind lives in the [`NodePayload`]
//! variant for that kind.

use serde::{Deserialize, Serialize};

use super::wire::RawNode;
use crate::types::{DepartmentId, IntegrationId, NodeId, NodeType};

/// One step in a flow.
///
/// Serializes to and from the flat camelCase wire object (`{ id, type,
/// name, content, nextNodeId, options, integrationId, config }`); see
/// [`super::wire`].
///
/// # Examples
///
/// ```
/// use botflow::flow::{FlowNode, NodePayload};
/// use botflow::types::NodeId;
///
/// let node: FlowNode = serde_json::from_str(
///     r#"{"id": 3, "type": "input", "name": "ask-cpf", "config": {"variable": "cpf"}}"#,
/// )
/// .unwrap();
/// assert_eq!(node.id, NodeId(3));
/// assert_eq!(node.payload, NodePayload::Input { variable: "cpf".into() });
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct FlowNode {
    pub id: NodeId,
    pub name: Option<String>,
    /// The unconditional successor. When present it must reference another
    /// node of the same flow; the server does not enforce this, so the
    /// editor checks it before building dropdowns and before a save.
    pub next_node_id: Option<NodeId>,
    pub payload: NodePayload,
}

impl FlowNode {
    /// The discriminant tag of this node.
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        self.payload.node_type()
    }

    /// Text content, for the node types that carry it (start, message).
    /// `{{variable}}` placeholders inside are opaque to the editor.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match &self.payload {
            NodePayload::Start { content } | NodePayload::Message { content } => {
                Some(content.as_str())
            }
            _ => None,
        }
    }

    /// Menu options, when this is a menu node.
    #[must_use]
    pub fn options(&self) -> Option<&[MenuOption]> {
        match &self.payload {
            NodePayload::Menu { options } => Some(options),
            _ => None,
        }
    }

    /// Api configuration, when this is an api node.
    #[must_use]
    pub fn api_config(&self) -> Option<&ApiConfig> {
        match &self.payload {
            NodePayload::Api(config) => Some(config),
            _ => None,
        }
    }

    /// Mutable api configuration, when this is an api node.
    pub fn api_config_mut(&mut self) -> Option<&mut ApiConfig> {
        match &mut self.payload {
            NodePayload::Api(config) => Some(config),
            _ => None,
        }
    }

    /// Outgoing references in derivation order: the node-level successor
    /// first, then every menu option target in option order. Duplicates are
    /// preserved — each occurrence is one rendered link.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        let options = match &self.payload {
            NodePayload::Menu { options } => options.as_slice(),
            _ => &[],
        };
        self.next_node_id
            .into_iter()
            .chain(options.iter().filter_map(|o| o.next_node_id))
    }

    /// Terminal nodes have no successor and no next-step editor.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.payload, NodePayload::Finish)
    }
}

/// Per-type payload of a [`FlowNode`]. The variant is the single source of
/// truth for which configuration fields exist on a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    /// Entry point; greets with `content`.
    Start { content: String },
    /// Sends `content` and advances.
    Message { content: String },
    /// Branches on the customer's reply.
    Menu { options: Vec<MenuOption> },
    /// Stores the reply server-side under `variable`.
    Input { variable: String },
    /// Calls an external endpoint or a configured integration.
    Api(ApiConfig),
    /// Hands off to a department queue; `None` means the general queue.
    Transfer { department_id: Option<DepartmentId> },
    /// Terminal node.
    Finish,
}

impl NodePayload {
    /// Fresh payload with the default (empty) configuration for a type.
    #[must_use]
    pub fn empty(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Start => NodePayload::Start {
                content: String::new(),
            },
            NodeType::Message => NodePayload::Message {
                content: String::new(),
            },
            NodeType::Menu => NodePayload::Menu {
                options: Vec::new(),
            },
            NodeType::Input => NodePayload::Input {
                variable: String::new(),
            },
            NodeType::Api => NodePayload::Api(ApiConfig::default()),
            NodeType::Transfer => NodePayload::Transfer {
                department_id: None,
            },
            NodeType::Finish => NodePayload::Finish,
        }
    }

    /// The discriminant tag of this payload.
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match self {
            NodePayload::Start { .. } => NodeType::Start,
            NodePayload::Message { .. } => NodeType::Message,
            NodePayload::Menu { .. } => NodeType::Menu,
            NodePayload::Input { .. } => NodeType::Input,
            NodePayload::Api(_) => NodeType::Api,
            NodePayload::Transfer { .. } => NodeType::Transfer,
            NodePayload::Finish => NodeType::Finish,
        }
    }
}

/// One branch of a menu node. Option `value`s are not required to be unique
/// within a node; the server owns that rule if one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuOption {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub label: String,
    /// Target node of this branch. Some frontends ship this as a numeric
    /// string; the deserializer coerces either form.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::wire::lenient_node_id"
    )]
    pub next_node_id: Option<NodeId>,
}

/// One `{ from, to }` pair of an api node's response mapping. Free-form; no
/// uniqueness constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingRow {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

/// Configuration of an api node.
///
/// When `integration_id` is set the integration supplies the URL and
/// method, and the editor hides those fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiConfig {
    pub url: Option<String>,
    pub method: Option<String>,
    pub action: Option<String>,
    pub mapping: Vec<MappingRow>,
    pub integration_id: Option<IntegrationId>,
}

impl ApiConfig {
    /// Appends exactly one empty mapping row.
    pub fn add_mapping_row(&mut self) {
        self.mapping.push(MappingRow::default());
    }

    /// Removes the row at `index`, leaving the order of the rest unchanged.
    /// Out-of-range indices are a no-op and return `None`.
    pub fn remove_mapping_row(&mut self, index: usize) -> Option<MappingRow> {
        if index < self.mapping.len() {
            Some(self.mapping.remove(index))
        } else {
            None
        }
    }

    /// Index-addressed replace of one mapping row. Returns `false` when the
    /// index is out of range.
    pub fn set_mapping_row(&mut self, index: usize, from: &str, to: &str) -> bool {
        match self.mapping.get_mut(index) {
            Some(row) => {
                row.from = from.to_string();
                row.to = to.to_string();
                true
            }
            None => false,
        }
    }
}
