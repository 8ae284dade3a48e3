//! Flow graph data model.
//!
//! A [`Flow`] is a server-stored directed graph describing an automated
//! conversation. It is fetched whole at the start of an edit session and
//! mutated only through single-node API calls; the server stays the source
//! of truth and the client reloads after every mutation.
//!
//! # Core Concepts
//!
//! - **Nodes**: one step of the conversation, typed by action kind. Modeled
//!   here as a tagged union ([`FlowNode`] + [`NodePayload`]) so that a menu
//!   node cannot carry api configuration and vice versa.
//! - **References**: a node points at its successor via `next_node_id`;
//!   menu nodes additionally branch through their options. References are
//!   plain [`NodeId`]s and may dangle after a delete — see
//!   [`Flow::dangling_references`].
//! - **Wire shape**: the REST contract speaks a flat camelCase JSON object
//!   per node. The [`wire`] module bridges between that shape and the typed
//!   model in both directions.
//!
//! # Examples
//!
//! ```
//! use botflow::flow::{Flow, NodePayload};
//!
//! let flow: Flow = serde_json::from_str(
//!     r#"{
//!         "id": 1,
//!         "name": "onboarding",
//!         "organizationId": 10,
//!         "nodes": [
//!             {"id": 1, "type": "start", "content": "hi", "nextNodeId": 2},
//!             {"id": 2, "type": "finish"}
//!         ]
//!     }"#,
//! )
//! .unwrap();
//!
//! let start = flow.start_node().unwrap();
//! assert!(matches!(start.payload, NodePayload::Start { .. }));
//! assert!(flow.dangling_references().is_empty());
//! ```

mod node;
pub mod wire;

#[cfg(test)]
mod tests;

pub use node::{ApiConfig, FlowNode, MappingRow, MenuOption, NodePayload};
pub use wire::WireError;

use serde::{Deserialize, Serialize};

use crate::types::{DepartmentId, FlowId, IntegrationId, NodeId, NodeType, OrganizationId};

/// A complete flow as returned by `GET /private/bot-flows/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: FlowId,
    pub name: String,
    pub organization_id: OrganizationId,
    #[serde(default)]
    pub active: bool,
    /// Minutes of silence before the bot gives up on a conversation.
    #[serde(default)]
    pub bot_inactivity_limit: Option<u32>,
    /// Minutes of silence before a queued conversation is dropped.
    #[serde(default)]
    pub queue_inactivity_limit: Option<u32>,
    #[serde(default)]
    pub inactivity_message: Option<String>,
    /// Messaging instances this flow is attached to.
    #[serde(default)]
    pub instances: Vec<Instance>,
    /// The graph itself. A missing `nodes` field on the wire is an empty
    /// graph, not an error.
    #[serde(default)]
    pub nodes: Vec<FlowNode>,
}

impl Flow {
    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Returns `true` if a node with this id exists in the flow.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// The layout/traversal root: the node typed `start`, or the first node
    /// in array order when no start node exists.
    #[must_use]
    pub fn start_node(&self) -> Option<&FlowNode> {
        self.nodes
            .iter()
            .find(|n| n.node_type() == NodeType::Start)
            .or_else(|| self.nodes.first())
    }

    /// Case-insensitive substring filter over node name, id, and text
    /// content. An empty (or whitespace-only) query matches every node; a
    /// query matching nothing yields an empty list. Linear scan — flows are
    /// tens of nodes, not thousands.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&FlowNode> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.nodes.iter().collect();
        }
        self.nodes
            .iter()
            .filter(|n| {
                n.name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
                    || n.id.to_string().contains(&needle)
                    || n.content()
                        .is_some_and(|c| c.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Every node reference whose target no longer exists in the flow.
    ///
    /// The original contract lets these accumulate silently after deletes
    /// (the link just fails to resolve); surfacing them lets the editor
    /// refuse a save that would persist a stale reference.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut out = Vec::new();
        for node in &self.nodes {
            if let Some(target) = node.next_node_id {
                if !self.contains(target) {
                    out.push(DanglingReference {
                        node: node.id,
                        via: ReferenceKind::Next,
                        target,
                    });
                }
            }
            if let NodePayload::Menu { options } = &node.payload {
                for (index, option) in options.iter().enumerate() {
                    if let Some(target) = option.next_node_id {
                        if !self.contains(target) {
                            out.push(DanglingReference {
                                node: node.id,
                                via: ReferenceKind::MenuOption { index },
                                target,
                            });
                        }
                    }
                }
            }
        }
        out
    }
}

/// Where a dangling reference lives on its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// The node-level `next_node_id`.
    Next,
    /// A menu option's `next_node_id`, by option index.
    MenuOption { index: usize },
}

/// A node reference pointing at an id absent from the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingReference {
    pub node: NodeId,
    pub via: ReferenceKind,
    pub target: NodeId,
}

/// A messaging instance a flow is attached to. Opaque to the editor beyond
/// display purposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// An external integration selectable on api nodes, scoped to an
/// organization. When set on a node, the integration supplies the URL and
/// method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub id: IntegrationId,
    pub name: String,
}

/// A department selectable on transfer nodes; absence means the general
/// queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}
