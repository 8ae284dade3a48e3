//! Core identifier types for the botflow editor.
//!
//! This module defines the newtype identifiers used throughout the crate for
//! flows, nodes, and the reference records that populate node configuration
//! choices. These are the core domain keys that the REST contract treats as
//! stable numeric ids for the lifetime of a flow.
//!
//! # Key Types
//!
//! - [`FlowId`], [`NodeId`]: keys for the flow and its nodes
//! - [`OrganizationId`], [`IntegrationId`], [`DepartmentId`]: scoping keys
//!   for the dropdown-population endpoints
//! - [`NodeType`]: the discriminant tag of a flow node, as it appears on the
//!   wire
//!
//! # Examples
//!
//! ```rust
//! use botflow::types::{NodeId, NodeType};
//!
//! let id = NodeId(42);
//! assert_eq!(id.to_string(), "42");
//!
//! let kind = NodeType::Menu;
//! assert_eq!(kind.as_str(), "menu");
//! assert_eq!("menu".parse::<NodeType>().unwrap(), NodeType::Menu);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! numeric_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

numeric_id! {
    /// Server-assigned key of a flow.
    FlowId
}

numeric_id! {
    /// Server-assigned key of a node within a flow.
    ///
    /// Node ids are stable numeric keys valid for the lifetime of the flow;
    /// `nextNodeId` references on the wire are expressed in terms of them.
    NodeId
}

numeric_id! {
    /// Key of the organization that owns a flow.
    OrganizationId
}

numeric_id! {
    /// Key of an external integration selectable on api nodes.
    IntegrationId
}

numeric_id! {
    /// Key of a department selectable on transfer nodes.
    DepartmentId
}

/// The action kind of a flow node, matching the wire `type` field.
///
/// This is the discriminant of the [`NodePayload`](crate::flow::NodePayload)
/// tagged union; it exists as a standalone enum so callers can speak about a
/// node's kind (defaults for newly created nodes, search labels) without
/// holding a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Entry point of the flow; at most one per flow by convention.
    Start,
    /// Sends a text message and advances.
    Message,
    /// Presents options and branches on the reply.
    Menu,
    /// Captures the reply into a named variable.
    Input,
    /// Calls an external HTTP endpoint or integration.
    Api,
    /// Hands the conversation to a department queue.
    Transfer,
    /// Terminal node; the conversation leaves the bot.
    Finish,
}

impl NodeType {
    /// The wire spelling of this node type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Start => "start",
            NodeType::Message => "message",
            NodeType::Menu => "menu",
            NodeType::Input => "input",
            NodeType::Api => "api",
            NodeType::Transfer => "transfer",
            NodeType::Finish => "finish",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown node type string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown node type: {0:?}")]
pub struct UnknownNodeType(pub String);

impl FromStr for NodeType {
    type Err = UnknownNodeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(NodeType::Start),
            "message" => Ok(NodeType::Message),
            "menu" => Ok(NodeType::Menu),
            "input" => Ok(NodeType::Input),
            "api" => Ok(NodeType::Api),
            "transfer" => Ok(NodeType::Transfer),
            "finish" => Ok(NodeType::Finish),
            other => Err(UnknownNodeType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_round_trips_through_str() {
        for kind in [
            NodeType::Start,
            NodeType::Message,
            NodeType::Menu,
            NodeType::Input,
            NodeType::Api,
            NodeType::Transfer,
            NodeType::Finish,
        ] {
            assert_eq!(kind.as_str().parse::<NodeType>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_node_type_is_rejected() {
        let err = "webhook".parse::<NodeType>().unwrap_err();
        assert_eq!(err, UnknownNodeType("webhook".to_string()));
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = NodeId(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
        let back: NodeId = serde_json::from_str("7").unwrap();
        assert_eq!(back, id);
    }
}
