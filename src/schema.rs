//! Per-node-type configuration contracts.
//!
//! Each node type exposes a different editable surface. The original editor
//! expressed this as ad-hoc `type !== X && type !== Y` guards in the form
//! markup; here the surface is derived from the payload variant, so a host
//! renders exactly the fields that exist for the node it is editing.
//!
//! This module also owns the referential checks that the original contract
//! skipped: next-step choices are built only from nodes that still exist,
//! and a draft holding a stale reference is rejected before it reaches the
//! server.

use miette::Diagnostic;
use thiserror::Error;

use crate::flow::{Flow, FlowNode, NodePayload};
use crate::types::NodeId;

/// One editable field of the node form, in render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// Display name; every node type has one.
    Name,
    /// Message text with opaque `{{variable}}` placeholders.
    Content,
    /// Name under which an input node stores the captured reply.
    Variable,
    /// Manual endpoint URL of an api node.
    Url,
    /// Manual HTTP method of an api node.
    Method,
    /// Server-side action identifier of an api node.
    Action,
    /// The `{from, to}` response mapping rows of an api node.
    MappingRows,
    /// Integration choice of an api node.
    IntegrationChoice,
    /// The options list of a menu node.
    OptionsList,
    /// Department choice of a transfer node; empty means general queue.
    DepartmentChoice,
    /// The node-level next-step dropdown. Absent on finish nodes.
    NextStep,
}

/// The editable surface for a node, derived from its payload variant.
///
/// For api nodes with an integration set, the manual [`FormField::Url`] and
/// [`FormField::Method`] fields are hidden — the integration supplies them.
#[must_use]
pub fn form_fields(node: &FlowNode) -> Vec<FormField> {
    let mut fields = vec![FormField::Name];
    match &node.payload {
        NodePayload::Start { .. } | NodePayload::Message { .. } => {
            fields.push(FormField::Content);
        }
        NodePayload::Menu { .. } => {
            fields.push(FormField::OptionsList);
        }
        NodePayload::Input { .. } => {
            fields.push(FormField::Variable);
        }
        NodePayload::Api(config) => {
            fields.push(FormField::IntegrationChoice);
            if config.integration_id.is_none() {
                fields.push(FormField::Url);
                fields.push(FormField::Method);
            }
            fields.push(FormField::Action);
            fields.push(FormField::MappingRows);
        }
        NodePayload::Transfer { .. } => {
            fields.push(FormField::DepartmentChoice);
        }
        NodePayload::Finish => {}
    }
    if !node.is_terminal() {
        fields.push(FormField::NextStep);
    }
    fields
}

/// Candidate targets for a next-step dropdown: every node of the flow other
/// than the one being edited, in flow array order. Built from the live node
/// list, so a deleted node can never be offered.
#[must_use]
pub fn next_step_targets(flow: &Flow, editing: NodeId) -> Vec<NodeId> {
    flow.nodes
        .iter()
        .map(|n| n.id)
        .filter(|&id| id != editing)
        .collect()
}

/// Why a draft cannot be submitted.
#[derive(Debug, Error, Diagnostic)]
pub enum DraftError {
    /// The draft references a node that no longer exists in the flow — a
    /// leftover from an earlier delete.
    #[error("next step of node {node} points at missing node {target}")]
    #[diagnostic(
        code(botflow::schema::dangling_reference),
        help("pick a new next step; the referenced node was deleted")
    )]
    DanglingReference { node: NodeId, target: NodeId },

    /// A menu option references a node that no longer exists.
    #[error("option {index} of node {node} points at missing node {target}")]
    #[diagnostic(
        code(botflow::schema::dangling_option),
        help("pick a new target for the option; the referenced node was deleted")
    )]
    DanglingOption {
        node: NodeId,
        index: usize,
        target: NodeId,
    },
}

/// Pre-submit referential check of a draft against the current flow.
///
/// A reference to the draft's own id is allowed (a self-loop is a valid
/// graph shape); only ids absent from the flow are rejected.
pub fn validate_draft(flow: &Flow, draft: &FlowNode) -> Result<(), DraftError> {
    if let Some(target) = draft.next_node_id {
        if !flow.contains(target) && target != draft.id {
            return Err(DraftError::DanglingReference {
                node: draft.id,
                target,
            });
        }
    }
    if let NodePayload::Menu { options } = &draft.payload {
        for (index, option) in options.iter().enumerate() {
            if let Some(target) = option.next_node_id {
                if !flow.contains(target) && target != draft.id {
                    return Err(DraftError::DanglingOption {
                        node: draft.id,
                        index,
                        target,
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{ApiConfig, MenuOption};
    use crate::types::IntegrationId;
    use serde_json::json;

    fn flow() -> Flow {
        serde_json::from_value(json!({
            "id": 1,
            "name": "f",
            "organizationId": 1,
            "nodes": [
                {"id": 1, "type": "start", "nextNodeId": 2},
                {"id": 2, "type": "api", "config": {"url": "https://api.example", "method": "GET"}},
                {"id": 3, "type": "finish"}
            ]
        }))
        .expect("flow deserializes")
    }

    fn api_node(integration: Option<IntegrationId>) -> FlowNode {
        FlowNode {
            id: NodeId(2),
            name: None,
            next_node_id: None,
            payload: NodePayload::Api(ApiConfig {
                integration_id: integration,
                ..ApiConfig::default()
            }),
        }
    }

    #[test]
    fn api_node_with_integration_hides_url_and_method() {
        let manual = form_fields(&api_node(None));
        assert!(manual.contains(&FormField::Url));
        assert!(manual.contains(&FormField::Method));

        let integrated = form_fields(&api_node(Some(IntegrationId(4))));
        assert!(!integrated.contains(&FormField::Url));
        assert!(!integrated.contains(&FormField::Method));
        assert!(integrated.contains(&FormField::Action));
        assert!(integrated.contains(&FormField::IntegrationChoice));
    }

    #[test]
    fn finish_node_has_no_next_step_editor() {
        let finish = FlowNode {
            id: NodeId(3),
            name: None,
            next_node_id: None,
            payload: NodePayload::Finish,
        };
        let fields = form_fields(&finish);
        assert!(!fields.contains(&FormField::NextStep));
        assert_eq!(fields, vec![FormField::Name]);
    }

    #[test]
    fn next_step_targets_exclude_the_edited_node() {
        let targets = next_step_targets(&flow(), NodeId(2));
        assert_eq!(targets, vec![NodeId(1), NodeId(3)]);
    }

    #[test]
    fn stale_draft_reference_is_rejected_before_submit() {
        let flow = flow();
        let mut draft = flow.node(NodeId(1)).cloned().unwrap();
        draft.next_node_id = Some(NodeId(99));

        let err = validate_draft(&flow, &draft).unwrap_err();
        assert!(matches!(
            err,
            DraftError::DanglingReference { target: NodeId(99), .. }
        ));
    }

    #[test]
    fn stale_menu_option_is_rejected_with_its_index() {
        let flow = flow();
        let draft = FlowNode {
            id: NodeId(2),
            name: None,
            next_node_id: None,
            payload: NodePayload::Menu {
                options: vec![
                    MenuOption {
                        value: "1".into(),
                        label: "ok".into(),
                        next_node_id: Some(NodeId(3)),
                    },
                    MenuOption {
                        value: "2".into(),
                        label: "stale".into(),
                        next_node_id: Some(NodeId(42)),
                    },
                ],
            },
        };

        let err = validate_draft(&flow, &draft).unwrap_err();
        assert!(matches!(
            err,
            DraftError::DanglingOption { index: 1, target: NodeId(42), .. }
        ));
    }

    #[test]
    fn self_reference_is_a_valid_draft() {
        let flow = flow();
        let mut draft = flow.node(NodeId(2)).cloned().unwrap();
        draft.next_node_id = Some(NodeId(2));
        assert!(validate_draft(&flow, &draft).is_ok());
    }
}
