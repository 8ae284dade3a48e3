//! Test suite for the flow data model and its wire bridge.

use super::*;
use crate::types::{IntegrationId, NodeId, NodeType};
use serde_json::json;

fn fixture_flow() -> Flow {
    serde_json::from_value(json!({
        "id": 7,
        "name": "support",
        "organizationId": 3,
        "active": true,
        "nodes": [
            {"id": 1, "type": "start", "content": "Olá! {{name}}", "nextNodeId": 2},
            {"id": 2, "type": "menu", "name": "main-menu", "options": [
                {"value": "1", "label": "Invoices", "nextNodeId": 3},
                {"value": "2", "label": "Support", "nextNodeId": "4"}
            ]},
            {"id": 3, "type": "api", "integrationId": 9, "nextNodeId": 5, "config": {
                "action": "invoices.open",
                "mapping": [{"from": "total", "to": "amount"}]
            }},
            {"id": 4, "type": "transfer", "config": {"departmentId": 12}},
            {"id": 5, "type": "finish"}
        ]
    }))
    .expect("fixture flow deserializes")
}

#[test]
fn flat_wire_object_lifts_into_tagged_union() {
    let flow = fixture_flow();

    assert_eq!(flow.nodes.len(), 5);
    assert!(matches!(
        flow.node(NodeId(1)).unwrap().payload,
        NodePayload::Start { .. }
    ));
    let api = flow.node(NodeId(3)).unwrap().api_config().unwrap();
    assert_eq!(api.integration_id, Some(IntegrationId(9)));
    assert_eq!(api.action.as_deref(), Some("invoices.open"));
    assert_eq!(api.mapping.len(), 1);
    assert!(matches!(
        flow.node(NodeId(5)).unwrap().payload,
        NodePayload::Finish
    ));
}

#[test]
fn menu_option_string_target_is_coerced_to_numeric_id() {
    let flow = fixture_flow();
    let options = flow.node(NodeId(2)).unwrap().options().unwrap();
    assert_eq!(options[0].next_node_id, Some(NodeId(3)));
    assert_eq!(options[1].next_node_id, Some(NodeId(4)));
}

#[test]
fn unknown_node_type_fails_deserialization() {
    let err = serde_json::from_value::<FlowNode>(json!({"id": 1, "type": "webhook"}))
        .expect_err("unknown type must not deserialize");
    assert!(err.to_string().contains("webhook"));
}

#[test]
fn malformed_config_fails_with_node_context() {
    let err = serde_json::from_value::<FlowNode>(json!({
        "id": 8,
        "type": "input",
        "config": {"variable": 42}
    }))
    .expect_err("numeric variable must not deserialize");
    assert!(err.to_string().contains("node 8"));
}

#[test]
fn node_serializes_back_to_the_flat_shape() {
    let flow = fixture_flow();
    let raw = serde_json::to_value(flow.node(NodeId(3)).unwrap()).unwrap();

    assert_eq!(raw["type"], "api");
    assert_eq!(raw["integrationId"], 9);
    assert_eq!(raw["nextNodeId"], 5);
    assert_eq!(raw["config"]["action"], "invoices.open");
    assert_eq!(raw["config"]["mapping"][0]["from"], "total");
    // No menu fields leak onto an api node.
    assert!(raw.get("options").is_none());
}

#[test]
fn children_are_next_then_options_in_order() {
    let flow = fixture_flow();

    let start: Vec<NodeId> = flow.node(NodeId(1)).unwrap().children().collect();
    assert_eq!(start, vec![NodeId(2)]);

    let menu: Vec<NodeId> = flow.node(NodeId(2)).unwrap().children().collect();
    assert_eq!(menu, vec![NodeId(3), NodeId(4)]);

    let finish: Vec<NodeId> = flow.node(NodeId(5)).unwrap().children().collect();
    assert!(finish.is_empty());
}

#[test]
fn start_node_falls_back_to_first_in_array_order() {
    let mut flow = fixture_flow();
    assert_eq!(flow.start_node().unwrap().id, NodeId(1));

    flow.nodes.retain(|n| n.node_type() != NodeType::Start);
    assert_eq!(flow.start_node().unwrap().id, NodeId(2));

    flow.nodes.clear();
    assert!(flow.start_node().is_none());
}

#[test]
fn search_matches_name_id_and_content() {
    let flow = fixture_flow();

    let by_name: Vec<NodeId> = flow.search("MAIN").iter().map(|n| n.id).collect();
    assert_eq!(by_name, vec![NodeId(2)]);

    let by_content: Vec<NodeId> = flow.search("olá").iter().map(|n| n.id).collect();
    assert_eq!(by_content, vec![NodeId(1)]);

    let by_id: Vec<NodeId> = flow.search("4").iter().map(|n| n.id).collect();
    assert_eq!(by_id, vec![NodeId(4)]);

    assert!(flow.search("no-such-node").is_empty());
    assert_eq!(flow.search("  ").len(), flow.nodes.len());
}

#[test]
fn dangling_references_are_reported_per_site() {
    let mut flow = fixture_flow();
    flow.nodes.retain(|n| n.id != NodeId(4));

    let dangling = flow.dangling_references();
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].node, NodeId(2));
    assert_eq!(dangling[0].target, NodeId(4));
    assert_eq!(dangling[0].via, ReferenceKind::MenuOption { index: 1 });
}

#[test]
fn mapping_rows_append_and_remove_by_index() {
    let flow = fixture_flow();
    let mut api = flow.node(NodeId(3)).cloned().unwrap();
    let config = api.api_config_mut().unwrap();

    config.add_mapping_row();
    assert_eq!(config.mapping.len(), 2);
    assert_eq!(config.mapping[1], MappingRow::default());

    let removed = config.remove_mapping_row(0).unwrap();
    assert_eq!(removed.from, "total");
    assert_eq!(config.mapping.len(), 1);
    assert_eq!(config.mapping[0], MappingRow::default());

    assert!(config.remove_mapping_row(5).is_none());
    assert!(config.set_mapping_row(0, "status", "situacao"));
    assert_eq!(config.mapping[0].from, "status");
    assert!(!config.set_mapping_row(9, "x", "y"));
}
