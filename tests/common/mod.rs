#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::json;

use botflow::client::{ApiError, ApiOp, CreateNode, FlowApi};
use botflow::flow::{Department, Flow, FlowNode, Integration};
use botflow::types::{FlowId, NodeId, OrganizationId};

/// A small but representative flow: start, a menu branching to an api call
/// and a transfer, and a finish node behind the api call.
pub fn fixture_flow() -> Flow {
    serde_json::from_value(json!({
        "id": 7,
        "name": "support",
        "organizationId": 3,
        "active": true,
        "nodes": [
            {"id": 1, "type": "start", "content": "Welcome!", "nextNodeId": 2},
            {"id": 2, "type": "menu", "name": "Main menu", "options": [
                {"value": "1", "label": "Check order", "nextNodeId": 3},
                {"value": "2", "label": "Talk to a human", "nextNodeId": 5}
            ]},
            {"id": 3, "type": "api", "name": "Order lookup", "integrationId": 9,
             "config": {"action": "orders.lookup"}, "nextNodeId": 4},
            {"id": 4, "type": "finish"},
            {"id": 5, "type": "transfer", "config": {"departmentId": 12}}
        ]
    }))
    .expect("fixture flow deserializes")
}

pub fn fixture_integrations() -> Vec<Integration> {
    serde_json::from_value(json!([{"id": 9, "name": "ERP"}])).expect("integrations deserialize")
}

pub fn fixture_departments() -> Vec<Department> {
    serde_json::from_value(json!([{"id": 12, "name": "Billing"}])).expect("departments deserialize")
}

/// Mutable backing state of [`FakeApi`].
pub struct FakeState {
    pub flow: Flow,
    pub integrations: Vec<Integration>,
    pub departments: Vec<Department>,
    /// Calls that should fail with a 500.
    pub failing: Vec<ApiOp>,
    /// Every call made, in order.
    pub calls: Vec<ApiOp>,
    next_id: i64,
}

/// In-memory [`FlowApi`] double. Clones share state, so a test keeps one
/// handle to inspect calls and inject failures while the session owns
/// another.
#[derive(Clone)]
pub struct FakeApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                flow: fixture_flow(),
                integrations: fixture_integrations(),
                departments: fixture_departments(),
                failing: Vec::new(),
                calls: Vec::new(),
                next_id: 100,
            })),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake api state")
    }

    pub fn fail_on(&self, op: ApiOp) {
        self.state().failing.push(op);
    }

    pub fn succeed(&self) {
        self.state().failing.clear();
    }

    pub fn calls(&self) -> Vec<ApiOp> {
        self.state().calls.clone()
    }

    fn enter(&self, op: ApiOp) -> Result<MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.state();
        state.calls.push(op);
        if state.failing.contains(&op) {
            return Err(ApiError::Status { op, status: 500 });
        }
        Ok(state)
    }
}

#[async_trait]
impl FlowApi for FakeApi {
    async fn fetch_flow(&self, id: FlowId) -> Result<Flow, ApiError> {
        let op = ApiOp::LoadFlow;
        let state = self.enter(op)?;
        if state.flow.id == id {
            Ok(state.flow.clone())
        } else {
            Err(ApiError::Status { op, status: 404 })
        }
    }

    async fn list_integrations(
        &self,
        _organization: OrganizationId,
    ) -> Result<Vec<Integration>, ApiError> {
        let state = self.enter(ApiOp::ListIntegrations)?;
        Ok(state.integrations.clone())
    }

    async fn list_departments(
        &self,
        _organization: OrganizationId,
    ) -> Result<Vec<Department>, ApiError> {
        let state = self.enter(ApiOp::ListDepartments)?;
        Ok(state.departments.clone())
    }

    async fn create_node(&self, request: CreateNode) -> Result<FlowNode, ApiError> {
        let mut state = self.enter(ApiOp::CreateNode)?;
        let id = NodeId(state.next_id);
        state.next_id += 1;
        let node: FlowNode = serde_json::from_value(json!({
            "id": id,
            "type": request.node_type.as_str(),
            "content": request.content,
        }))
        .map_err(|_| ApiError::Status {
            op: ApiOp::CreateNode,
            status: 422,
        })?;
        state.flow.nodes.push(node.clone());
        Ok(node)
    }

    async fn update_node(&self, id: NodeId, draft: &FlowNode) -> Result<(), ApiError> {
        let op = ApiOp::UpdateNode;
        let mut state = self.enter(op)?;
        match state.flow.nodes.iter_mut().find(|n| n.id == id) {
            Some(slot) => {
                *slot = draft.clone();
                Ok(())
            }
            None => Err(ApiError::Status { op, status: 404 }),
        }
    }

    async fn delete_node(&self, id: NodeId) -> Result<(), ApiError> {
        let op = ApiOp::DeleteNode;
        let mut state = self.enter(op)?;
        match state.flow.nodes.iter().position(|n| n.id == id) {
            Some(index) => {
                state.flow.nodes.remove(index);
                Ok(())
            }
            None => Err(ApiError::Status { op, status: 404 }),
        }
    }
}
