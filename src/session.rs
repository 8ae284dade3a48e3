//! The flow-editing session.
//!
//! [`EditorSession`] is the stateful orchestrator a host (list editor or
//! visualizer) drives: it owns the loaded flow, the dropdown reference
//! lists scoped to the flow's organization, the current node draft, and
//! the notice channel. It replaces the original editor's ad-hoc component
//! state with an explicit phase machine:
//!
//! ```text
//! idle ── select_node ──▶ editing(draft) ── save_node ──▶ saving
//!   ▲                          ▲                            │
//!   │   reload, draft cleared  │   failure, draft kept      │
//!   └──────────────────────────┴────────────────────────────┘
//! ```
//!
//! Every mutation is a request/response round-trip gated by an explicit
//! call; on success the whole flow is reloaded so server-computed fields
//! win. There is no optimistic concurrency token: two sessions editing the
//! same flow race at the server and the last write wins, observed only by
//! the next reload.

use miette::Diagnostic;
use thiserror::Error;
use tracing::instrument;

use crate::client::{ApiError, CreateNode, FlowApi};
use crate::flow::{ApiConfig, Department, Flow, FlowNode, Integration, MenuOption, NodePayload};
use crate::notices::{Notice, NoticeBus};
use crate::schema::{self, DraftError};
use crate::types::{DepartmentId, FlowId, IntegrationId, NodeId, NodeType};

/// Where the session is in its editing lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// No node selected.
    Idle,
    /// A draft is open in the panel.
    Editing { draft: FlowNode },
    /// The draft is in flight to the server.
    Saving { draft: FlowNode },
}

impl Phase {
    fn draft(&self) -> Option<&FlowNode> {
        match self {
            Phase::Idle => None,
            Phase::Editing { draft } | Phase::Saving { draft } => Some(draft),
        }
    }

    fn draft_mut(&mut self) -> Option<&mut FlowNode> {
        match self {
            Phase::Idle => None,
            Phase::Editing { draft } | Phase::Saving { draft } => Some(draft),
        }
    }
}

/// Errors surfaced to the host driving the session.
#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    /// An operation that needs a loaded flow ran before `load_flow`.
    #[error("no flow loaded")]
    #[diagnostic(code(botflow::session::no_flow))]
    NoFlow,

    /// An operation that needs an open draft ran while idle.
    #[error("no node selected")]
    #[diagnostic(code(botflow::session::no_draft))]
    NoDraft,

    /// `select_node` was given an id absent from the flow.
    #[error("node {0} does not exist in the loaded flow")]
    #[diagnostic(code(botflow::session::unknown_node))]
    UnknownNode(NodeId),

    /// A typed edit was applied to a draft of the wrong kind (for example
    /// a mapping-row edit on a menu node).
    #[error("draft is a {actual} node, operation needs {expected}")]
    #[diagnostic(code(botflow::session::wrong_kind))]
    WrongKind {
        expected: NodeType,
        actual: NodeType,
    },

    /// The draft failed the pre-submit referential check.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Draft(#[from] DraftError),

    /// The server or transport failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Api(#[from] ApiError),
}

/// A flow-editing session over any [`FlowApi`] implementation.
pub struct EditorSession<A> {
    api: A,
    flow: Option<Flow>,
    integrations: Vec<Integration>,
    departments: Vec<Department>,
    phase: Phase,
    notices: NoticeBus,
}

impl<A: FlowApi> EditorSession<A> {
    /// Creates an idle session and hands back the notice receiver for the
    /// host's toast surface.
    #[must_use]
    pub fn new(api: A) -> (Self, flume::Receiver<Notice>) {
        let (notices, rx) = NoticeBus::channel(64);
        (
            Self {
                api,
                flow: None,
                integrations: Vec::new(),
                departments: Vec::new(),
                phase: Phase::Idle,
                notices,
            },
            rx,
        )
    }

    /// The loaded flow, if any.
    #[must_use]
    pub fn flow(&self) -> Option<&Flow> {
        self.flow.as_ref()
    }

    /// Integration choices scoped to the loaded flow's organization.
    #[must_use]
    pub fn integrations(&self) -> &[Integration] {
        &self.integrations
    }

    /// Department choices scoped to the loaded flow's organization.
    #[must_use]
    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    /// Current phase of the editing lifecycle.
    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The open draft, if a node is selected.
    #[must_use]
    pub fn draft(&self) -> Option<&FlowNode> {
        self.phase.draft()
    }

    /// Fetches the flow and the reference lists its node forms need.
    ///
    /// On flow-fetch failure all prior state is left untouched. A failure
    /// of the follow-up list fetches keeps the freshly loaded flow and the
    /// previous lists — each call toasts independently, the way the
    /// original issued one toast per failed request.
    #[instrument(skip(self), err)]
    pub async fn load_flow(&mut self, id: FlowId) -> Result<(), SessionError> {
        let flow = match self.api.fetch_flow(id).await {
            Ok(flow) => flow,
            Err(err) => {
                self.notices.error(format!("failed to {}", err.op()));
                return Err(err.into());
            }
        };

        let organization = flow.organization_id;
        self.flow = Some(flow);
        self.phase = Phase::Idle;

        match self.api.list_integrations(organization).await {
            Ok(integrations) => self.integrations = integrations,
            Err(err) => self.notices.error(format!("failed to {}", err.op())),
        }
        match self.api.list_departments(organization).await {
            Ok(departments) => self.departments = departments,
            Err(err) => self.notices.error(format!("failed to {}", err.op())),
        }
        Ok(())
    }

    /// Clones the node into a local draft. No network call; an existing
    /// draft is discarded.
    pub fn select_node(&mut self, id: NodeId) -> Result<(), SessionError> {
        let flow = self.flow.as_ref().ok_or(SessionError::NoFlow)?;
        let node = flow.node(id).ok_or(SessionError::UnknownNode(id))?;
        self.phase = Phase::Editing {
            draft: node.clone(),
        };
        Ok(())
    }

    /// Drops the draft without saving.
    pub fn clear_selection(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Substring filter over the loaded flow's nodes; empty when no flow
    /// is loaded.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&FlowNode> {
        self.flow
            .as_ref()
            .map(|flow| flow.search(query))
            .unwrap_or_default()
    }

    /// Next-step candidates for the open draft (all other nodes, built
    /// from the live node list so deleted ids are never offered).
    #[must_use]
    pub fn next_step_targets(&self) -> Vec<NodeId> {
        match (&self.flow, self.phase.draft()) {
            (Some(flow), Some(draft)) => schema::next_step_targets(flow, draft.id),
            _ => Vec::new(),
        }
    }

    // ---- local draft edits (no network) --------------------------------

    /// Renames the draft node.
    pub fn set_name(&mut self, name: &str) -> Result<(), SessionError> {
        let draft = self.phase.draft_mut().ok_or(SessionError::NoDraft)?;
        draft.name = if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        };
        Ok(())
    }

    /// Points the draft at a new successor (`None` clears it).
    pub fn set_next_node(&mut self, target: Option<NodeId>) -> Result<(), SessionError> {
        let draft = self.phase.draft_mut().ok_or(SessionError::NoDraft)?;
        draft.next_node_id = target;
        Ok(())
    }

    /// Replaces the message text of a start or message draft.
    pub fn set_content(&mut self, text: &str) -> Result<(), SessionError> {
        let draft = self.phase.draft_mut().ok_or(SessionError::NoDraft)?;
        match &mut draft.payload {
            NodePayload::Start { content } | NodePayload::Message { content } => {
                *content = text.to_string();
                Ok(())
            }
            other => Err(SessionError::WrongKind {
                expected: NodeType::Message,
                actual: other.node_type(),
            }),
        }
    }

    /// Replaces the capture variable of an input draft.
    pub fn set_variable(&mut self, variable: &str) -> Result<(), SessionError> {
        let draft = self.phase.draft_mut().ok_or(SessionError::NoDraft)?;
        match &mut draft.payload {
            NodePayload::Input { variable: current } => {
                variable.clone_into(current);
                Ok(())
            }
            other => Err(SessionError::WrongKind {
                expected: NodeType::Input,
                actual: other.node_type(),
            }),
        }
    }

    /// Sets or clears the integration of an api draft. Setting one hides
    /// the manual URL/method fields in the rendered form.
    pub fn set_integration(
        &mut self,
        integration: Option<IntegrationId>,
    ) -> Result<(), SessionError> {
        self.with_api_config(|config| config.integration_id = integration)
    }

    /// Edits the manual endpoint fields of an api draft.
    pub fn set_api_endpoint(
        &mut self,
        url: Option<&str>,
        method: Option<&str>,
        action: Option<&str>,
    ) -> Result<(), SessionError> {
        self.with_api_config(|config| {
            config.url = url.map(str::to_string);
            config.method = method.map(str::to_string);
            config.action = action.map(str::to_string);
        })
    }

    /// Appends exactly one empty mapping row to an api draft.
    pub fn add_mapping_row(&mut self) -> Result<(), SessionError> {
        self.with_api_config(|config| config.add_mapping_row())
    }

    /// Removes only the mapping row at `index`, keeping the rest in order.
    pub fn remove_mapping_row(&mut self, index: usize) -> Result<(), SessionError> {
        self.with_api_config(|config| {
            config.remove_mapping_row(index);
        })
    }

    /// Index-addressed replace of one mapping row.
    pub fn set_mapping_row(
        &mut self,
        index: usize,
        from: &str,
        to: &str,
    ) -> Result<(), SessionError> {
        self.with_api_config(|config| {
            config.set_mapping_row(index, from, to);
        })
    }

    /// Sets or clears the department of a transfer draft (`None` routes to
    /// the general queue).
    pub fn set_department(
        &mut self,
        department: Option<DepartmentId>,
    ) -> Result<(), SessionError> {
        let draft = self.phase.draft_mut().ok_or(SessionError::NoDraft)?;
        match &mut draft.payload {
            NodePayload::Transfer { department_id } => {
                *department_id = department;
                Ok(())
            }
            other => Err(SessionError::WrongKind {
                expected: NodeType::Transfer,
                actual: other.node_type(),
            }),
        }
    }

    /// Replaces the options list of a menu draft.
    pub fn set_options(
        &mut self,
        options: Vec<MenuOption>,
    ) -> Result<(), SessionError> {
        let draft = self.phase.draft_mut().ok_or(SessionError::NoDraft)?;
        match &mut draft.payload {
            NodePayload::Menu { options: current } => {
                *current = options;
                Ok(())
            }
            other => Err(SessionError::WrongKind {
                expected: NodeType::Menu,
                actual: other.node_type(),
            }),
        }
    }

    fn with_api_config(
        &mut self,
        edit: impl FnOnce(&mut ApiConfig),
    ) -> Result<(), SessionError> {
        let draft = self.phase.draft_mut().ok_or(SessionError::NoDraft)?;
        match draft.api_config_mut() {
            Some(config) => {
                edit(config);
                Ok(())
            }
            None => Err(SessionError::WrongKind {
                expected: NodeType::Api,
                actual: draft.node_type(),
            }),
        }
    }

    // ---- server mutations ----------------------------------------------

    /// PUTs the open draft, then reloads the flow so server-computed
    /// fields win, and clears the draft.
    ///
    /// The draft is validated referentially first; a stale next-step
    /// reference fails before any network traffic. On API failure the
    /// draft stays open for retry. Last write wins when two sessions race
    /// on the same node.
    #[instrument(skip(self), err)]
    pub async fn save_node(&mut self) -> Result<(), SessionError> {
        let flow_id = self.flow.as_ref().ok_or(SessionError::NoFlow)?.id;
        let draft = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Editing { draft } | Phase::Saving { draft } => draft,
            Phase::Idle => return Err(SessionError::NoDraft),
        };

        if let Some(flow) = &self.flow {
            if let Err(err) = schema::validate_draft(flow, &draft) {
                self.notices.error(err.to_string());
                self.phase = Phase::Editing { draft };
                return Err(err.into());
            }
        }

        self.phase = Phase::Saving {
            draft: draft.clone(),
        };
        match self.api.update_node(draft.id, &draft).await {
            Ok(()) => {
                self.notices.info("node saved");
                self.phase = Phase::Idle;
                self.reload(flow_id).await;
                Ok(())
            }
            Err(err) => {
                self.notices.error(format!("failed to {}", err.op()));
                // Keep the draft open so the agent can retry.
                self.phase = Phase::Editing { draft };
                Err(err.into())
            }
        }
    }

    /// POSTs a new node with the editor defaults (a message node with
    /// placeholder content), then reloads the flow.
    #[instrument(skip(self), err)]
    pub async fn add_node(&mut self) -> Result<NodeId, SessionError> {
        let flow_id = self.flow.as_ref().ok_or(SessionError::NoFlow)?.id;
        match self
            .api
            .create_node(CreateNode::with_defaults(flow_id))
            .await
        {
            Ok(created) => {
                self.notices.info("node created");
                self.reload(flow_id).await;
                Ok(created.id)
            }
            Err(err) => {
                self.notices.error(format!("failed to {}", err.op()));
                Err(err.into())
            }
        }
    }

    /// DELETEs a node, reloads the flow, and clears the draft if it
    /// pointed at the deleted node. Confirmation is the host's concern.
    #[instrument(skip(self), err)]
    pub async fn delete_node(&mut self, id: NodeId) -> Result<(), SessionError> {
        let flow_id = self.flow.as_ref().ok_or(SessionError::NoFlow)?.id;
        match self.api.delete_node(id).await {
            Ok(()) => {
                if self.phase.draft().is_some_and(|draft| draft.id == id) {
                    self.phase = Phase::Idle;
                }
                self.notices.info("node deleted");
                self.reload(flow_id).await;
                Ok(())
            }
            Err(err) => {
                self.notices.error(format!("failed to {}", err.op()));
                Err(err.into())
            }
        }
    }

    /// Post-mutation reload. A failed reload keeps the stale flow and
    /// toasts; the next successful operation refreshes it.
    async fn reload(&mut self, id: FlowId) {
        match self.api.fetch_flow(id).await {
            Ok(flow) => self.flow = Some(flow),
            Err(err) => self.notices.error(format!("failed to {}", err.op())),
        }
    }
}
