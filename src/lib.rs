//! # Botflow: Bot-flow Graph Editing Core
//!
//! Botflow is the headless core of a bot-flow editor: a typed model of
//! conversational flow graphs, a deterministic layered layout engine for
//! visualizing them, per-node-type form contracts, and a REST editing
//! session that keeps a local draft in sync with the server.
//!
//! ## Core Concepts
//!
//! - **Flow**: A named graph of nodes fetched from the API, where each node
//!   carries a type-specific payload (message text, menu options, api
//!   config, ...)
//! - **Layout**: Breadth-first leveling of the graph into columns plus
//!   Bézier edge curves, computed purely from the node list
//! - **Schema**: The editable field surface and referential checks derived
//!   from a node's payload variant
//! - **Session**: The `idle → editing → saving` state machine a host
//!   drives, with a notice channel for its toast surface
//!
//! ## Quick Start
//!
//! ```no_run
//! use botflow::client::{ClientConfig, HttpFlowApi};
//! use botflow::session::EditorSession;
//! use botflow::types::{FlowId, NodeId};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let api = HttpFlowApi::new(ClientConfig::from_env()?);
//! let (mut session, notices) = EditorSession::new(api);
//!
//! session.load_flow(FlowId(7)).await?;
//! let layout = botflow::layout::layout(session.flow().unwrap());
//! println!("{} nodes placed", layout.nodes.len());
//!
//! session.select_node(NodeId(3))?;
//! session.set_name("Welcome")?;
//! session.save_node().await?;
//!
//! while let Ok(notice) = notices.try_recv() {
//!     println!("[{:?}] {}", notice.severity, notice.message);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Guide
//!
//! - [`types`]: Id newtypes and the node-type enum
//! - [`flow`]: The flow graph model and its flat JSON wire format
//! - [`layout`]: BFS leveling, coordinates, and edge curves
//! - [`schema`]: Form field surfaces and draft validation
//! - [`client`]: The [`client::FlowApi`] seam and its reqwest implementation
//! - [`session`]: The editing state machine
//! - [`notices`]: The toast channel
//! - [`telemetry`]: One-call tracing setup for hosts

pub mod client;
pub mod flow;
pub mod layout;
pub mod notices;
pub mod schema;
pub mod session;
pub mod telemetry;
pub mod types;
