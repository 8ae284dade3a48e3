//! BFS leveling layout for flow visualization.
//!
//! [`layout`] is a pure function from a [`Flow`] to 2D positions and edge
//! curves. It holds no state, is recomputed from scratch whenever the flow
//! changes, and never fails: an empty flow is an empty layout, a dangling
//! reference is simply a link that does not get drawn.
//!
//! # Algorithm
//!
//! 1. Root selection: the `start` node, or the first node in array order.
//! 2. Breadth-first traversal from the root. A node's level is fixed the
//!    first time it is enqueued, so it equals the shortest edge distance
//!    from the root. Children are the node successor plus every menu option
//!    target, in that order.
//! 3. Re-encountering a visited node (a menu looping back) still records a
//!    [`Link`] but never re-enqueues, so cycles terminate and levels never
//!    move after first discovery.
//! 4. Nodes unreachable from the root are collected into
//!    [`FlowLayout::orphans`] and placed in a dedicated column after the
//!    deepest reachable level, so they can be flagged by the host instead
//!    of silently overlapping column zero.
//! 5. Within a level, nodes stack vertically in flow array order with fixed
//!    box geometry; edges render as cubic Bézier curves from the right edge
//!    of the source box to the left edge of the target box.
//!
//! # Examples
//!
//! ```
//! use botflow::flow::Flow;
//! use botflow::layout::layout;
//! use botflow::types::NodeId;
//!
//! let flow: Flow = serde_json::from_str(
//!     r#"{"id": 1, "name": "f", "organizationId": 1, "nodes": [
//!         {"id": 1, "type": "start", "nextNodeId": 2},
//!         {"id": 2, "type": "message", "nextNodeId": 3},
//!         {"id": 3, "type": "finish"}
//!     ]}"#,
//! )
//! .unwrap();
//!
//! let laid = layout(&flow);
//! assert_eq!(laid.level(NodeId(3)), Some(2));
//! assert_eq!(laid.links.len(), 2);
//! ```

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::flow::Flow;
use crate::types::NodeId;

/// Box width of a rendered node.
pub const NODE_WIDTH: f64 = 180.0;
/// Box height of a rendered node.
pub const NODE_HEIGHT: f64 = 72.0;
/// Horizontal gap between level columns.
pub const GAP_X: f64 = 70.0;
/// Vertical gap between stacked nodes of one column.
pub const GAP_Y: f64 = 28.0;
/// Top-left offset of the whole diagram.
pub const OFFSET: f64 = 24.0;

/// A node with its computed position. Derived, transient data: discarded
/// and recomputed whenever the underlying flow changes, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedNode {
    pub id: NodeId,
    /// BFS distance from the root; orphans share the column after the
    /// deepest reachable level.
    pub level: usize,
    /// Position within the level column, in flow array order.
    pub row: usize,
    /// Left edge of the node box.
    pub x: f64,
    /// Top edge of the node box.
    pub y: f64,
}

/// A directed edge between two placed nodes, one per `next_node_id` or menu
/// option occurrence whose target resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    pub source: NodeId,
    pub target: NodeId,
}

/// Cubic Bézier geometry for one link: right edge of the source box to the
/// left edge of the target box, control points at the horizontal midpoint.
/// No collision avoidance between overlapping curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCurve {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub control1: (f64, f64),
    pub control2: (f64, f64),
}

/// The computed layout of one flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowLayout {
    /// Every node of the flow with its position, in flow array order.
    pub nodes: Vec<PlacedNode>,
    /// Resolved edges in BFS visit order.
    pub links: Vec<Link>,
    /// Nodes unreachable from the root, in flow array order.
    pub orphans: Vec<NodeId>,
    index: FxHashMap<NodeId, usize>,
}

impl FlowLayout {
    /// Position of a node, if the node exists in the flow.
    #[must_use]
    pub fn placed(&self, id: NodeId) -> Option<&PlacedNode> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    /// BFS level of a node (orphans report their display column).
    #[must_use]
    pub fn level(&self, id: NodeId) -> Option<usize> {
        self.placed(id).map(|p| p.level)
    }

    /// `true` when the node was not reached by the BFS.
    #[must_use]
    pub fn is_orphan(&self, id: NodeId) -> bool {
        self.orphans.contains(&id)
    }

    /// Bézier geometry for a link. `None` when either endpoint is missing
    /// from the layout (a dangling link is silently not drawn).
    #[must_use]
    pub fn curve(&self, link: &Link) -> Option<EdgeCurve> {
        let source = self.placed(link.source)?;
        let target = self.placed(link.target)?;

        let from = (
            source.x + NODE_WIDTH,
            source.y + NODE_HEIGHT / 2.0,
        );
        let to = (target.x, target.y + NODE_HEIGHT / 2.0);
        let mid_x = (from.0 + to.0) / 2.0;

        Some(EdgeCurve {
            from,
            to,
            control1: (mid_x, from.1),
            control2: (mid_x, to.1),
        })
    }
}

/// Computes the layout of a flow. Deterministic: the same node array always
/// yields identical levels, positions, and link lists.
#[must_use]
pub fn layout(flow: &Flow) -> FlowLayout {
    let Some(root) = flow.start_node() else {
        return FlowLayout::default();
    };

    // Level assignment + link derivation in one BFS pass. A node is marked
    // visited when first enqueued; edges to already-visited nodes still
    // produce links, so a cycle renders without looping the traversal.
    let mut level_of: FxHashMap<NodeId, usize> = FxHashMap::default();
    let mut visited: FxHashSet<NodeId> = FxHashSet::default();
    let mut links: Vec<Link> = Vec::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();

    visited.insert(root.id);
    level_of.insert(root.id, 0);
    queue.push_back(root.id);

    while let Some(current) = queue.pop_front() {
        let level = level_of[&current];
        let Some(node) = flow.node(current) else {
            continue;
        };
        for child in node.children() {
            if !flow.contains(child) {
                // Dangling reference: no link, no traversal. Reported
                // separately by Flow::dangling_references.
                continue;
            }
            links.push(Link {
                source: current,
                target: child,
            });
            if visited.insert(child) {
                level_of.insert(child, level + 1);
                queue.push_back(child);
            }
        }
    }

    let deepest = level_of.values().copied().max().unwrap_or(0);
    let orphan_level = deepest + 1;
    let orphans: Vec<NodeId> = flow
        .nodes
        .iter()
        .map(|n| n.id)
        .filter(|id| !visited.contains(id))
        .collect();

    // Stack nodes within each column in flow array order.
    let mut rows_in_level: FxHashMap<usize, usize> = FxHashMap::default();
    let mut nodes = Vec::with_capacity(flow.nodes.len());
    let mut index = FxHashMap::default();
    for node in &flow.nodes {
        let level = level_of.get(&node.id).copied().unwrap_or(orphan_level);
        let row_slot = rows_in_level.entry(level).or_insert(0);
        let row = *row_slot;
        *row_slot += 1;

        index.insert(node.id, nodes.len());
        nodes.push(PlacedNode {
            id: node.id,
            level,
            row,
            x: level as f64 * (NODE_WIDTH + GAP_X) + OFFSET,
            y: row as f64 * (NODE_HEIGHT + GAP_Y) + OFFSET,
        });
    }

    FlowLayout {
        nodes,
        links,
        orphans,
        index,
    }
}
