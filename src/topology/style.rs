//! Status and node-kind styling for the topology graph
//!
//! Status colors win over kind colors: a node's health is what an operator
//! looks for first. A status outside the known four gets a neutral blue;
//! kind colors apply only when a node carries no status at all.

use serde::Serialize;

use crate::models::{NodeKind, Status};

const NEUTRAL_NODE_BORDER: &str = "#3b82f6";
const NEUTRAL_NODE_BACKGROUND: &str = "rgba(59,130,246,0.10)";
const NEUTRAL_EDGE_STROKE: &str = "#60a5fa";
const STRUCTURAL_EDGE_STROKE: &str = "#334155";
const EDGE_WIDTH: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    pub border: &'static str,
    pub background: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: &'static str,
    pub stroke_width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<&'static str>,
}

fn status_colors(status: &Status) -> NodeStyle {
    let (border, background) = match status {
        Status::Active => ("#22c55e", "rgba(34,197,94,0.12)"),
        Status::Disconnected => ("#ef4444", "rgba(239,68,68,0.12)"),
        Status::Inactive => ("#94a3b8", "rgba(148,163,184,0.12)"),
        Status::Pending => ("#f59e0b", "rgba(245,158,11,0.12)"),
        Status::Deactivated | Status::Unknown(_) => (NEUTRAL_NODE_BORDER, NEUTRAL_NODE_BACKGROUND),
    };
    NodeStyle { border, background }
}

fn kind_colors(kind: NodeKind) -> NodeStyle {
    let (border, background) = match kind {
        NodeKind::Headend => ("#60a5fa", "rgba(96,165,250,0.14)"),
        NodeKind::Fdh => ("#a78bfa", "rgba(167,139,250,0.14)"),
        NodeKind::Splitter => ("#f97316", "rgba(249,115,22,0.12)"),
        NodeKind::Line => ("#06b6d4", "rgba(6,182,212,0.12)"),
        NodeKind::Customer => ("#22c55e", "rgba(34,197,94,0.10)"),
    };
    NodeStyle { border, background }
}

/// Node colors for a kind and optional status
pub fn node_style(kind: NodeKind, status: Option<&Status>) -> NodeStyle {
    match status {
        Some(status) => status_colors(status),
        None => kind_colors(kind),
    }
}

/// Stroke for status-bearing edges (splitter→line, line→customer)
pub fn edge_style(status: Option<&Status>) -> EdgeStyle {
    let (stroke, dash) = match status {
        Some(Status::Active) => ("#22c55e", None),
        Some(Status::Disconnected) => ("#ef4444", Some("6 4")),
        Some(Status::Inactive) => ("#94a3b8", Some("2 6")),
        Some(Status::Pending) => ("#f59e0b", Some("4 4")),
        _ => (NEUTRAL_EDGE_STROKE, None),
    };
    EdgeStyle {
        stroke,
        stroke_width: EDGE_WIDTH,
        stroke_dasharray: dash,
    }
}

/// Stroke for headend→FDH and FDH→splitter edges
pub fn structural_edge_style() -> EdgeStyle {
    EdgeStyle {
        stroke: STRUCTURAL_EDGE_STROKE,
        stroke_width: EDGE_WIDTH,
        stroke_dasharray: None,
    }
}

/// Edges are animated only while the keyed status is ACTIVE
pub fn is_animated(status: Option<&Status>) -> bool {
    status.map(Status::is_active).unwrap_or(false)
}
