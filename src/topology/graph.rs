//! Graph projection of a (filtered) topology
//!
//! Produces a flat node/edge list with fixed grid coordinates for a generic
//! diagramming surface. Layout is a strict five-column grid by depth; rows
//! are assigned per parent scope so siblings never overlap.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::style::{self, EdgeStyle, NodeStyle};
use crate::models::{NodeKind, Status, Topology};

/// Grid spacing for the graph layout
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GraphLayout {
    #[serde(default = "default_column_gap")]
    pub column_gap: f64,
    #[serde(default = "default_row_gap")]
    pub row_gap: f64,
}

impl Default for GraphLayout {
    fn default() -> Self {
        Self {
            column_gap: default_column_gap(),
            row_gap: default_row_gap(),
        }
    }
}

fn default_column_gap() -> f64 {
    330.0
}

fn default_row_gap() -> f64 {
    115.0
}

const FDH_ROW_FACTOR: f64 = 2.0;
const SPLITTER_ROW_FACTOR: f64 = 1.6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Domain identity carried by a graph node, used to resolve clicks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMeta {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub level: u32,
    pub sibling_index: usize,
    pub position: Position,
    pub style: NodeStyle,
    pub label: String,
    pub meta: NodeMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub style: EdgeStyle,
    pub animated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphProjection {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphProjection {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

fn text(v: Option<&str>) -> &str {
    v.unwrap_or("")
}

fn node_id(kind: NodeKind, id: Option<&str>) -> String {
    format!("{}-{}", kind.as_str(), text(id))
}

fn edge_id(source: &str, target: &str) -> String {
    format!("e-{}-{}", source, target)
}

/// Builds nodes and edges, de-duplicating ids.
struct Builder<'a> {
    layout: &'a GraphLayout,
    out: GraphProjection,
    seen: HashSet<String>,
}

impl<'a> Builder<'a> {
    fn new(layout: &'a GraphLayout) -> Self {
        Self {
            layout,
            out: GraphProjection::default(),
            seen: HashSet::new(),
        }
    }

    /// Malformed documents can repeat domain ids; later duplicates get the
    /// first free `#n` suffix. Every emitted id is reserved, suffixed or not.
    fn unique(&mut self, id: String) -> String {
        if self.seen.insert(id.clone()) {
            return id;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}#{}", id, n);
            if self.seen.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn node(
        &mut self,
        kind: NodeKind,
        id: String,
        domain_id: Option<&str>,
        sibling_index: usize,
        y: f64,
        status: Option<&Status>,
        label: String,
    ) -> String {
        let id = self.unique(id);
        self.out.nodes.push(GraphNode {
            id: id.clone(),
            level: kind.level(),
            sibling_index,
            position: Position {
                x: self.layout.column_gap * kind.level() as f64,
                y,
            },
            style: style::node_style(kind, status),
            label,
            meta: NodeMeta {
                kind,
                id: domain_id.map(str::to_string),
            },
        });
        id
    }

    fn edge(&mut self, source: &str, target: &str, status: Option<Option<&Status>>) {
        let (style, animated) = match status {
            Some(status) => (style::edge_style(status), style::is_animated(status)),
            None => (style::structural_edge_style(), false),
        };
        self.out.edges.push(GraphEdge {
            id: edge_id(source, target),
            source: source.to_string(),
            target: target.to_string(),
            style,
            animated,
        });
    }
}

/// Positioned graph for `topology`; empty for `None`
pub fn to_graph(topology: Option<&Topology>, layout: &GraphLayout) -> GraphProjection {
    let Some(topology) = topology else {
        return GraphProjection::default();
    };

    let mut b = Builder::new(layout);
    let row_gap = layout.row_gap;

    let headend = b.node(
        NodeKind::Headend,
        node_id(NodeKind::Headend, topology.headend_id.as_deref()),
        topology.headend_id.as_deref(),
        0,
        0.0,
        None,
        format!(
            "HEADEND: {}\n{}",
            text(topology.name.as_deref()),
            text(topology.location.as_deref())
        ),
    );

    for (fdh_row, fdh) in topology.fdhs.iter().enumerate() {
        let fdh_y = fdh_row as f64 * row_gap * FDH_ROW_FACTOR;
        let fdh_node = b.node(
            NodeKind::Fdh,
            node_id(NodeKind::Fdh, fdh.fdh_id.as_deref()),
            fdh.fdh_id.as_deref(),
            fdh_row,
            fdh_y,
            None,
            format!(
                "FDH: {}\nRegion: {}\n{}",
                text(fdh.name.as_deref()),
                text(fdh.region.as_deref()),
                text(fdh.location.as_deref())
            ),
        );
        b.edge(&headend, &fdh_node, None);

        for (sp_row, splitter) in fdh.splitters.iter().enumerate() {
            let sp_y = fdh_y + sp_row as f64 * row_gap * SPLITTER_ROW_FACTOR;
            let capacity = splitter
                .port_capacity
                .map(|p| p.to_string())
                .unwrap_or_default();
            let sp_node = b.node(
                NodeKind::Splitter,
                node_id(NodeKind::Splitter, splitter.splitter_id.as_deref()),
                splitter.splitter_id.as_deref(),
                sp_row,
                sp_y,
                None,
                format!(
                    "SPLITTER: {}\nModel: {}\nPorts: {}",
                    text(splitter.name.as_deref()),
                    text(splitter.model.as_deref()),
                    capacity
                ),
            );
            b.edge(&fdh_node, &sp_node, None);

            for (line_row, line) in splitter.fiber_drop_lines.iter().enumerate() {
                let line_y = sp_y + line_row as f64 * row_gap;
                let length = line
                    .length_meters
                    .map(|l| l.to_string())
                    .unwrap_or_default();
                let line_status = line.status.as_ref();
                let line_node = b.node(
                    NodeKind::Line,
                    node_id(NodeKind::Line, line.line_id.as_deref()),
                    line.line_id.as_deref(),
                    line_row,
                    line_y,
                    line_status,
                    format!(
                        "FIBER LINE: #{}\nLength: {} m\nStatus: {}",
                        text(line.line_id.as_deref()),
                        length,
                        line_status.map(Status::as_str).unwrap_or("")
                    ),
                );
                b.edge(&sp_node, &line_node, Some(line_status));

                let Some(customer) = line.customer.as_ref() else {
                    continue;
                };
                let Some(customer_id) = customer.customer_id.as_deref().filter(|id| !id.is_empty())
                else {
                    continue;
                };
                let customer_status = customer.status.as_ref();
                let customer_node = b.node(
                    NodeKind::Customer,
                    format!(
                        "customer-{}-{}",
                        customer_id,
                        text(line.line_id.as_deref())
                    ),
                    Some(customer_id),
                    0,
                    line_y,
                    customer_status,
                    format!(
                        "CUSTOMER: {}\nPort: {}\nStatus: {}",
                        text(customer.name.as_deref()),
                        text(customer.splitter_port.as_deref()),
                        customer_status.map(Status::as_str).unwrap_or("")
                    ),
                );
                b.edge(&line_node, &customer_node, Some(customer_status));
            }
        }
    }

    b.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerRef, Fdh, FiberLine, Splitter};
    use proptest::prelude::*;

    fn sample() -> Topology {
        let customer = CustomerRef {
            customer_id: Some("1".to_string()),
            name: Some("Alice".to_string()),
            splitter_port: Some("1".to_string()),
            status: Some(Status::Pending),
        };
        let splitter = |id: &str, lines: Vec<FiberLine>| Splitter {
            splitter_id: Some(id.to_string()),
            name: Some(format!("SP{}", id)),
            model: Some("PLC".to_string()),
            port_capacity: Some(4),
            customers: vec![],
            fiber_drop_lines: lines,
        };
        Topology {
            headend_id: Some("10".to_string()),
            name: Some("HE1".to_string()),
            location: Some("Central".to_string()),
            fdhs: vec![
                Fdh {
                    fdh_id: Some("20".to_string()),
                    name: Some("FDH1".to_string()),
                    region: Some("East".to_string()),
                    location: None,
                    splitters: vec![
                        splitter(
                            "30",
                            vec![
                                FiberLine {
                                    line_id: Some("40".to_string()),
                                    length_meters: Some(12.5),
                                    status: Some(Status::Active),
                                    customer: Some(customer.clone()),
                                },
                                FiberLine {
                                    line_id: Some("41".to_string()),
                                    length_meters: None,
                                    status: Some(Status::Disconnected),
                                    customer: None,
                                },
                            ],
                        ),
                        splitter("31", vec![]),
                    ],
                },
                Fdh {
                    fdh_id: Some("21".to_string()),
                    name: Some("FDH2".to_string()),
                    region: None,
                    location: None,
                    splitters: vec![splitter(
                        "32",
                        vec![FiberLine {
                            line_id: Some("42".to_string()),
                            length_meters: Some(3.0),
                            status: Some(Status::Active),
                            customer: Some(customer),
                        }],
                    )],
                },
            ],
        }
    }

    #[test]
    fn test_none_is_empty() {
        let graph = to_graph(None, &GraphLayout::default());
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_node_and_edge_counts() {
        let graph = to_graph(Some(&sample()), &GraphLayout::default());
        // 1 headend + 2 fdh + 3 splitters + 3 lines + 2 customers
        assert_eq!(graph.nodes.len(), 11);
        assert_eq!(graph.edges.len(), 10);
    }

    #[test]
    fn test_grid_positions() {
        let layout = GraphLayout::default();
        let graph = to_graph(Some(&sample()), &layout);
        let pos = |id: &str| graph.node(id).unwrap().position;

        assert_eq!(pos("headend-10"), Position { x: 0.0, y: 0.0 });
        assert_eq!(pos("fdh-20"), Position { x: 330.0, y: 0.0 });
        assert_eq!(pos("fdh-21"), Position { x: 330.0, y: 230.0 });
        assert_eq!(pos("splitter-31").x, 660.0);
        assert!((pos("splitter-31").y - 184.0).abs() < 1e-9);
        assert_eq!(pos("line-41"), Position { x: 990.0, y: 115.0 });
        assert_eq!(pos("customer-1-40"), Position { x: 1320.0, y: 0.0 });
        assert_eq!(pos("customer-1-42").y, pos("line-42").y);
    }

    #[test]
    fn test_customer_ids_are_unique_per_line() {
        let graph = to_graph(Some(&sample()), &GraphLayout::default());
        let ids: HashSet<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), graph.nodes.len());
        assert!(ids.contains("customer-1-40"));
        assert!(ids.contains("customer-1-42"));
    }

    #[test]
    fn test_repeated_domain_ids_still_unique() {
        let mut doc = sample();
        let dup = doc.fdhs[0].clone();
        doc.fdhs.push(dup);
        let graph = to_graph(Some(&doc), &GraphLayout::default());
        let ids: HashSet<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), graph.nodes.len());
    }

    #[test]
    fn test_edge_styles_follow_status() {
        let graph = to_graph(Some(&sample()), &GraphLayout::default());
        let edge = |id: &str| graph.edges.iter().find(|e| e.id == id).unwrap();

        let structural = edge("e-headend-10-fdh-20");
        assert_eq!(structural.style, style::structural_edge_style());
        assert!(!structural.animated);

        let active = edge("e-splitter-30-line-40");
        assert!(active.animated);
        assert_eq!(active.style.stroke_dasharray, None);

        let disconnected = edge("e-splitter-30-line-41");
        assert!(!disconnected.animated);
        assert_eq!(disconnected.style.stroke_dasharray, Some("6 4"));

        let pending = edge("e-line-40-customer-1-40");
        assert_eq!(pending.style.stroke_dasharray, Some("4 4"));
        assert!(!pending.animated);
    }

    #[test]
    fn test_labels_and_meta() {
        let graph = to_graph(Some(&sample()), &GraphLayout::default());
        let line = graph.node("line-40").unwrap();
        assert_eq!(line.label, "FIBER LINE: #40\nLength: 12.5 m\nStatus: ACTIVE");
        assert_eq!(line.meta.kind, NodeKind::Line);
        assert_eq!(line.meta.id.as_deref(), Some("40"));
        assert_eq!(line.level, 3);

        let customer = graph.node("customer-1-40").unwrap();
        assert_eq!(customer.meta.id.as_deref(), Some("1"));
        assert_eq!(customer.style.border, "#f59e0b");
    }

    fn fdh(id: &str, splitters: Vec<Splitter>) -> Fdh {
        Fdh {
            fdh_id: Some(id.to_string()),
            name: Some(format!("FDH {}", id)),
            region: None,
            location: None,
            splitters,
        }
    }

    #[test]
    fn test_suffix_skips_real_ids() {
        let mut doc = sample();
        doc.fdhs = vec![fdh("7", vec![]), fdh("7", vec![]), fdh("7#2", vec![])];
        let graph = to_graph(Some(&doc), &GraphLayout::default());
        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["headend-10", "fdh-7", "fdh-7#2", "fdh-7#2#2"]);
        // edges follow the renamed node
        assert!(graph.edges.iter().any(|e| e.target == "fdh-7#2#2"));
    }

    #[test]
    fn test_customer_with_empty_id_is_skipped() {
        let mut doc = sample();
        let line = &mut doc.fdhs[0].splitters[0].fiber_drop_lines[0];
        if let Some(customer) = line.customer.as_mut() {
            customer.customer_id = Some(String::new());
        }
        let graph = to_graph(Some(&doc), &GraphLayout::default());
        assert!(graph.node("customer--40").is_none());
        assert!(!graph.edges.iter().any(|e| e.source == "line-40"));
        assert_eq!(graph.nodes.len(), 10);
    }

    fn arb_id() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("7".to_string()),
            Just("7#2".to_string()),
            Just("7#3".to_string()),
            Just(String::new()),
            "[0-9]{1,2}",
        ]
    }

    fn arb_line() -> impl Strategy<Value = FiberLine> {
        (arb_id(), prop::option::of(arb_id())).prop_map(|(id, customer_id)| FiberLine {
            line_id: Some(id),
            length_meters: Some(5.0),
            status: Some(Status::Active),
            customer: customer_id.map(|cid| CustomerRef {
                customer_id: Some(cid),
                name: Some("c".to_string()),
                splitter_port: Some("1".to_string()),
                status: Some(Status::Active),
            }),
        })
    }

    fn arb_topology() -> impl Strategy<Value = Topology> {
        let splitter = (arb_id(), prop::collection::vec(arb_line(), 0..4)).prop_map(|(id, lines)| Splitter {
            splitter_id: Some(id),
            name: None,
            model: None,
            port_capacity: None,
            customers: vec![],
            fiber_drop_lines: lines,
        });
        prop::collection::vec((arb_id(), prop::collection::vec(splitter, 0..3)), 0..4).prop_map(|fdhs| Topology {
            headend_id: Some("7".to_string()),
            name: None,
            location: None,
            fdhs: fdhs.into_iter().map(|(id, splitters)| fdh(&id, splitters)).collect(),
        })
    }

    proptest! {
        #[test]
        fn prop_node_ids_are_unique(doc in arb_topology()) {
            let graph = to_graph(Some(&doc), &GraphLayout::default());
            let ids: HashSet<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
            prop_assert_eq!(ids.len(), graph.nodes.len());
            for edge in &graph.edges {
                prop_assert!(ids.contains(edge.source.as_str()));
                prop_assert!(ids.contains(edge.target.as_str()));
            }
        }
    }
}
