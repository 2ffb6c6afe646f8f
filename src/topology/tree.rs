//! Collapsible tree view of a (filtered) topology

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::models::{CustomerRef, Fdh, FiberLine, Splitter, Status, Topology};
use crate::navigation::Route;

/// Per-node expand/collapse flags.
///
/// Keyed by domain id and independent of the filter: collapsing a section
/// survives any number of filter changes within a session.
#[derive(Debug, Clone, Default)]
pub struct TreeState {
    fdhs: HashMap<String, bool>,
    splitters: HashMap<String, bool>,
}

fn key(id: Option<&str>) -> String {
    id.unwrap_or_default().to_string()
}

impl TreeState {
    pub fn is_fdh_open(&self, id: Option<&str>) -> bool {
        self.fdhs.get(&key(id)).copied().unwrap_or(true)
    }

    pub fn is_splitter_open(&self, id: Option<&str>) -> bool {
        self.splitters.get(&key(id)).copied().unwrap_or(true)
    }

    pub fn toggle_fdh(&mut self, id: &str) {
        let open = self.is_fdh_open(Some(id));
        self.fdhs.insert(id.to_string(), !open);
    }

    pub fn toggle_splitter(&mut self, id: &str) {
        let open = self.is_splitter_open(Some(id));
        self.splitters.insert(id.to_string(), !open);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeView {
    pub headend_id: Option<String>,
    pub headend_name: Option<String>,
    pub headend_location: Option<String>,
    /// Set when the filter left no FDH standing
    pub no_matches: bool,
    pub fdhs: Vec<FdhSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FdhSection {
    pub id: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub region: Option<String>,
    pub expanded: bool,
    pub splitter_count: usize,
    /// Empty while collapsed
    pub splitters: Vec<SplitterSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitterSection {
    pub id: Option<String>,
    pub name: Option<String>,
    pub model: Option<String>,
    pub port_capacity: Option<u32>,
    pub customer_count: usize,
    pub line_count: usize,
    pub expanded: bool,
    pub lines: Vec<LineRow>,
    pub customers: Vec<CustomerRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRow {
    pub id: Option<String>,
    pub length_label: String,
    pub status: Option<Status>,
    pub customer: Option<CustomerLink>,
}

/// Customer link nested in a line row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerLink {
    pub id: String,
    pub label: String,
    pub status: Option<Status>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRow {
    pub id: Option<String>,
    pub name: Option<String>,
    pub port: Option<String>,
    pub status: Option<Status>,
}

/// Something clickable in the tree
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeTarget {
    Headend,
    Fdh { id: String },
    Splitter { id: String },
    Line { id: String },
    /// The customer link inside a line row; only the customer route fires
    LineCustomer { line_id: String, customer_id: String },
    Customer { id: String },
}

impl TreeTarget {
    pub fn route(&self) -> Route {
        match self {
            TreeTarget::Headend => Route::Headends,
            TreeTarget::Fdh { .. } => Route::Fdhs,
            TreeTarget::Splitter { .. } => Route::Splitters,
            TreeTarget::Line { .. } => Route::FiberDropLines,
            TreeTarget::LineCustomer { customer_id, .. } => Route::Customer {
                id: customer_id.clone(),
            },
            TreeTarget::Customer { id } => Route::Customer { id: id.clone() },
        }
    }
}

fn line_row(line: &FiberLine) -> LineRow {
    let customer = line.customer.as_ref().and_then(|c| {
        let id = c.customer_id.clone()?;
        let label = c
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Customer {}", id));
        Some(CustomerLink {
            id,
            label,
            status: c.status.clone(),
        })
    });
    LineRow {
        id: line.line_id.clone(),
        length_label: format!("{:.1}", line.length_meters.unwrap_or(0.0)),
        status: line.status.clone(),
        customer,
    }
}

fn customer_row(customer: &CustomerRef) -> CustomerRow {
    CustomerRow {
        id: customer.customer_id.clone(),
        name: customer.name.clone(),
        port: customer.splitter_port.clone(),
        status: customer.status.clone(),
    }
}

fn splitter_section(splitter: &Splitter, state: &TreeState) -> SplitterSection {
    let expanded = state.is_splitter_open(splitter.splitter_id.as_deref());
    let (lines, customers) = if expanded {
        (
            splitter.fiber_drop_lines.iter().map(line_row).collect(),
            splitter.customers.iter().map(customer_row).collect(),
        )
    } else {
        (Vec::new(), Vec::new())
    };
    SplitterSection {
        id: splitter.splitter_id.clone(),
        name: splitter.name.clone(),
        model: splitter.model.clone(),
        port_capacity: splitter.port_capacity,
        customer_count: splitter.customers.len(),
        line_count: splitter.fiber_drop_lines.len(),
        expanded,
        lines,
        customers,
    }
}

fn fdh_section(fdh: &Fdh, state: &TreeState) -> FdhSection {
    let expanded = state.is_fdh_open(fdh.fdh_id.as_deref());
    let splitters = if expanded {
        fdh.splitters
            .iter()
            .map(|sp| splitter_section(sp, state))
            .collect()
    } else {
        Vec::new()
    };
    FdhSection {
        id: fdh.fdh_id.clone(),
        name: fdh.name.clone(),
        location: fdh.location.clone(),
        region: fdh.region.clone(),
        expanded,
        splitter_count: fdh.splitters.len(),
        splitters,
    }
}

/// Tree view model for an already-filtered topology
pub fn render(filtered: Option<&Topology>, state: &TreeState) -> Option<TreeView> {
    let topology = filtered?;
    Some(TreeView {
        headend_id: topology.headend_id.clone(),
        headend_name: topology.name.clone(),
        headend_location: topology.location.clone(),
        no_matches: topology.fdhs.is_empty(),
        fdhs: topology.fdhs.iter().map(|f| fdh_section(f, state)).collect(),
    })
}

fn or_dash(v: Option<&str>) -> &str {
    v.filter(|s| !s.is_empty()).unwrap_or("—")
}

fn status_str(s: Option<&Status>) -> &str {
    s.map(Status::as_str).unwrap_or("—")
}

impl TreeView {
    /// Indented plain-text rendering
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Headend: {} ({})",
            or_dash(self.headend_name.as_deref()),
            or_dash(self.headend_location.as_deref())
        );
        if self.no_matches {
            out.push_str("  No nodes match your filters/search.\n");
            return out;
        }
        for fdh in &self.fdhs {
            let marker = if fdh.expanded { "-" } else { "+" };
            let _ = writeln!(
                out,
                "  [{}] FDH: {} • {} • Region: {}",
                marker,
                or_dash(fdh.name.as_deref()),
                or_dash(fdh.location.as_deref()),
                or_dash(fdh.region.as_deref())
            );
            if fdh.expanded && fdh.splitters.is_empty() {
                out.push_str("      No splitters under this FDH.\n");
            }
            for sp in &fdh.splitters {
                let marker = if sp.expanded { "-" } else { "+" };
                let capacity = sp.port_capacity.map(|p| p.to_string());
                let _ = writeln!(
                    out,
                    "      [{}] Splitter: {} • Model: {} • Ports: {} (customers {}, lines {})",
                    marker,
                    or_dash(sp.name.as_deref()),
                    or_dash(sp.model.as_deref()),
                    or_dash(capacity.as_deref()),
                    sp.customer_count,
                    sp.line_count
                );
                if !sp.expanded {
                    continue;
                }
                if sp.lines.is_empty() {
                    out.push_str("          No fiber drop lines under this splitter.\n");
                }
                for line in &sp.lines {
                    let customer = line
                        .customer
                        .as_ref()
                        .map(|c| format!("{} [{}]", c.label, status_str(c.status.as_ref())))
                        .unwrap_or_else(|| "—".to_string());
                    let _ = writeln!(
                        out,
                        "          Line #{} • {} m • {} • Customer: {}",
                        or_dash(line.id.as_deref()),
                        line.length_label,
                        status_str(line.status.as_ref()),
                        customer
                    );
                }
                if sp.customers.is_empty() {
                    out.push_str("          No customers under this splitter.\n");
                }
                for c in &sp.customers {
                    let _ = writeln!(
                        out,
                        "          Customer: {} • Port {} • {}",
                        or_dash(c.name.as_deref()),
                        or_dash(c.port.as_deref()),
                        status_str(c.status.as_ref())
                    );
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Topology {
        let alice = CustomerRef {
            customer_id: Some("1".to_string()),
            name: Some("Alice".to_string()),
            splitter_port: Some("1".to_string()),
            status: Some(Status::Active),
        };
        Topology {
            headend_id: Some("10".to_string()),
            name: Some("HE1".to_string()),
            location: Some("Central".to_string()),
            fdhs: vec![Fdh {
                fdh_id: Some("20".to_string()),
                name: Some("FDH1".to_string()),
                region: Some("East".to_string()),
                location: Some("Main St".to_string()),
                splitters: vec![Splitter {
                    splitter_id: Some("30".to_string()),
                    name: Some("SP1".to_string()),
                    model: None,
                    port_capacity: Some(4),
                    customers: vec![alice.clone()],
                    fiber_drop_lines: vec![
                        FiberLine {
                            line_id: Some("40".to_string()),
                            length_meters: Some(12.34),
                            status: Some(Status::Active),
                            customer: Some(alice),
                        },
                        FiberLine {
                            line_id: Some("41".to_string()),
                            length_meters: None,
                            status: Some(Status::Disconnected),
                            customer: Some(CustomerRef {
                                customer_id: Some("9".to_string()),
                                ..CustomerRef::default()
                            }),
                        },
                    ],
                }],
            }],
        }
    }

    #[test]
    fn test_none_renders_nothing() {
        assert!(render(None, &TreeState::default()).is_none());
    }

    #[test]
    fn test_sections_default_to_expanded() {
        let view = render(Some(&sample()), &TreeState::default()).unwrap();
        assert!(!view.no_matches);
        let fdh = &view.fdhs[0];
        assert!(fdh.expanded);
        let sp = &fdh.splitters[0];
        assert!(sp.expanded);
        assert_eq!(sp.customer_count, 1);
        assert_eq!(sp.line_count, 2);
        assert_eq!(sp.lines[0].length_label, "12.3");
        assert_eq!(sp.lines[1].length_label, "0.0");
    }

    #[test]
    fn test_line_customer_label_falls_back_to_id() {
        let view = render(Some(&sample()), &TreeState::default()).unwrap();
        let link = view.fdhs[0].splitters[0].lines[1].customer.as_ref().unwrap();
        assert_eq!(link.label, "Customer 9");
    }

    #[test]
    fn test_collapsed_sections_hide_children_but_keep_counts() {
        let mut state = TreeState::default();
        state.toggle_splitter("30");
        let view = render(Some(&sample()), &state).unwrap();
        let sp = &view.fdhs[0].splitters[0];
        assert!(!sp.expanded);
        assert!(sp.lines.is_empty());
        assert_eq!(sp.line_count, 2);

        state.toggle_fdh("20");
        let view = render(Some(&sample()), &state).unwrap();
        assert!(view.fdhs[0].splitters.is_empty());
        assert_eq!(view.fdhs[0].splitter_count, 1);

        state.toggle_fdh("20");
        assert!(state.is_fdh_open(Some("20")));
        assert!(!state.is_splitter_open(Some("30")));
    }

    #[test]
    fn test_no_matches_flag() {
        let mut doc = sample();
        doc.fdhs.clear();
        let view = render(Some(&doc), &TreeState::default()).unwrap();
        assert!(view.no_matches);
        assert!(view.to_text().contains("No nodes match your filters/search."));
    }

    #[test]
    fn test_targets_resolve_to_routes() {
        assert_eq!(TreeTarget::Headend.route().path(), "/headends");
        assert_eq!(TreeTarget::Fdh { id: "1".into() }.route().path(), "/fdh");
        assert_eq!(TreeTarget::Splitter { id: "1".into() }.route().path(), "/splitters");
        assert_eq!(TreeTarget::Line { id: "1".into() }.route().path(), "/fiber-drop-lines");
        assert_eq!(
            TreeTarget::LineCustomer { line_id: "40".into(), customer_id: "1".into() }
                .route()
                .path(),
            "/customers/1"
        );
        assert_eq!(TreeTarget::Customer { id: "5".into() }.route().path(), "/customers/5");
    }

    #[test]
    fn test_target_deserializes_from_tagged_json() {
        let target: TreeTarget = serde_json::from_value(serde_json::json!({
            "kind": "line_customer", "line_id": "40", "customer_id": "1"
        }))
        .unwrap();
        assert_eq!(
            target,
            TreeTarget::LineCustomer { line_id: "40".into(), customer_id: "1".into() }
        );
    }

    #[test]
    fn test_text_rendering() {
        let text = render(Some(&sample()), &TreeState::default()).unwrap().to_text();
        assert!(text.starts_with("Headend: HE1 (Central)\n"));
        assert!(text.contains("[-] FDH: FDH1 • Main St • Region: East"));
        assert!(text.contains("Splitter: SP1 • Model: — • Ports: 4 (customers 1, lines 2)"));
        assert!(text.contains("Line #40 • 12.3 m • ACTIVE • Customer: Alice [ACTIVE]"));
        assert!(text.contains("Customer: Alice • Port 1 • ACTIVE"));
    }
}
