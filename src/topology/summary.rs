//! Splitter capacity summary
//!
//! Always computed over the unfiltered document: capacity planning should not
//! change with the operator's search or status filter.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::{Splitter, Topology};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitterSummaryRow {
    pub fdh_id: Option<String>,
    pub fdh_name: Option<String>,
    pub splitter_id: Option<String>,
    pub splitter_name: Option<String>,
    pub model: Option<String>,
    pub total: u32,
    pub used: u32,
    pub free: u32,
}

/// Distinct numeric ports among the splitter's customers
fn used_ports(splitter: &Splitter) -> u32 {
    let ports: HashSet<u64> = splitter
        .customers
        .iter()
        .filter_map(|c| c.splitter_port.as_deref())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .map(|n| (n + 0.0).to_bits())
        .collect();
    ports.len() as u32
}

/// One row per splitter, sorted by FDH name then splitter name
pub fn splitter_summary(topology: Option<&Topology>) -> Vec<SplitterSummaryRow> {
    let Some(topology) = topology else {
        return Vec::new();
    };

    let mut rows: Vec<SplitterSummaryRow> = topology
        .fdhs
        .iter()
        .flat_map(|fdh| {
            fdh.splitters.iter().map(move |sp| {
                let total = sp.port_capacity.unwrap_or(0);
                let used = used_ports(sp);
                SplitterSummaryRow {
                    fdh_id: fdh.fdh_id.clone(),
                    fdh_name: fdh.name.clone(),
                    splitter_id: sp.splitter_id.clone(),
                    splitter_name: sp.name.clone(),
                    model: sp.model.clone(),
                    total,
                    used,
                    free: total.saturating_sub(used),
                }
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        let fdh = |r: &SplitterSummaryRow| r.fdh_name.clone().unwrap_or_default();
        let sp = |r: &SplitterSummaryRow| r.splitter_name.clone().unwrap_or_default();
        fdh(a).cmp(&fdh(b)).then_with(|| sp(a).cmp(&sp(b)))
    });
    rows
}
