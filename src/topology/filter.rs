//! Topology filter engine
//!
//! Prunes a topology document against a [`FilterSpec`]. Matching is decided
//! top-down: once a headend, FDH or splitter matches the search text on its
//! own fields, everything beneath it counts as matched and only the status
//! constraints still apply. Parents without a self-match survive only when
//! at least one descendant does. The headend is never pruned.
//!
//! An empty search text matches every leaf but does not count as a parent
//! self-match; with no constraints at all every node survives.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{CustomerRef, Fdh, FiberLine, Splitter, Status, Topology};

/// Session-local filter state.
///
/// Updates go through the reducer methods, which return a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    #[serde(default)]
    pub search_text: String,
    #[serde(default)]
    pub status_filter: BTreeSet<Status>,
    #[serde(default)]
    pub active_lines_only: bool,
}

impl FilterSpec {
    pub fn with_search_text(&self, text: impl Into<String>) -> Self {
        Self {
            search_text: text.into(),
            ..self.clone()
        }
    }

    /// Adds or removes a status. Ignored while `active_lines_only` is set,
    /// matching the disabled legend buttons in that mode.
    pub fn toggle_status(&self, status: Status) -> Self {
        if self.active_lines_only {
            return self.clone();
        }
        let mut status_filter = self.status_filter.clone();
        if !status_filter.remove(&status) {
            status_filter.insert(status);
        }
        Self {
            status_filter,
            ..self.clone()
        }
    }

    pub fn with_active_lines_only(&self, active_lines_only: bool) -> Self {
        Self {
            active_lines_only,
            ..self.clone()
        }
    }

    pub fn cleared() -> Self {
        Self::default()
    }

    /// The status set actually applied: empty while `active_lines_only` wins
    pub fn effective_status_filter(&self) -> BTreeSet<Status> {
        if self.active_lines_only {
            BTreeSet::new()
        } else {
            self.status_filter.clone()
        }
    }

    #[cfg(test)]
    pub fn is_identity(&self) -> bool {
        self.search_text.trim().is_empty() && self.status_filter.is_empty() && !self.active_lines_only
    }
}

/// Compiled predicates for one filter pass
struct Matcher {
    needle: String,
    statuses: BTreeSet<Status>,
    active_only: bool,
}

impl Matcher {
    fn new(spec: &FilterSpec) -> Self {
        Self {
            needle: spec.search_text.trim().to_lowercase(),
            statuses: spec.effective_status_filter(),
            active_only: spec.active_lines_only,
        }
    }

    fn has_search(&self) -> bool {
        !self.needle.is_empty()
    }

    fn contains(&self, field: Option<&str>) -> bool {
        field
            .map(|f| f.to_lowercase().contains(&self.needle))
            .unwrap_or(false)
    }

    fn any<'a>(&self, fields: impl IntoIterator<Item = Option<&'a str>>) -> bool {
        !self.has_search() || fields.into_iter().any(|f| self.contains(f))
    }

    /// Parents only self-match on a non-empty search text
    fn parent_any<'a>(&self, fields: impl IntoIterator<Item = Option<&'a str>>) -> bool {
        self.has_search() && fields.into_iter().any(|f| self.contains(f))
    }

    fn unconstrained(&self) -> bool {
        !self.has_search() && !self.active_only && self.statuses.is_empty()
    }

    fn status_allowed(&self, status: Option<&Status>) -> bool {
        if self.active_only {
            return status.map(Status::is_active).unwrap_or(false);
        }
        if self.statuses.is_empty() {
            return true;
        }
        status.map(|s| self.statuses.contains(s)).unwrap_or(false)
    }

    fn headend_matches(&self, topology: &Topology) -> bool {
        self.parent_any([
            topology.name.as_deref(),
            topology.location.as_deref(),
            topology.headend_id.as_deref(),
        ])
    }

    fn fdh_matches(&self, fdh: &Fdh) -> bool {
        self.parent_any([
            fdh.name.as_deref(),
            fdh.location.as_deref(),
            fdh.region.as_deref(),
            fdh.fdh_id.as_deref(),
        ])
    }

    fn splitter_matches(&self, splitter: &Splitter) -> bool {
        let capacity = splitter.port_capacity.map(|p| p.to_string());
        self.parent_any([
            splitter.name.as_deref(),
            splitter.model.as_deref(),
            capacity.as_deref(),
            splitter.splitter_id.as_deref(),
        ])
    }

    fn customer_matches(&self, customer: &CustomerRef) -> bool {
        self.any(customer_fields(customer))
    }

    fn line_matches(&self, line: &FiberLine) -> bool {
        let length = line.length_meters.map(|l| l.to_string());
        let own = [
            line.line_id.as_deref(),
            length.as_deref(),
            line.status.as_ref().map(Status::as_str),
        ];
        let customer = line
            .customer
            .as_ref()
            .map(customer_fields)
            .unwrap_or([None; 4]);
        self.any(own.into_iter().chain(customer))
    }

    fn keep_customer(&self, customer: &CustomerRef, ancestor_matched: bool) -> bool {
        self.status_allowed(customer.status.as_ref())
            && (ancestor_matched || self.customer_matches(customer))
    }

    fn keep_line(&self, line: &FiberLine, ancestor_matched: bool) -> bool {
        if !self.status_allowed(line.status.as_ref()) {
            return false;
        }
        // the attached customer has to pass the status filter as well
        let customer_ok = self.active_only
            || self.statuses.is_empty()
            || self.status_allowed(line.customer.as_ref().and_then(|c| c.status.as_ref()));
        customer_ok && (ancestor_matched || self.line_matches(line))
    }

    fn filter_splitter(&self, splitter: &Splitter, ancestor_matched: bool) -> Option<Splitter> {
        let matched = ancestor_matched || self.splitter_matches(splitter);

        let customers: Vec<CustomerRef> = splitter
            .customers
            .iter()
            .filter(|c| self.keep_customer(c, matched))
            .cloned()
            .collect();
        let fiber_drop_lines: Vec<FiberLine> = splitter
            .fiber_drop_lines
            .iter()
            .filter(|l| self.keep_line(l, matched))
            .cloned()
            .collect();

        if !matched && !self.unconstrained() && customers.is_empty() && fiber_drop_lines.is_empty() {
            return None;
        }

        Some(Splitter {
            customers,
            fiber_drop_lines,
            ..splitter_header(splitter)
        })
    }

    fn filter_fdh(&self, fdh: &Fdh, ancestor_matched: bool) -> Option<Fdh> {
        let matched = ancestor_matched || self.fdh_matches(fdh);

        let splitters: Vec<Splitter> = fdh
            .splitters
            .iter()
            .filter_map(|sp| self.filter_splitter(sp, matched))
            .collect();

        if !matched && !self.unconstrained() && splitters.is_empty() {
            return None;
        }

        Some(Fdh {
            fdh_id: fdh.fdh_id.clone(),
            name: fdh.name.clone(),
            region: fdh.region.clone(),
            location: fdh.location.clone(),
            splitters,
        })
    }
}

fn customer_fields(customer: &CustomerRef) -> [Option<&str>; 4] {
    [
        customer.name.as_deref(),
        customer.customer_id.as_deref(),
        customer.splitter_port.as_deref(),
        customer.status.as_ref().map(Status::as_str),
    ]
}

fn splitter_header(splitter: &Splitter) -> Splitter {
    Splitter {
        splitter_id: splitter.splitter_id.clone(),
        name: splitter.name.clone(),
        model: splitter.model.clone(),
        port_capacity: splitter.port_capacity,
        customers: Vec::new(),
        fiber_drop_lines: Vec::new(),
    }
}

/// Prunes `topology` against `spec`, returning a structural copy.
///
/// `None` only when there is no document to filter.
pub fn filter(topology: Option<&Topology>, spec: &FilterSpec) -> Option<Topology> {
    let topology = topology?;
    let matcher = Matcher::new(spec);
    let headend_matched = matcher.headend_matches(topology);

    let fdhs = topology
        .fdhs
        .iter()
        .filter_map(|fdh| matcher.filter_fdh(fdh, headend_matched))
        .collect();

    Some(Topology {
        headend_id: topology.headend_id.clone(),
        name: topology.name.clone(),
        location: topology.location.clone(),
        fdhs,
    })
}
