//! Data models for the fiber topology console

pub mod lenient;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Status
// ============================================================================

/// Operational status of a fiber line or customer.
///
/// Parsed case-insensitively. Anything unrecognised is kept verbatim as
/// `Unknown` so it still renders (with the neutral style) instead of being
/// silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Active,
    Pending,
    Inactive,
    Disconnected,
    Deactivated,
    Unknown(String),
}

impl Status {
    pub fn parse(s: &str) -> Self {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "ACTIVE" => Status::Active,
            "PENDING" => Status::Pending,
            "INACTIVE" => Status::Inactive,
            "DISCONNECTED" => Status::Disconnected,
            "DEACTIVATED" => Status::Deactivated,
            _ => Status::Unknown(upper),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Active => "ACTIVE",
            Status::Pending => "PENDING",
            Status::Inactive => "INACTIVE",
            Status::Disconnected => "DISCONNECTED",
            Status::Deactivated => "DEACTIVATED",
            Status::Unknown(s) => s,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Status::Active)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Status::parse(s))
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Status::parse(&s))
    }
}

// ============================================================================
// Node kinds
// ============================================================================

/// Level of a node in the Headend → FDH → Splitter → Line → Customer hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Headend,
    Fdh,
    Splitter,
    Line,
    Customer,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Headend => "headend",
            NodeKind::Fdh => "fdh",
            NodeKind::Splitter => "splitter",
            NodeKind::Line => "line",
            NodeKind::Customer => "customer",
        }
    }

    /// Graph column, counted from the headend
    pub fn level(&self) -> u32 {
        match self {
            NodeKind::Headend => 0,
            NodeKind::Fdh => 1,
            NodeKind::Splitter => 2,
            NodeKind::Line => 3,
            NodeKind::Customer => 4,
        }
    }

    /// Entity type name used by the backend audit log
    pub fn audit_entity_type(&self) -> &'static str {
        match self {
            NodeKind::Headend => "HEADEND",
            NodeKind::Fdh => "FDH",
            NodeKind::Splitter => "SPLITTER",
            NodeKind::Line => "FIBER_DROP_LINE",
            NodeKind::Customer => "CUSTOMER",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Topology document
// ============================================================================

/// Root of the nested topology document returned by `GET /api/topology/{headendId}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "TopologyPayload")]
pub struct Topology {
    pub headend_id: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub fdhs: Vec<Fdh>,
}

/// Wire form of [`Topology`]. The backend sends `headendName`/`headendLocation`,
/// older payloads `name`/`location`, some both.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopologyPayload {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    headend_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    headend_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    headend_location: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    location: Option<String>,
    #[serde(default, deserialize_with = "lenient::seq")]
    fdhs: Vec<Fdh>,
}

impl From<TopologyPayload> for Topology {
    fn from(raw: TopologyPayload) -> Self {
        Self {
            headend_id: raw.headend_id,
            name: raw.headend_name.or(raw.name),
            location: raw.headend_location.or(raw.location),
            fdhs: raw.fdhs,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fdh {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub fdh_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub splitters: Vec<Splitter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Splitter {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub splitter_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub port_capacity: Option<u32>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub customers: Vec<CustomerRef>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub fiber_drop_lines: Vec<FiberLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiberLine {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub line_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub length_meters: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_status")]
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "lenient::opt_object")]
    pub customer: Option<CustomerRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRef {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub customer_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub splitter_port: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_status")]
    pub status: Option<Status>,
}

impl Topology {
    #[cfg(test)]
    pub fn splitters(&self) -> impl Iterator<Item = &Splitter> {
        self.fdhs.iter().flat_map(|f| f.splitters.iter())
    }

    #[cfg(test)]
    pub fn fiber_lines(&self) -> impl Iterator<Item = &FiberLine> {
        self.splitters().flat_map(|s| s.fiber_drop_lines.iter())
    }

    #[cfg(test)]
    pub fn customers(&self) -> impl Iterator<Item = &CustomerRef> {
        self.splitters().flat_map(|s| s.customers.iter())
    }
}

// ============================================================================
// Inventory backend payloads
// ============================================================================

/// Entry of the root selector, from `GET /api/topology/headends`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadendSummary {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub headend_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
}

/// Drill-down details from `GET /api/topology/customer/{customerId}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerNodeDetails {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub customer_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_status")]
    pub status: Option<Status>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub splitter_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub splitter_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub splitter_port: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ont_serial: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_status")]
    pub ont_status: Option<Status>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub router_serial: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_status")]
    pub router_status: Option<Status>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub fiber_line_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub fiber_length_meters: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_status")]
    pub fiber_status: Option<Status>,
}

/// Body of `POST /api/audit/log`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub action: String,
    pub entity_type: String,
    pub entity_id: i64,
    pub details: String,
}

impl AuditEvent {
    pub const TOPOLOGY_VIEW: &'static str = "TOPOLOGY_VIEW";
    pub const TOPOLOGY_NODE_VIEW: &'static str = "TOPOLOGY_NODE_VIEW";
    pub const TOPOLOGY_EXPORT: &'static str = "TOPOLOGY_EXPORT";

    /// Builds an event for a domain id. The backend only accepts numeric ids,
    /// so `None` is returned for anything that does not parse as one.
    pub fn for_entity(
        action: &str,
        kind: NodeKind,
        id: Option<&str>,
        details: impl Into<String>,
    ) -> Option<Self> {
        let entity_id = id?.trim().parse::<i64>().ok()?;
        Some(Self {
            action: action.to_string(),
            entity_type: kind.audit_entity_type().to_string(),
            entity_id,
            details: details.into(),
        })
    }
}
