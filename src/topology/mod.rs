//! Topology engine: filtering, layout, styling and summaries
//!
//! Everything in here is pure and synchronous; the console recomputes it on
//! every state change.

pub mod filter;
pub mod graph;
pub mod style;
pub mod summary;
pub mod tree;

pub use self::filter::{filter, FilterSpec};
pub use self::graph::{to_graph, GraphLayout, GraphProjection};
pub use self::summary::{splitter_summary, SplitterSummaryRow};
pub use self::tree::{TreeState, TreeTarget, TreeView};
