//! Topology reconciliation for namespace-based mesh network emulation.
//!
//! Every emulated node is a Linux network namespace with its own bridge; links
//! between nodes are cable pairs (veth) between bridges, optionally shaped with
//! `tc`. This crate computes the changes needed to go from one topology to
//! another and applies them in a safe order.
//!
//! # Modules
//!
//! - [`topology`]: canonical topology model and JSON descriptions
//! - [`plan`]: diff engine and plan executor
//! - [`backend`]: the network control backend trait and its implementations
//! - [`names`]: node name rules and derived namespace/interface names
//!
//! # Example
//!
//! ```ignore
//! use meshnet::backend::CommandBackend;
//! use meshnet::plan::{self, ApplyOptions};
//! use meshnet::topology::TopologySource;
//!
//! #[tokio::main]
//! async fn main() -> meshnet::Result<()> {
//!     let backend = CommandBackend::new()?;
//!     let old = TopologySource::parse("none").load().await?;
//!     let new = TopologySource::parse("mesh.json").load().await?;
//!
//!     let result = plan::change(&old, &new, &backend, &ApplyOptions::default()).await?;
//!     println!("{}", result.summary_text());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod names;
pub mod plan;
pub mod topology;

// Re-export common types at crate root for convenience
pub use backend::NetworkBackend;
pub use error::{Error, Result};
pub use plan::{ApplyOptions, ApplyResult, ReconciliationPlan, change, reconcile};
pub use topology::{Topology, TopologySource};
