//! Reconciliation plans.
//!
//! [`reconcile`] compares two topologies and produces a
//! [`ReconciliationPlan`]; [`apply_plan`] executes it against a backend.
//!
//! # Example
//!
//! ```ignore
//! use meshnet::plan::{self, ApplyOptions};
//! use meshnet::backend::CommandBackend;
//!
//! let backend = CommandBackend::new()?;
//!
//! // Preview changes
//! let plan = plan::reconcile(&old, &new);
//! println!("{}", plan.summary());
//!
//! // Apply changes
//! let result = plan::apply_plan(&plan, &backend, &ApplyOptions::default()).await?;
//! println!("Made {} changes", result.changes_made);
//! ```

mod apply;
mod diff;

pub use apply::{ApplyOptions, ApplyResult, apply_plan};
pub use diff::{LinkUpdate, ReconciliationPlan, ShapingChange, reconcile};

use crate::backend::NetworkBackend;
use crate::error::Result;
use crate::topology::Topology;

/// Run one reconciliation cycle from `old` to `new`.
///
/// Nothing guards against a concurrent cycle on the same live network;
/// callers must not run two at once.
pub async fn change<B: NetworkBackend>(
    old: &Topology,
    new: &Topology,
    backend: &B,
    options: &ApplyOptions,
) -> Result<ApplyResult> {
    let plan = reconcile(old, new);
    debug_plan(&plan);
    apply_plan(&plan, backend, options).await
}

fn debug_plan(plan: &ReconciliationPlan) {
    tracing::debug!(
        nodes_create = plan.nodes_create.len(),
        nodes_remove = plan.nodes_remove.len(),
        links_create = plan.links_create.len(),
        links_remove = plan.links_remove.len(),
        links_update = plan.links_update.len(),
        "computed reconciliation plan"
    );
}
