//! Topology diffing.
//!
//! This module computes the reconciliation plan between two topologies.

use crate::topology::{Link, LinkKey, NodeName, ShapingSpec, Topology};

/// Operations needed to turn one topology into another.
///
/// A node key appears in at most one of the node lists and a link key in at
/// most one of the link lists. Every list is in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    /// Nodes to create.
    pub nodes_create: Vec<NodeName>,
    /// Nodes to remove.
    pub nodes_remove: Vec<NodeName>,
    /// Links to create, with the shaping they start with.
    pub links_create: Vec<Link>,
    /// Links to remove.
    pub links_remove: Vec<Link>,
    /// Links whose shaping changed.
    pub links_update: Vec<LinkUpdate>,
    /// Create the switch namespace before anything else.
    pub create_switch: bool,
    /// Remove the switch namespace after everything else.
    pub remove_switch: bool,
}

/// A link present on both sides with different shaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkUpdate {
    /// The link as it is now.
    pub old: Link,
    /// The link as it should be.
    pub new: Link,
}

/// Change of one direction's shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapingChange<'a> {
    /// Install or replace the spec.
    Set(&'a ShapingSpec),
    /// Remove the previous spec.
    Clear,
}

impl LinkUpdate {
    /// Canonical key of the updated link.
    pub fn key(&self) -> &LinkKey {
        self.new.key()
    }

    /// Change to the forward direction, if any.
    pub fn forward_change(&self) -> Option<ShapingChange<'_>> {
        shaping_change(self.old.forward_shaping(), self.new.forward_shaping())
    }

    /// Change to the reverse direction, if any.
    pub fn reverse_change(&self) -> Option<ShapingChange<'_>> {
        shaping_change(self.old.reverse_shaping(), self.new.reverse_shaping())
    }
}

fn shaping_change<'a>(
    old: Option<&ShapingSpec>,
    new: Option<&'a ShapingSpec>,
) -> Option<ShapingChange<'a>> {
    match (old, new) {
        (old, Some(new)) if old != Some(new) => Some(ShapingChange::Set(new)),
        (Some(_), None) => Some(ShapingChange::Clear),
        _ => None,
    }
}

impl ReconciliationPlan {
    /// Check if no changes are needed.
    pub fn is_empty(&self) -> bool {
        self.nodes_create.is_empty()
            && self.nodes_remove.is_empty()
            && self.links_create.is_empty()
            && self.links_remove.is_empty()
            && self.links_update.is_empty()
            && !self.create_switch
            && !self.remove_switch
    }

    /// Get the number of node and link changes.
    pub fn change_count(&self) -> usize {
        self.nodes_create.len()
            + self.nodes_remove.len()
            + self.links_create.len()
            + self.links_remove.len()
            + self.links_update.len()
    }

    /// Get a human-readable summary of the changes, in application order.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        if self.create_switch {
            lines.push("+ switch".to_string());
        }
        for update in &self.links_update {
            lines.push(format!("~ link {}", update.key()));
        }
        for node in &self.nodes_create {
            lines.push(format!("+ node {}", node));
        }
        for link in &self.links_create {
            lines.push(format!("+ link {}", link));
        }
        for link in &self.links_remove {
            lines.push(format!("- link {}", link));
        }
        for node in &self.nodes_remove {
            lines.push(format!("- node {}", node));
        }
        if self.remove_switch {
            lines.push("- switch".to_string());
        }

        if lines.is_empty() {
            "No changes needed".to_string()
        } else {
            lines.join("\n")
        }
    }
}

/// Compute the plan that turns `old` into `new`.
///
/// Pure set algebra over canonical keys: `reconcile(t, t)` is empty and
/// `reconcile(t, empty)` removes exactly what `reconcile(empty, t)` creates.
pub fn reconcile(old: &Topology, new: &Topology) -> ReconciliationPlan {
    let mut plan = ReconciliationPlan::default();

    diff_links(old, new, &mut plan);
    diff_nodes(old, new, &mut plan);

    plan.create_switch = old.is_empty() && !new.is_empty();
    plan.remove_switch = !old.is_empty() && new.is_empty();

    plan
}

fn diff_links(old: &Topology, new: &Topology, plan: &mut ReconciliationPlan) {
    for link in new.links() {
        match old.link(link.key()) {
            None => plan.links_create.push(link.clone()),
            Some(existing) if !existing.same_shaping(link) => {
                plan.links_update.push(LinkUpdate {
                    old: existing.clone(),
                    new: link.clone(),
                });
            }
            Some(_) => {}
        }
    }

    plan.links_remove = old
        .links()
        .filter(|link| !new.contains_link(link.key()))
        .cloned()
        .collect();
}

fn diff_nodes(old: &Topology, new: &Topology, plan: &mut ReconciliationPlan) {
    let old_nodes = old.nodes();
    let new_nodes = new.nodes();

    plan.nodes_remove = old_nodes
        .difference(&new_nodes)
        .map(|node| (*node).clone())
        .collect();
    plan.nodes_create = new_nodes
        .difference(&old_nodes)
        .map(|node| (*node).clone())
        .collect();
}
