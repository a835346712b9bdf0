//! Plan application.
//!
//! This module applies a reconciliation plan through a [`NetworkBackend`].

use tracing::{debug, info, warn};

use super::diff::{LinkUpdate, ReconciliationPlan, ShapingChange};
use crate::backend::{InterfaceOption, LinkState, NetworkBackend};
use crate::error::Result;
use crate::names::{LOOPBACK, SWITCH_NAMESPACE, UPLINK};
use crate::topology::{Link, NodeName};

/// Options for applying a plan.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Skip shaping: no shaping updates, and new links are created unshaped.
    pub ignore_shaping: bool,
    /// Turn ARP off on every interface brought up.
    pub block_arp: bool,
    /// Turn multicast off on every interface brought up.
    pub block_multicast: bool,
}

/// Result of applying a plan.
#[derive(Debug, Default)]
pub struct ApplyResult {
    /// Number of node and link changes made.
    pub changes_made: usize,
    /// Summary of what was done, in order.
    pub summary: Vec<String>,
}

impl ApplyResult {
    /// Get a human-readable summary.
    pub fn summary_text(&self) -> String {
        if self.summary.is_empty() {
            "No changes made".to_string()
        } else {
            self.summary.join("\n")
        }
    }

    fn change(&mut self, what: String) {
        self.changes_made += 1;
        self.summary.push(what);
    }
}

/// Apply a plan.
///
/// Phases run in a fixed order so that every operation finds what it needs
/// and nothing in use is removed early:
/// 1. Create the switch namespace (first reconciliation only)
/// 2. Update shaping on existing links
/// 3. Create nodes
/// 4. Create links
/// 5. Remove links
/// 6. Remove nodes
/// 7. Remove the switch namespace (full teardown only)
///
/// The first failing backend call aborts the run. Steps already applied stay
/// in place; the error carries the step that failed.
pub async fn apply_plan<B: NetworkBackend>(
    plan: &ReconciliationPlan,
    backend: &B,
    options: &ApplyOptions,
) -> Result<ApplyResult> {
    let mut result = ApplyResult::default();

    // If no changes needed, return early
    if plan.is_empty() {
        return Ok(result);
    }

    let executor = Executor { backend, options };

    // 1. Switch namespace
    if plan.create_switch {
        info!("creating switch namespace");
        executor
            .create_switch()
            .await
            .map_err(|e| e.with_context("create switch"))?;
        result.summary.push("Created switch".to_string());
    }

    // 2. Shaping updates
    if options.ignore_shaping {
        if !plan.links_update.is_empty() {
            debug!(
                count = plan.links_update.len(),
                "ignoring shaping updates"
            );
        }
    } else {
        for update in &plan.links_update {
            let step = format!("update link {}", update.key());
            info!("{}", step);
            executor
                .update_link(update)
                .await
                .map_err(|e| e.with_context(step.as_str()))?;
            result.change(format!("Updated link {}", update.key()));
        }
    }

    // 3. Create nodes
    for node in &plan.nodes_create {
        let step = format!("create node {}", node);
        info!("{}", step);
        executor
            .create_node(node)
            .await
            .map_err(|e| e.with_context(step.as_str()))?;
        result.change(format!("Created node {}", node));
    }

    // 4. Create links
    for link in &plan.links_create {
        let step = format!("create link {}", link);
        info!("{}", step);
        executor
            .create_link(link)
            .await
            .map_err(|e| e.with_context(step.as_str()))?;
        result.change(format!("Created link {}", link));
    }

    // 5. Remove links
    for link in &plan.links_remove {
        let step = format!("remove link {}", link);
        info!("{}", step);
        executor
            .remove_link(link)
            .await
            .map_err(|e| e.with_context(step.as_str()))?;
        result.change(format!("Removed link {}", link));
    }

    // 6. Remove nodes
    for node in &plan.nodes_remove {
        let step = format!("remove node {}", node);
        info!("{}", step);
        executor
            .remove_node(node)
            .await
            .map_err(|e| e.with_context(step.as_str()))?;
        result.change(format!("Removed node {}", node));
    }

    // 7. Switch namespace
    if plan.remove_switch {
        info!("removing switch namespace");
        if executor.remove_switch().await {
            result.summary.push("Removed switch".to_string());
        }
    }

    Ok(result)
}

struct Executor<'a, B> {
    backend: &'a B,
    options: &'a ApplyOptions,
}

impl<B: NetworkBackend> Executor<'_, B> {
    /// Bring an interface up and apply the blocking options.
    async fn configure_interface(&self, ns: &str, ifname: &str) -> Result<()> {
        self.backend
            .set_interface_state(ns, ifname, LinkState::Up)
            .await?;

        // ARP and multicast stay on unless blocked
        if self.options.block_arp {
            self.backend
                .set_interface_option(ns, ifname, InterfaceOption::Arp(false))
                .await?;
        }
        if self.options.block_multicast {
            self.backend
                .set_interface_option(ns, ifname, InterfaceOption::Multicast(false))
                .await?;
        }
        Ok(())
    }

    async fn create_switch(&self) -> Result<()> {
        if self.backend.namespace_exists(SWITCH_NAMESPACE).await? {
            debug!("switch namespace already exists");
        } else {
            self.backend.create_namespace(SWITCH_NAMESPACE).await?;
        }
        self.backend.disable_ipv6(SWITCH_NAMESPACE).await
    }

    /// Returns whether the switch was removed. Failure is tolerated.
    async fn remove_switch(&self) -> bool {
        match self.backend.delete_namespace(SWITCH_NAMESPACE).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to remove switch namespace");
                false
            }
        }
    }

    async fn create_node(&self, node: &NodeName) -> Result<()> {
        let ns = node.namespace();
        let bridge = node.bridge();
        let downlink = node.downlink();

        self.backend.create_namespace(&ns).await?;
        self.backend
            .set_interface_state(&ns, LOOPBACK, LinkState::Up)
            .await?;

        self.backend.create_bridge(SWITCH_NAMESPACE, &bridge).await?;
        self.configure_interface(SWITCH_NAMESPACE, &bridge).await?;

        // Shim pair: uplink inside the node, downlink on the node's bridge
        self.backend
            .create_cable_pair(SWITCH_NAMESPACE, UPLINK, &downlink)
            .await?;
        self.backend
            .move_to_namespace(SWITCH_NAMESPACE, UPLINK, &ns)
            .await?;
        self.backend
            .attach_to_bridge(SWITCH_NAMESPACE, &downlink, &bridge)
            .await?;

        self.configure_interface(SWITCH_NAMESPACE, &downlink).await?;
        self.configure_interface(&ns, UPLINK).await
    }

    async fn remove_node(&self, node: &NodeName) -> Result<()> {
        // Removes the uplink end as well
        self.backend
            .delete_cable_pair(SWITCH_NAMESPACE, &node.downlink())
            .await?;
        self.backend
            .delete_bridge(SWITCH_NAMESPACE, &node.bridge())
            .await?;
        self.backend.delete_namespace(&node.namespace()).await
    }

    async fn create_link(&self, link: &Link) -> Result<()> {
        let forward = link.forward_interface();
        let reverse = link.reverse_interface();

        self.backend
            .create_cable_pair(SWITCH_NAMESPACE, &forward, &reverse)
            .await?;
        self.configure_interface(SWITCH_NAMESPACE, &forward).await?;
        self.configure_interface(SWITCH_NAMESPACE, &reverse).await?;

        self.backend
            .attach_to_bridge(SWITCH_NAMESPACE, &forward, &link.source().bridge())
            .await?;
        self.backend
            .attach_to_bridge(SWITCH_NAMESPACE, &reverse, &link.target().bridge())
            .await?;

        // Isolated ports only talk to the node's downlink, never to other
        // links on the same bridge
        self.backend
            .isolate_port(SWITCH_NAMESPACE, &forward)
            .await?;
        self.backend
            .isolate_port(SWITCH_NAMESPACE, &reverse)
            .await?;

        if self.options.ignore_shaping {
            return Ok(());
        }
        if let Some(spec) = link.forward_shaping() {
            self.backend
                .apply_shaping(SWITCH_NAMESPACE, &forward, spec)
                .await?;
        }
        if let Some(spec) = link.reverse_shaping() {
            self.backend
                .apply_shaping(SWITCH_NAMESPACE, &reverse, spec)
                .await?;
        }
        Ok(())
    }

    async fn update_link(&self, update: &LinkUpdate) -> Result<()> {
        let directions = [
            (update.new.forward_interface(), update.forward_change()),
            (update.new.reverse_interface(), update.reverse_change()),
        ];

        for (ifname, change) in directions {
            match change {
                Some(ShapingChange::Set(spec)) => {
                    self.backend
                        .apply_shaping(SWITCH_NAMESPACE, &ifname, spec)
                        .await?;
                }
                Some(ShapingChange::Clear) => {
                    self.backend.clear_shaping(SWITCH_NAMESPACE, &ifname).await?;
                }
                None => {}
            }
        }
        Ok(())
    }

    async fn remove_link(&self, link: &Link) -> Result<()> {
        self.backend
            .delete_cable_pair(SWITCH_NAMESPACE, &link.forward_interface())
            .await
    }
}
