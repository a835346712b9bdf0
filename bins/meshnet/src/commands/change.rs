//! meshnet change command implementation.
//!
//! Moves the live network from the topology it currently has to a new one.
//! The caller names the current topology; nothing is read back from the
//! system to discover it.

use anyhow::Context;
use clap::Args;

use meshnet::backend::{CommandBackend, RecordingBackend};
use meshnet::names::SWITCH_NAMESPACE;
use meshnet::plan::{self, ApplyOptions};
use meshnet::topology::{Topology, TopologySource};

#[derive(Args)]
pub struct ChangeCmd {
    /// Current topology: a JSON file or `none`.
    from: String,

    /// Desired topology: a JSON file or `none`.
    to: String,

    /// Print the plan and the commands it would run without running them.
    #[arg(short = 'n', long)]
    dry_run: bool,
}

impl ChangeCmd {
    pub async fn run(&self, options: &ApplyOptions) -> anyhow::Result<()> {
        let old = TopologySource::parse(&self.from).load().await?;
        let new = TopologySource::parse(&self.to).load().await?;

        if self.dry_run {
            return dry_run(&old, &new, options).await;
        }

        let backend = CommandBackend::new()?;
        let result = plan::change(&old, &new, &backend, options).await?;
        println!("{}", result.summary_text());
        Ok(())
    }
}

/// Run the plan against a recording backend seeded with the namespaces
/// `old` implies, then print what was recorded.
async fn dry_run(old: &Topology, new: &Topology, options: &ApplyOptions) -> anyhow::Result<()> {
    let plan = plan::reconcile(old, new);
    println!("{}", plan.summary());
    if plan.is_empty() {
        return Ok(());
    }

    let backend = RecordingBackend::new().with_namespaces(live_namespaces(old));
    plan::apply_plan(&plan, &backend, options)
        .await
        .context("dry run failed")?;

    println!();
    for command in backend.commands() {
        println!("{}", command);
    }
    Ok(())
}

fn live_namespaces(topology: &Topology) -> Vec<String> {
    if topology.is_empty() {
        return Vec::new();
    }
    let mut names = vec![SWITCH_NAMESPACE.to_string()];
    names.extend(topology.nodes().into_iter().map(|node| node.namespace()));
    names
}
