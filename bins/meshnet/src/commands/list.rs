//! meshnet list command implementation.
//!
//! Shows live namespaces and what each one is to the emulator.

use clap::Args;
use serde::Serialize;

use meshnet::NetworkBackend;
use meshnet::backend::CommandBackend;
use meshnet::names::{SWITCH_NAMESPACE, is_node_namespace};

#[derive(Args)]
pub struct ListCmd {
    /// Output JSON.
    #[arg(short = 'j', long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Role {
    Switch,
    Node,
    Other,
}

#[derive(Debug, Serialize)]
struct NamespaceInfo {
    name: String,
    role: Role,
}

impl NamespaceInfo {
    fn new(name: String) -> Self {
        let role = if name == SWITCH_NAMESPACE {
            Role::Switch
        } else if is_node_namespace(&name) {
            Role::Node
        } else {
            Role::Other
        };
        Self { name, role }
    }
}

impl ListCmd {
    pub async fn run(&self) -> anyhow::Result<()> {
        let backend = CommandBackend::new()?;
        let namespaces: Vec<NamespaceInfo> = backend
            .list_namespaces()
            .await?
            .into_iter()
            .map(NamespaceInfo::new)
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&namespaces)?);
        } else {
            for ns in &namespaces {
                println!("{}", ns.name);
            }
        }
        Ok(())
    }
}
