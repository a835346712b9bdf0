//! Backend driving the iproute2 tools.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use super::{BackendCall, InterfaceOption, LinkState, NetworkBackend};
use crate::error::{Error, Result};
use crate::topology::ShapingSpec;

/// The runtime directory where named network namespaces are stored.
pub const NETNS_RUN_DIR: &str = "/var/run/netns";

/// Backend running `ip`, `bridge`, `tc` and `sysctl`.
///
/// Operations inside a namespace go through `ip netns exec`. A command
/// exiting non-zero becomes [`Error::Backend`] with its stderr.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    netns_dir: PathBuf,
}

impl CommandBackend {
    /// Create the backend, checking that the process runs as root.
    pub fn new() -> Result<Self> {
        check_privileges()?;
        Ok(Self {
            netns_dir: PathBuf::from(NETNS_RUN_DIR),
        })
    }

    /// Directory listing named namespaces.
    pub fn netns_dir(&self) -> &Path {
        &self.netns_dir
    }

    async fn run(&self, call: BackendCall) -> Result<()> {
        let argv = call.argv();
        let operation = call.to_string();
        debug!(command = %operation, "running backend command");

        let output = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::backend(operation.as_str(), format!("cannot run: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("exited with {}", output.status),
                text => text.to_string(),
            };
            return Err(Error::backend(operation, message));
        }

        Ok(())
    }
}

/// Fail with [`Error::PrivilegeRequired`] unless running as root.
pub fn check_privileges() -> Result<()> {
    // SAFETY: geteuid has no preconditions and cannot fail.
    let euid = unsafe { libc::geteuid() };
    if euid != 0 {
        return Err(Error::PrivilegeRequired(format!(
            "must run as root (effective uid {})",
            euid
        )));
    }
    Ok(())
}

/// Check if `tc qdisc del` failed because there was nothing to delete.
///
/// Interfaces without a configured root qdisc report either a zero handle
/// or ENOENT depending on the kernel and iproute2 version.
fn is_missing_qdisc(stderr: &str) -> bool {
    stderr.contains("Cannot delete qdisc with handle of zero")
        || stderr.contains("RTNETLINK answers: No such file or directory")
}

impl NetworkBackend for CommandBackend {
    async fn namespace_exists(&self, name: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.netns_dir.join(name)).await?)
    }

    async fn list_namespaces(&self) -> Result<Vec<String>> {
        let mut dir = match tokio::fs::read_dir(&self.netns_dir).await {
            Ok(dir) => dir,
            // No namespaces directory means no namespaces
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    async fn create_namespace(&self, name: &str) -> Result<()> {
        self.run(BackendCall::CreateNamespace { name: name.into() })
            .await
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        self.run(BackendCall::DeleteNamespace { name: name.into() })
            .await
    }

    async fn delete_all_namespaces(&self) -> Result<()> {
        self.run(BackendCall::DeleteAllNamespaces).await
    }

    async fn disable_ipv6(&self, ns: &str) -> Result<()> {
        self.run(BackendCall::DisableIpv6 { ns: ns.into() }).await
    }

    async fn create_bridge(&self, ns: &str, bridge: &str) -> Result<()> {
        self.run(BackendCall::CreateBridge {
            ns: ns.into(),
            bridge: bridge.into(),
        })
        .await
    }

    async fn delete_bridge(&self, ns: &str, bridge: &str) -> Result<()> {
        self.run(BackendCall::DeleteBridge {
            ns: ns.into(),
            bridge: bridge.into(),
        })
        .await
    }

    async fn create_cable_pair(&self, ns: &str, a: &str, b: &str) -> Result<()> {
        self.run(BackendCall::CreateCablePair {
            ns: ns.into(),
            a: a.into(),
            b: b.into(),
        })
        .await
    }

    async fn delete_cable_pair(&self, ns: &str, end: &str) -> Result<()> {
        self.run(BackendCall::DeleteCablePair {
            ns: ns.into(),
            end: end.into(),
        })
        .await
    }

    async fn move_to_namespace(&self, ns: &str, ifname: &str, target_ns: &str) -> Result<()> {
        self.run(BackendCall::MoveToNamespace {
            ns: ns.into(),
            ifname: ifname.into(),
            target_ns: target_ns.into(),
        })
        .await
    }

    async fn attach_to_bridge(&self, ns: &str, ifname: &str, bridge: &str) -> Result<()> {
        self.run(BackendCall::AttachToBridge {
            ns: ns.into(),
            ifname: ifname.into(),
            bridge: bridge.into(),
        })
        .await
    }

    async fn set_interface_state(&self, ns: &str, ifname: &str, state: LinkState) -> Result<()> {
        self.run(BackendCall::SetInterfaceState {
            ns: ns.into(),
            ifname: ifname.into(),
            state,
        })
        .await
    }

    async fn set_interface_option(
        &self,
        ns: &str,
        ifname: &str,
        option: InterfaceOption,
    ) -> Result<()> {
        self.run(BackendCall::SetInterfaceOption {
            ns: ns.into(),
            ifname: ifname.into(),
            option,
        })
        .await
    }

    async fn isolate_port(&self, ns: &str, ifname: &str) -> Result<()> {
        self.run(BackendCall::IsolatePort {
            ns: ns.into(),
            ifname: ifname.into(),
        })
        .await
    }

    async fn apply_shaping(&self, ns: &str, ifname: &str, spec: &ShapingSpec) -> Result<()> {
        self.run(BackendCall::ApplyShaping {
            ns: ns.into(),
            ifname: ifname.into(),
            spec: spec.as_str().into(),
        })
        .await
    }

    async fn clear_shaping(&self, ns: &str, ifname: &str) -> Result<()> {
        let result = self
            .run(BackendCall::ClearShaping {
                ns: ns.into(),
                ifname: ifname.into(),
            })
            .await;

        match result {
            Err(Error::Backend { message, .. }) if is_missing_qdisc(&message) => {
                debug!(ifname, "no root qdisc to delete");
                Ok(())
            }
            other => other,
        }
    }
}
