//! Network control backends.
//!
//! The plan executor only talks to the [`NetworkBackend`] trait. Each call is
//! awaited to completion before the next one is issued, and any call may fail
//! with [`Error::Backend`](crate::Error::Backend).
//!
//! Two implementations are provided:
//!
//! - [`CommandBackend`]: drives `ip`, `bridge`, `tc` and `sysctl`. Requires root.
//! - [`RecordingBackend`]: records calls without touching the system. Used for
//!   dry runs and tests.

mod call;
mod command;
mod recording;

pub use call::BackendCall;
pub use command::{CommandBackend, NETNS_RUN_DIR, check_privileges};
pub use recording::RecordingBackend;

use crate::error::Result;
use crate::topology::ShapingSpec;

/// Administrative state of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Interface up.
    Up,
    /// Interface down.
    Down,
}

impl LinkState {
    /// Keyword used by `ip link set`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Per-interface flag the OS would otherwise use to send traffic on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceOption {
    /// ARP on or off.
    Arp(bool),
    /// Multicast on or off.
    Multicast(bool),
}

impl InterfaceOption {
    /// Keyword and value used by `ip link set`.
    pub fn ip_args(&self) -> [&'static str; 2] {
        let (name, on) = match self {
            Self::Arp(on) => ("arp", *on),
            Self::Multicast(on) => ("multicast", *on),
        };
        [name, if on { "on" } else { "off" }]
    }
}

/// Primitive operations on the live network.
///
/// `ns` arguments name the namespace the operation runs in. Bridges and cable
/// pairs normally live in the switch namespace.
#[allow(async_fn_in_trait)]
pub trait NetworkBackend {
    /// Check if a namespace exists.
    async fn namespace_exists(&self, name: &str) -> Result<bool>;

    /// List existing namespaces, sorted by name.
    async fn list_namespaces(&self) -> Result<Vec<String>>;

    /// Create a namespace.
    async fn create_namespace(&self, name: &str) -> Result<()>;

    /// Delete a namespace.
    async fn delete_namespace(&self, name: &str) -> Result<()>;

    /// Delete every namespace.
    async fn delete_all_namespaces(&self) -> Result<()>;

    /// Disable IPv6 for all interfaces in a namespace.
    async fn disable_ipv6(&self, ns: &str) -> Result<()>;

    /// Create a bridge that floods every frame to every port (STP off,
    /// ageing time 0, forward delay 0).
    async fn create_bridge(&self, ns: &str, bridge: &str) -> Result<()>;

    /// Delete a bridge. Its ports must already be gone.
    async fn delete_bridge(&self, ns: &str, bridge: &str) -> Result<()>;

    /// Create a cable pair `a`/`b`.
    async fn create_cable_pair(&self, ns: &str, a: &str, b: &str) -> Result<()>;

    /// Delete a cable pair by either end.
    async fn delete_cable_pair(&self, ns: &str, end: &str) -> Result<()>;

    /// Move an interface from `ns` into `target_ns`.
    async fn move_to_namespace(&self, ns: &str, ifname: &str, target_ns: &str) -> Result<()>;

    /// Attach an interface to a bridge.
    async fn attach_to_bridge(&self, ns: &str, ifname: &str, bridge: &str) -> Result<()>;

    /// Set an interface up or down.
    async fn set_interface_state(&self, ns: &str, ifname: &str, state: LinkState) -> Result<()>;

    /// Set an interface flag.
    async fn set_interface_option(
        &self,
        ns: &str,
        ifname: &str,
        option: InterfaceOption,
    ) -> Result<()>;

    /// Isolate a bridge port so it only forwards to non-isolated ports.
    async fn isolate_port(&self, ns: &str, ifname: &str) -> Result<()>;

    /// Install or replace the root qdisc of an interface.
    async fn apply_shaping(&self, ns: &str, ifname: &str, spec: &ShapingSpec) -> Result<()>;

    /// Remove the root qdisc of an interface.
    ///
    /// Succeeds if the interface has no root qdisc to remove.
    async fn clear_shaping(&self, ns: &str, ifname: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_args() {
        assert_eq!(InterfaceOption::Arp(false).ip_args(), ["arp", "off"]);
        assert_eq!(InterfaceOption::Multicast(true).ip_args(), ["multicast", "on"]);
        assert_eq!(LinkState::Up.as_str(), "up");
    }
}
