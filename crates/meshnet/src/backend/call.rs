//! Backend calls as values.

use std::fmt;

use super::{InterfaceOption, LinkState};

/// One mutating backend operation with its arguments.
///
/// The [`argv`](BackendCall::argv) rendering is the command line
/// [`CommandBackend`](super::CommandBackend) runs for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    CreateNamespace {
        name: String,
    },
    DeleteNamespace {
        name: String,
    },
    DeleteAllNamespaces,
    DisableIpv6 {
        ns: String,
    },
    CreateBridge {
        ns: String,
        bridge: String,
    },
    DeleteBridge {
        ns: String,
        bridge: String,
    },
    CreateCablePair {
        ns: String,
        a: String,
        b: String,
    },
    DeleteCablePair {
        ns: String,
        end: String,
    },
    MoveToNamespace {
        ns: String,
        ifname: String,
        target_ns: String,
    },
    AttachToBridge {
        ns: String,
        ifname: String,
        bridge: String,
    },
    SetInterfaceState {
        ns: String,
        ifname: String,
        state: LinkState,
    },
    SetInterfaceOption {
        ns: String,
        ifname: String,
        option: InterfaceOption,
    },
    IsolatePort {
        ns: String,
        ifname: String,
    },
    ApplyShaping {
        ns: String,
        ifname: String,
        spec: String,
    },
    ClearShaping {
        ns: String,
        ifname: String,
    },
}

impl BackendCall {
    /// Namespace the call runs in, if it runs inside one.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::CreateNamespace { .. }
            | Self::DeleteNamespace { .. }
            | Self::DeleteAllNamespaces => None,
            Self::DisableIpv6 { ns }
            | Self::CreateBridge { ns, .. }
            | Self::DeleteBridge { ns, .. }
            | Self::CreateCablePair { ns, .. }
            | Self::DeleteCablePair { ns, .. }
            | Self::MoveToNamespace { ns, .. }
            | Self::AttachToBridge { ns, .. }
            | Self::SetInterfaceState { ns, .. }
            | Self::SetInterfaceOption { ns, .. }
            | Self::IsolatePort { ns, .. }
            | Self::ApplyShaping { ns, .. }
            | Self::ClearShaping { ns, .. } => Some(ns.as_str()),
        }
    }

    /// Command line implementing this call.
    pub fn argv(&self) -> Vec<String> {
        let mut argv: Vec<String> = Vec::new();
        if let Some(ns) = self.namespace() {
            argv.extend(["ip", "netns", "exec", ns].map(String::from));
        }

        let tail: Vec<&str> = match self {
            Self::CreateNamespace { name } => vec!["ip", "netns", "add", name.as_str()],
            Self::DeleteNamespace { name } => vec!["ip", "netns", "delete", name.as_str()],
            Self::DeleteAllNamespaces => vec!["ip", "-all", "netns", "delete"],
            Self::DisableIpv6 { .. } => {
                vec!["sysctl", "-q", "-w", "net.ipv6.conf.all.disable_ipv6=1"]
            }
            Self::CreateBridge { bridge, .. } => vec![
                "ip",
                "link",
                "add",
                "name",
                bridge.as_str(),
                "type",
                "bridge",
                "stp_state",
                "0",
                "ageing_time",
                "0",
                "forward_delay",
                "0",
            ],
            Self::DeleteBridge { bridge, .. } => {
                vec!["ip", "link", "delete", bridge.as_str(), "type", "bridge"]
            }
            Self::CreateCablePair { a, b, .. } => vec![
                "ip",
                "link",
                "add",
                "name",
                a.as_str(),
                "type",
                "veth",
                "peer",
                "name",
                b.as_str(),
            ],
            Self::DeleteCablePair { end, .. } => vec!["ip", "link", "delete", end.as_str()],
            Self::MoveToNamespace {
                ifname, target_ns, ..
            } => vec![
                "ip",
                "link",
                "set",
                ifname.as_str(),
                "netns",
                target_ns.as_str(),
            ],
            Self::AttachToBridge { ifname, bridge, .. } => {
                vec!["ip", "link", "set", ifname.as_str(), "master", bridge.as_str()]
            }
            Self::SetInterfaceState { ifname, state, .. } => {
                vec!["ip", "link", "set", "dev", ifname.as_str(), state.as_str()]
            }
            Self::SetInterfaceOption { ifname, option, .. } => {
                let mut v = vec!["ip", "link", "set", "dev", ifname.as_str()];
                v.extend(option.ip_args());
                v
            }
            Self::IsolatePort { ifname, .. } => {
                vec!["bridge", "link", "set", "dev", ifname.as_str(), "isolated", "on"]
            }
            Self::ApplyShaping { ifname, spec, .. } => {
                let mut v = vec!["tc", "qdisc", "replace", "dev", ifname.as_str(), "root"];
                v.extend(spec.split_whitespace());
                v
            }
            Self::ClearShaping { ifname, .. } => {
                vec!["tc", "qdisc", "del", "dev", ifname.as_str(), "root"]
            }
        };

        argv.extend(tail.into_iter().map(String::from));
        argv
    }
}

impl fmt::Display for BackendCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_commands() {
        let call = BackendCall::CreateNamespace {
            name: "ns-a".into(),
        };
        assert_eq!(call.to_string(), "ip netns add ns-a");
        assert_eq!(
            BackendCall::DeleteAllNamespaces.to_string(),
            "ip -all netns delete"
        );
    }

    #[test]
    fn test_namespaced_commands() {
        let call = BackendCall::IsolatePort {
            ns: "switch".into(),
            ifname: "v-b-a".into(),
        };
        assert_eq!(
            call.to_string(),
            "ip netns exec switch bridge link set dev v-b-a isolated on"
        );

        let call = BackendCall::SetInterfaceOption {
            ns: "ns-a".into(),
            ifname: "uplink".into(),
            option: InterfaceOption::Arp(false),
        };
        assert_eq!(
            call.to_string(),
            "ip netns exec ns-a ip link set dev uplink arp off"
        );
    }

    #[test]
    fn test_shaping_spec_is_split() {
        let call = BackendCall::ApplyShaping {
            ns: "switch".into(),
            ifname: "v-b-a".into(),
            spec: "netem  delay 20ms".into(),
        };
        let argv = call.argv();
        assert_eq!(
            &argv[4..],
            ["tc", "qdisc", "replace", "dev", "v-b-a", "root", "netem", "delay", "20ms"]
        );
    }
}
