//! Node name validation and the names derived from node names.
//!
//! Every emulated node `n` owns a namespace `ns-n`, a bridge `br-n` and a
//! shim cable pair `uplink`/`dl-n`. A link between `a` and `b` is the cable
//! pair `v-a-b`/`v-b-a`. All of these live in the [`SWITCH_NAMESPACE`] except
//! the node namespace itself and the `uplink` end moved into it.

/// Maximum interface name length (including null terminator).
pub const IFNAMSIZ: usize = 16;

/// Maximum node name length.
///
/// Counted in bytes, not characters: interface names are limited by bytes,
/// so a name like `äöüäöü` (six characters, twelve bytes) is too long. Two
/// names plus the `v-` prefix and the `-` separator must fit in
/// `IFNAMSIZ - 1`.
pub const MAX_NODE_NAME_LEN: usize = 6;

/// Shared namespace hosting every bridge and cable pair.
pub const SWITCH_NAMESPACE: &str = "switch";

/// Name of the shim interface inside each node namespace.
pub const UPLINK: &str = "uplink";

/// Loopback interface.
pub const LOOPBACK: &str = "lo";

/// Prefix of node namespaces.
pub const NODE_NAMESPACE_PREFIX: &str = "ns-";

/// Validate a node name.
///
/// Returns a description of the problem on failure.
pub fn validate_node_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("empty node name".to_string());
    }

    if name.len() > MAX_NODE_NAME_LEN {
        return Err(format!(
            "node name too long: {} (max {} bytes)",
            name, MAX_NODE_NAME_LEN
        ));
    }

    if name.contains('/') || name.contains('\0') {
        return Err(format!("node name contains invalid characters: {:?}", name));
    }

    if name.chars().any(|c| c.is_whitespace()) {
        return Err(format!("node name contains whitespace: {:?}", name));
    }

    Ok(())
}

/// Namespace of a node.
pub fn node_namespace(node: &str) -> String {
    format!("{}{}", NODE_NAMESPACE_PREFIX, node)
}

/// Bridge of a node, inside the switch namespace.
pub fn node_bridge(node: &str) -> String {
    format!("br-{}", node)
}

/// Switch-side end of a node's shim cable pair.
pub fn node_downlink(node: &str) -> String {
    format!("dl-{}", node)
}

/// Interface of the link `from <-> to` attached to `from`'s bridge.
///
/// Its egress carries traffic from `from` towards `to`.
pub fn link_interface(from: &str, to: &str) -> String {
    format!("v-{}-{}", from, to)
}

/// Check if a namespace name belongs to an emulated node.
pub fn is_node_namespace(name: &str) -> bool {
    name.strip_prefix(NODE_NAMESPACE_PREFIX)
        .is_some_and(|node| validate_node_name(node).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(validate_node_name("a").is_ok());
        assert!(validate_node_name("node01").is_ok());
        assert!(validate_node_name("12").is_ok());

        assert!(validate_node_name("").is_err());
        assert!(validate_node_name("toolongname").is_err());
        assert!(validate_node_name("a/b").is_err());
        assert!(validate_node_name("a b").is_err());
        assert!(validate_node_name("äöüäöü").is_err());

        assert!(validate_node_name("node-1").is_ok());
        assert!(validate_node_name("äöü").is_ok());
    }

    #[test]
    fn test_too_long_message_names_the_node() {
        let err = validate_node_name("toolongname").unwrap_err();
        assert!(err.contains("toolongname"));
    }

    #[test]
    fn test_derived_names_fit_ifnamsiz() {
        let longest = "abcdef";
        assert_eq!(longest.len(), MAX_NODE_NAME_LEN);

        for name in [
            node_bridge(longest),
            node_downlink(longest),
            link_interface(longest, "zzzzzz"),
        ] {
            assert!(name.len() < IFNAMSIZ, "{} too long", name);
        }
    }

    #[test]
    fn test_link_interfaces_are_directional() {
        assert_eq!(link_interface("b", "a"), "v-b-a");
        assert_eq!(link_interface("a", "b"), "v-a-b");
    }

    #[test]
    fn test_is_node_namespace() {
        assert!(is_node_namespace("ns-a"));
        assert!(!is_node_namespace("switch"));
        assert!(!is_node_namespace("ns-"));
        assert!(!is_node_namespace("docker"));
    }
}
