//! Canonical in-memory topology model.

use std::collections::btree_map::{BTreeMap, Entry};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::names;

// ============================================================================
// Nodes
// ============================================================================

/// Validated node identifier.
///
/// Ordered by byte value; that order decides which endpoint of a link is
/// the canonical source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeName(String);

impl NodeName {
    /// Validate and wrap a node name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        names::validate_node_name(&name).map_err(Error::InvalidTopology)?;
        Ok(Self(name))
    }

    /// Get the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace representing this node.
    pub fn namespace(&self) -> String {
        names::node_namespace(&self.0)
    }

    /// Bridge of this node inside the switch namespace.
    pub fn bridge(&self) -> String {
        names::node_bridge(&self.0)
    }

    /// Switch-side end of this node's shim cable pair.
    pub fn downlink(&self) -> String {
        names::node_downlink(&self.0)
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Shaping
// ============================================================================

/// Opaque traffic shaping spec, e.g. `netem delay 20ms loss 1%`.
///
/// Interpreted by the backend as the arguments following
/// `tc qdisc replace dev <if> root`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapingSpec(String);

impl ShapingSpec {
    /// Wrap a shaping spec. Blank specs are rejected.
    pub fn new(spec: impl Into<String>) -> Result<Self> {
        let spec = spec.into();
        if spec.trim().is_empty() {
            return Err(Error::invalid_topology("empty shaping spec"));
        }
        Ok(Self(spec))
    }

    /// Get the spec text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whitespace-separated arguments of the spec.
    pub fn args(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }
}

impl fmt::Display for ShapingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Links
// ============================================================================

/// Canonical key of an undirected link: the endpoint pair, greater first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkKey {
    source: NodeName,
    target: NodeName,
}

impl LinkKey {
    /// Build the key for a pair of endpoints in either order.
    pub fn new(a: NodeName, b: NodeName) -> Result<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Ok(Self {
                source: a,
                target: b,
            }),
            std::cmp::Ordering::Less => Ok(Self {
                source: b,
                target: a,
            }),
            std::cmp::Ordering::Equal => Err(Error::invalid_topology(format!(
                "link connects node {} to itself",
                a
            ))),
        }
    }

    /// The greater endpoint.
    pub fn source(&self) -> &NodeName {
        &self.source
    }

    /// The lesser endpoint.
    pub fn target(&self) -> &NodeName {
        &self.target
    }

    /// Check if `node` is one of the endpoints.
    pub fn touches(&self, node: &NodeName) -> bool {
        &self.source == node || &self.target == node
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.source, self.target)
    }
}

/// A canonical link with its directional shaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    key: LinkKey,
    forward: Option<ShapingSpec>,
    reverse: Option<ShapingSpec>,
}

impl Link {
    /// Canonicalize a link as described from `source` to `target`.
    ///
    /// `source_tc` shapes traffic from `source` to `target`, `target_tc`
    /// the opposite direction. The fields are swapped when `target` is the
    /// greater endpoint so that the same link always lands in the same shape.
    pub fn new(
        source: NodeName,
        target: NodeName,
        source_tc: Option<ShapingSpec>,
        target_tc: Option<ShapingSpec>,
    ) -> Result<Self> {
        let swapped = source < target;
        let key = LinkKey::new(source, target)?;
        let (forward, reverse) = if swapped {
            (target_tc, source_tc)
        } else {
            (source_tc, target_tc)
        };
        Ok(Self {
            key,
            forward,
            reverse,
        })
    }

    /// Canonical key.
    pub fn key(&self) -> &LinkKey {
        &self.key
    }

    /// The greater endpoint.
    pub fn source(&self) -> &NodeName {
        &self.key.source
    }

    /// The lesser endpoint.
    pub fn target(&self) -> &NodeName {
        &self.key.target
    }

    /// Shaping of traffic from the greater endpoint to the lesser one.
    pub fn forward_shaping(&self) -> Option<&ShapingSpec> {
        self.forward.as_ref()
    }

    /// Shaping of traffic from the lesser endpoint to the greater one.
    pub fn reverse_shaping(&self) -> Option<&ShapingSpec> {
        self.reverse.as_ref()
    }

    /// Interface carrying forward traffic (attached to the source bridge).
    pub fn forward_interface(&self) -> String {
        names::link_interface(self.source().as_str(), self.target().as_str())
    }

    /// Interface carrying reverse traffic (attached to the target bridge).
    pub fn reverse_interface(&self) -> String {
        names::link_interface(self.target().as_str(), self.source().as_str())
    }

    /// Check if both directions carry the same shaping as `other`.
    pub fn same_shaping(&self, other: &Link) -> bool {
        self.forward == other.forward && self.reverse == other.reverse
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key.fmt(f)
    }
}

// ============================================================================
// Topology
// ============================================================================

/// A set of canonical links and the nodes they imply.
///
/// Nodes are never stored on their own: a node exists exactly when at least
/// one link names it as an endpoint. A topology therefore cannot describe a
/// node without links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    links: BTreeMap<LinkKey, Link>,
}

impl Topology {
    /// Create an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a topology from canonical links.
    ///
    /// Fails if two links share a key, or if two link ends would get the
    /// same interface name. Names containing `-` can collide: `a-b` to `c`
    /// and `a` to `b-c` both derive `v-a-b-c`.
    pub fn from_links(links: impl IntoIterator<Item = Link>) -> Result<Self> {
        let mut map = BTreeMap::new();
        let mut interfaces: BTreeMap<String, LinkKey> = BTreeMap::new();

        for link in links {
            let entry = match map.entry(link.key().clone()) {
                Entry::Occupied(entry) => {
                    return Err(Error::invalid_topology(format!(
                        "duplicate link {}",
                        entry.key()
                    )));
                }
                Entry::Vacant(entry) => entry,
            };

            for ifname in [link.forward_interface(), link.reverse_interface()] {
                if let Some(owner) = interfaces.get(&ifname) {
                    return Err(Error::invalid_topology(format!(
                        "links {} and {} both derive interface {}",
                        owner,
                        link.key(),
                        ifname
                    )));
                }
                interfaces.insert(ifname, link.key().clone());
            }

            entry.insert(link);
        }
        Ok(Self { links: map })
    }

    /// Check if the topology has no links (and so no nodes).
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Links in key order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// Look up a link by key.
    pub fn link(&self, key: &LinkKey) -> Option<&Link> {
        self.links.get(key)
    }

    /// Check if a link with this key exists.
    pub fn contains_link(&self, key: &LinkKey) -> bool {
        self.links.contains_key(key)
    }

    /// Nodes referenced by at least one link, in name order.
    pub fn nodes(&self) -> BTreeSet<&NodeName> {
        self.links
            .keys()
            .flat_map(|key| [key.source(), key.target()])
            .collect()
    }

    /// Check if a node participates in any link.
    pub fn contains_node(&self, node: &NodeName) -> bool {
        self.links.keys().any(|key| key.touches(node))
    }
}
