//! Property-based tests for the diff engine.
//!
//! Topologies are generated from a small pool of node names so that random
//! pairs of topologies share nodes and links, with random orientation and
//! shaping on every link.

use std::collections::BTreeSet;

use meshnet::plan::reconcile;
use meshnet::topology::{LinkDescription, LinkKey, NodeName, Topology, TopologyDescription};
use proptest::prelude::*;

/// Generate a node name from a small pool
fn arb_node() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d", "e", "n1", "n2", "12"]).prop_map(String::from)
}

/// Generate an optional shaping spec
fn arb_shaping() -> impl Strategy<Value = Option<String>> {
    prop::option::of(
        prop::sample::select(vec!["netem delay 5ms", "netem loss 1%", "rate 1mbit"])
            .prop_map(String::from),
    )
}

/// Generate a description with at most one entry per node pair
fn arb_description() -> impl Strategy<Value = TopologyDescription> {
    prop::collection::vec((arb_node(), arb_node(), arb_shaping(), arb_shaping()), 0..16).prop_map(
        |entries| {
            let mut pairs = BTreeSet::new();
            let mut description = TopologyDescription::new();
            for (source, target, source_tc, target_tc) in entries {
                if source == target {
                    continue;
                }
                let pair = if source > target {
                    (source.clone(), target.clone())
                } else {
                    (target.clone(), source.clone())
                };
                if !pairs.insert(pair) {
                    continue;
                }
                description.links.push(LinkDescription {
                    source,
                    target,
                    source_tc,
                    target_tc,
                });
            }
            description
        },
    )
}

/// Generate a canonical topology
fn arb_topology() -> impl Strategy<Value = Topology> {
    arb_description().prop_map(|d| d.build().expect("generated description is valid"))
}

/// Describe every link from the other end, with the shaping fields swapped
fn reoriented(description: &TopologyDescription) -> TopologyDescription {
    TopologyDescription {
        links: description
            .links
            .iter()
            .map(|l| LinkDescription {
                source: l.target.clone(),
                target: l.source.clone(),
                source_tc: l.target_tc.clone(),
                target_tc: l.source_tc.clone(),
            })
            .collect(),
    }
}

fn link_keys(topology: &Topology) -> BTreeSet<LinkKey> {
    topology.links().map(|l| l.key().clone()).collect()
}

fn node_set(topology: &Topology) -> BTreeSet<NodeName> {
    topology.nodes().into_iter().cloned().collect()
}

proptest! {
    /// Property: reconciling a topology with itself changes nothing
    #[test]
    fn reconcile_same_is_empty(t in arb_topology()) {
        let plan = reconcile(&t, &t);
        prop_assert!(plan.is_empty());
        prop_assert_eq!(plan.change_count(), 0);
    }

    /// Property: tearing down removes exactly what building up creates
    #[test]
    fn teardown_inverts_buildup(t in arb_topology()) {
        let empty = Topology::new();
        let up = reconcile(&empty, &t);
        let down = reconcile(&t, &empty);

        let created: Vec<&LinkKey> = up.links_create.iter().map(|l| l.key()).collect();
        let removed: Vec<&LinkKey> = down.links_remove.iter().map(|l| l.key()).collect();
        prop_assert_eq!(created, removed);
        prop_assert_eq!(&up.nodes_create, &down.nodes_remove);

        prop_assert_eq!(up.links_create.len(), t.link_count());
        prop_assert_eq!(up.nodes_create.iter().cloned().collect::<BTreeSet<_>>(), node_set(&t));

        prop_assert!(up.links_remove.is_empty() && up.nodes_remove.is_empty());
        prop_assert!(down.links_create.is_empty() && down.nodes_create.is_empty());
        prop_assert!(up.links_update.is_empty() && down.links_update.is_empty());

        prop_assert_eq!(up.create_switch, !t.is_empty());
        prop_assert_eq!(down.remove_switch, !t.is_empty());
        prop_assert!(!up.remove_switch && !down.create_switch);
    }

    /// Property: describing links from the other end yields the same topology
    #[test]
    fn orientation_does_not_matter(description in arb_description()) {
        let t = description.build().expect("generated description is valid");
        let flipped = reoriented(&description).build().expect("reoriented description is valid");

        prop_assert_eq!(&t, &flipped);
        prop_assert!(reconcile(&t, &flipped).is_empty());
    }

    /// Property: no node or link appears in two lists of a plan
    #[test]
    fn plan_lists_are_disjoint(old in arb_topology(), new in arb_topology()) {
        let plan = reconcile(&old, &new);

        let nodes_create: BTreeSet<&NodeName> = plan.nodes_create.iter().collect();
        let nodes_remove: BTreeSet<&NodeName> = plan.nodes_remove.iter().collect();
        prop_assert_eq!(nodes_create.len(), plan.nodes_create.len());
        prop_assert_eq!(nodes_remove.len(), plan.nodes_remove.len());
        prop_assert!(nodes_create.is_disjoint(&nodes_remove));

        let create: BTreeSet<&LinkKey> = plan.links_create.iter().map(|l| l.key()).collect();
        let remove: BTreeSet<&LinkKey> = plan.links_remove.iter().map(|l| l.key()).collect();
        let update: BTreeSet<&LinkKey> = plan.links_update.iter().map(|u| u.key()).collect();
        prop_assert_eq!(create.len(), plan.links_create.len());
        prop_assert_eq!(remove.len(), plan.links_remove.len());
        prop_assert_eq!(update.len(), plan.links_update.len());
        prop_assert!(create.is_disjoint(&remove));
        prop_assert!(create.is_disjoint(&update));
        prop_assert!(remove.is_disjoint(&update));
    }

    /// Property: applying the plan's link and node sets to `old` gives `new`
    #[test]
    fn plan_reaches_new_topology(old in arb_topology(), new in arb_topology()) {
        let plan = reconcile(&old, &new);

        let mut links = link_keys(&old);
        for link in &plan.links_remove {
            prop_assert!(links.remove(link.key()));
        }
        for link in &plan.links_create {
            prop_assert!(links.insert(link.key().clone()));
        }
        prop_assert_eq!(links, link_keys(&new));

        let mut nodes = node_set(&old);
        for node in &plan.nodes_remove {
            prop_assert!(nodes.remove(node));
        }
        for node in &plan.nodes_create {
            prop_assert!(nodes.insert(node.clone()));
        }
        prop_assert_eq!(nodes, node_set(&new));

        for update in &plan.links_update {
            prop_assert!(!update.old.same_shaping(&update.new));
            prop_assert_eq!(new.link(update.key()), Some(&update.new));
        }
    }
}
