//! # Topological sorter.
//!
//! Iterative Kahn's algorithm in rounds:
//! ```text
//! loop {
//!   ready   = nodes whose remaining dependency set is empty
//!   ready   → appended to the order, by ascending registration seq
//!   blocked → drop every ready id from their dependency sets
//!   ready is empty but blocked is not → cycle
//! }
//! ```
//!
//! ## Rules
//! - Every dependency precedes each of its dependents
//! - Ties within a round are broken by registration sequence only (never by
//!   name or hash order), so the same graph always yields the same order
//! - A stalled graph reports one concrete cycle path, starting and ending at
//!   the same id

use std::collections::{HashMap, HashSet};

use crate::core::graph::{DependencyGraph, Node};
use crate::error::BootError;
use crate::service::ServiceId;

/// Returns a boot order for `graph`, or the cycle that prevents one.
pub(crate) fn sort(graph: &DependencyGraph) -> Result<Vec<ServiceId>, BootError> {
    let mut remaining: Vec<Node> = graph.nodes().to_vec();
    remaining.sort_by_key(|n| n.seq);

    let mut order = Vec::with_capacity(graph.len());
    while !remaining.is_empty() {
        let (ready, mut blocked): (Vec<Node>, Vec<Node>) =
            remaining.into_iter().partition(|n| n.deps.is_empty());

        if ready.is_empty() {
            return Err(BootError::CyclicDependency {
                cycle: find_cycle(&blocked),
            });
        }

        let done: HashSet<ServiceId> = ready.iter().map(|n| n.id).collect();
        for node in &mut blocked {
            node.deps.retain(|d| !done.contains(d));
        }

        order.extend(ready.into_iter().map(|n| n.id));
        remaining = blocked;
    }
    Ok(order)
}

/// Walks dependency edges from the lowest-seq blocked node until an id repeats.
///
/// Every blocked node still has a dependency inside `blocked`, so the walk
/// always closes a loop.
fn find_cycle(blocked: &[Node]) -> Vec<ServiceId> {
    let by_id: HashMap<ServiceId, &Node> = blocked.iter().map(|n| (n.id, n)).collect();

    let mut path: Vec<ServiceId> = Vec::new();
    let mut seen: HashMap<ServiceId, usize> = HashMap::new();
    let mut current = blocked.first().map(|n| n.id);

    while let Some(id) = current {
        if let Some(&start) = seen.get(&id) {
            let mut cycle = path.split_off(start);
            cycle.push(id);
            return cycle;
        }
        seen.insert(id, path.len());
        path.push(id);

        current = by_id.get(&id).and_then(|node| {
            node.deps
                .iter()
                .filter_map(|d| by_id.get(d))
                .min_by_key(|n| n.seq)
                .map(|n| n.id)
        });
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;
    struct C;
    struct D;
    struct E;

    fn id<T: 'static>() -> ServiceId {
        ServiceId::of::<T>()
    }

    fn graph(nodes: &[ServiceId], edges: &[(ServiceId, ServiceId)]) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        for (seq, n) in nodes.iter().enumerate() {
            g.add_node(*n, seq as u64);
        }
        for (dependent, dependency) in edges {
            g.add_dependency(*dependent, *dependency).unwrap();
        }
        g
    }

    fn pos(order: &[ServiceId], x: ServiceId) -> usize {
        order.iter().position(|o| *o == x).unwrap()
    }

    #[test]
    fn empty_graph_sorts_to_nothing() {
        assert!(sort(&DependencyGraph::new()).unwrap().is_empty());
    }

    #[test]
    fn diamond_places_dependencies_first() {
        // B → A, C → A, D → C
        let g = graph(
            &[id::<D>(), id::<C>(), id::<B>(), id::<A>()],
            &[
                (id::<B>(), id::<A>()),
                (id::<C>(), id::<A>()),
                (id::<D>(), id::<C>()),
            ],
        );
        let order = sort(&g).unwrap();
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], id::<A>());
        assert_eq!(order[3], id::<D>());
        assert!(pos(&order, id::<C>()) < pos(&order, id::<D>()));
        assert!(pos(&order, id::<A>()) < pos(&order, id::<B>()));
    }

    #[test]
    fn ties_follow_registration_sequence() {
        let g = graph(&[id::<C>(), id::<A>(), id::<B>()], &[]);
        assert_eq!(sort(&g).unwrap(), vec![id::<C>(), id::<A>(), id::<B>()]);

        // Same round: C (seq 1) and B (seq 2) both unblock after A.
        let g = graph(
            &[id::<A>(), id::<C>(), id::<B>()],
            &[(id::<B>(), id::<A>()), (id::<C>(), id::<A>())],
        );
        assert_eq!(sort(&g).unwrap(), vec![id::<A>(), id::<C>(), id::<B>()]);
    }

    #[test]
    fn repeated_sorts_are_identical() {
        let g = graph(
            &[id::<E>(), id::<D>(), id::<C>(), id::<B>(), id::<A>()],
            &[(id::<E>(), id::<A>()), (id::<D>(), id::<B>())],
        );
        let first = sort(&g).unwrap();
        for _ in 0..16 {
            assert_eq!(sort(&g).unwrap(), first);
        }
        assert_eq!(
            first,
            vec![id::<C>(), id::<B>(), id::<A>(), id::<E>(), id::<D>()]
        );
    }

    #[test]
    fn cycle_reports_closed_path() {
        // A → B → C → A, D → A
        let g = graph(
            &[id::<A>(), id::<B>(), id::<C>(), id::<D>()],
            &[
                (id::<A>(), id::<B>()),
                (id::<B>(), id::<C>()),
                (id::<C>(), id::<A>()),
                (id::<D>(), id::<A>()),
            ],
        );
        let Err(BootError::CyclicDependency { cycle }) = sort(&g) else {
            panic!("expected a cycle");
        };
        assert_eq!(cycle, vec![id::<A>(), id::<B>(), id::<C>(), id::<A>()]);
    }

    #[test]
    fn cycle_behind_a_dependent_is_found() {
        // E depends on the B ⇄ C loop; the walk starts at E.
        let g = graph(
            &[id::<E>(), id::<A>(), id::<B>(), id::<C>()],
            &[
                (id::<E>(), id::<B>()),
                (id::<B>(), id::<C>()),
                (id::<C>(), id::<B>()),
                (id::<B>(), id::<A>()),
            ],
        );
        let Err(BootError::CyclicDependency { cycle }) = sort(&g) else {
            panic!("expected a cycle");
        };
        assert_eq!(cycle, vec![id::<B>(), id::<C>(), id::<B>()]);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let g = graph(&[id::<A>()], &[(id::<A>(), id::<A>())]);
        let Err(BootError::CyclicDependency { cycle }) = sort(&g) else {
            panic!("expected a cycle");
        };
        assert_eq!(cycle, vec![id::<A>(), id::<A>()]);
    }
}
