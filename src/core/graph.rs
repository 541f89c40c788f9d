//! # Dependency graph builder.
//!
//! Assembled once per boot attempt: every registered service is asked for the
//! contracts it depends on, producing a mapping `id → set of dependency ids`.
//! Edges are never persisted between attempts.
//!
//! ## Rules
//! - Nodes keep their registration sequence number (used for tie-breaking by the sorter)
//! - An edge to a contract that is not a node is rejected with `UnknownDependency`
//! - A service declaring no dependencies maps to an empty set

use std::collections::{HashMap, HashSet};
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::core::registry::Registered;
use crate::core::{Container, panic_info};
use crate::error::{BootError, ServiceError};
use crate::service::ServiceId;

/// One node: a registered service and what it depends on.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub id: ServiceId,
    pub seq: u64,
    pub deps: HashSet<ServiceId>,
}

/// Dependency graph over the full registered id set.
#[derive(Debug, Default, Clone)]
pub(crate) struct DependencyGraph {
    /// Nodes in insertion (registration) order.
    nodes: Vec<Node>,
    index: HashMap<ServiceId, usize>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node; a second add of the same id is a no-op.
    pub fn add_node(&mut self, id: ServiceId, seq: u64) {
        if self.index.contains_key(&id) {
            return;
        }
        self.index.insert(id, self.nodes.len());
        self.nodes.push(Node {
            id,
            seq,
            deps: HashSet::new(),
        });
    }

    /// Records that `dependent` must boot after `dependency`.
    pub fn add_dependency(
        &mut self,
        dependent: ServiceId,
        dependency: ServiceId,
    ) -> Result<(), BootError> {
        let unknown = |missing: ServiceId| BootError::UnknownDependency {
            service: dependent,
            dependency: missing,
        };
        if !self.index.contains_key(&dependency) {
            return Err(unknown(dependency));
        }
        let slot = *self.index.get(&dependent).ok_or_else(|| unknown(dependent))?;
        self.nodes[slot].deps.insert(dependency);
        Ok(())
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Asks every service for its dependencies and assembles the graph.
///
/// Runs service code, so it must be called without the state lock held.
/// A panicking declaration fails the attempt on behalf of that service.
pub(crate) fn build(
    container: &Container,
    services: &[Registered],
) -> Result<DependencyGraph, BootError> {
    let mut graph = DependencyGraph::new();
    for s in services {
        graph.add_node(s.id, s.seq);
    }
    for s in services {
        let deps = catch_unwind(AssertUnwindSafe(|| s.service.dependencies(container)))
            .map_err(|panic| BootError::ServiceFailed {
                service: s.id,
                error: ServiceError::Panicked {
                    info: panic_info(&*panic),
                },
            })?;
        for dep in deps {
            graph.add_dependency(s.id, dep)?;
        }
    }
    Ok(graph)
}
