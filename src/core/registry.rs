//! # Service registry.
//!
//! Holds registered services keyed by [`ServiceId`], in registration order.
//!
//! ## Rules
//! - One contract maps to exactly one instance (`DuplicateService` otherwise)
//! - One instance is registered under exactly one contract (`DuplicateInstance`
//!   otherwise); identity is the `Arc` allocation
//! - Sequence numbers grow monotonically and are never reused, even across
//!   re-registration after shutdown
//!
//! The registry is plain data; the container guards it with its state lock.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ContainerError;
use crate::service::{Erased, Service, ServiceId, ServiceRef};

/// One registered service.
struct Entry {
    seq: u64,
    service: ServiceRef,
    /// The `Arc<C>` as registered, for typed resolution.
    instance: Box<dyn Any + Send + Sync>,
}

/// Registration snapshot used by the boot pipeline.
#[derive(Clone)]
pub(crate) struct Registered {
    pub id: ServiceId,
    pub seq: u64,
    pub service: ServiceRef,
}

#[derive(Default)]
pub(crate) struct Registry {
    entries: HashMap<ServiceId, Entry>,
    order: Vec<ServiceId>,
    /// Allocation address → contract it is registered under.
    identities: HashMap<usize, ServiceId>,
    next_seq: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `instance` under contract `C`.
    pub fn insert<C>(&mut self, instance: Arc<C>) -> Result<ServiceId, ContainerError>
    where
        C: ?Sized + Service,
    {
        let id = ServiceId::of::<C>();
        if self.entries.contains_key(&id) {
            return Err(ContainerError::DuplicateService { service: id });
        }

        let identity = Arc::as_ptr(&instance) as *const () as usize;
        if let Some(existing) = self.identities.get(&identity) {
            return Err(ContainerError::DuplicateInstance {
                service: id,
                existing: *existing,
            });
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        let service: ServiceRef = Arc::new(Erased(Arc::clone(&instance)));
        self.entries.insert(
            id,
            Entry {
                seq,
                service,
                instance: Box::new(instance),
            },
        );
        self.order.push(id);
        self.identities.insert(identity, id);
        Ok(id)
    }

    /// Returns the instance registered under contract `C`.
    pub fn get<C: ?Sized + 'static>(&self) -> Option<Arc<C>> {
        self.entries
            .get(&ServiceId::of::<C>())?
            .instance
            .downcast_ref::<Arc<C>>()
            .cloned()
    }

    pub fn contains(&self, id: &ServiceId) -> bool {
        self.entries.contains_key(id)
    }

    /// All registrations, in registration order.
    pub fn snapshot(&self) -> Vec<Registered> {
        self.order
            .iter()
            .filter_map(|id| {
                self.entries.get(id).map(|e| Registered {
                    id: *id,
                    seq: e.seq,
                    service: Arc::clone(&e.service),
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
