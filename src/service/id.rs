//! # Service identifiers.
//!
//! A [`ServiceId`] is derived from the **contract** a service is registered
//! under, never from the concrete instance. The contract is usually a trait
//! object type (`dyn Database`), but any `'static` type works.
//!
//! ```rust
//! use bootvisor::ServiceId;
//!
//! trait Database {}
//! trait Cache {}
//!
//! assert_eq!(ServiceId::of::<dyn Database>(), ServiceId::of::<dyn Database>());
//! assert_ne!(ServiceId::of::<dyn Database>(), ServiceId::of::<dyn Cache>());
//! ```

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Opaque, comparable identifier of a service contract.
///
/// Equality and hashing use the contract's `TypeId`; the type name is kept
/// for display only.
#[derive(Clone, Copy)]
pub struct ServiceId {
    type_id: TypeId,
    name: &'static str,
}

impl ServiceId {
    /// Returns the identifier for contract `C`.
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: type_name::<C>(),
        }
    }

    /// Human-readable contract name (the Rust type name).
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ServiceId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ServiceId {}

impl Hash for ServiceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
