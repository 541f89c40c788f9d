//! # Launch context passed to every service boot.
//!
//! The container never looks inside a [`LaunchContext`]; it is handed to
//! each [`Service::boot`](crate::Service::boot) call unmodified.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Opaque key/value payload supplied by the caller of
/// [`Container::boot`](crate::Container::boot).
///
/// ## Example
/// ```rust
/// use bootvisor::LaunchContext;
///
/// let ctx = LaunchContext::new()
///     .with("config_path", String::from("/etc/app.toml"))
///     .with("verbose", true);
///
/// assert_eq!(ctx.get::<String>("config_path").map(String::as_str), Some("/etc/app.toml"));
/// assert_eq!(ctx.get::<bool>("verbose"), Some(&true));
/// assert!(ctx.get::<u32>("verbose").is_none());
/// ```
#[derive(Clone, Default)]
pub struct LaunchContext {
    values: HashMap<&'static str, Arc<dyn Any + Send + Sync>>,
}

impl LaunchContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a value under `key`, replacing any previous one.
    pub fn with<T: Any + Send + Sync>(mut self, key: &'static str, value: T) -> Self {
        self.values.insert(key, Arc::new(value));
        self
    }

    /// Returns the value under `key` if it exists and has type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref::<T>()
    }

    /// Returns true if a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns true if the context carries no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for LaunchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&&str> = self.values.keys().collect();
        keys.sort_unstable();
        f.debug_struct("LaunchContext").field("keys", &keys).finish()
    }
}
