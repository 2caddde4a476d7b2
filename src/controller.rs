//! # Controllers
//!
//! A controller is an object whose methods can be named from the handler
//! registry with a `"Name@method"` reference. The `Name` part is the
//! unqualified Rust type name of the controller (`app::admin::UserController`
//! registers as `UserController`).
//!
//! Controllers are registered as pre-built instances, or by type through
//! [`Default`]. There is no string-to-type factory: a reference can only reach
//! an instance that was registered explicitly.
//!
//! ## Example
//!
//! ```rust
//! use ajax_dispatch::controller::{Controller, ControllerSet};
//!
//! #[derive(Default)]
//! struct Greeter;
//!
//! impl Controller for Greeter {
//!     fn methods(&self) -> &[&str] {
//!         &["hello"]
//!     }
//!
//!     fn invoke(&self, method: &str, args: &[String]) -> anyhow::Result<String> {
//!         match method {
//!             "hello" => Ok(format!("hello {}", args.first().map_or("world", String::as_str))),
//!             other => anyhow::bail!("unknown method {other}"),
//!         }
//!     }
//! }
//!
//! let mut set = ControllerSet::new();
//! set.register(Greeter);
//! assert!(set.resolve("Greeter").is_some());
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

/// An object whose methods handlers can reference by name.
pub trait Controller: Send + Sync + 'static {
    /// Names of the methods [`invoke`](Controller::invoke) accepts.
    fn methods(&self) -> &[&str];

    /// Call `method` with positional string arguments.
    fn invoke(&self, method: &str, args: &[String]) -> anyhow::Result<String>;

    fn has_method(&self, method: &str) -> bool {
        self.methods().contains(&method)
    }
}

/// Last path segment of a type name, without generic arguments.
///
/// `alloc::vec::Vec<u8>` becomes `Vec`, `app::FooController` becomes
/// `FooController`.
#[must_use]
pub fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A registered controller together with its lookup name.
#[derive(Clone)]
pub struct ControllerEntry {
    name: Arc<str>,
    instance: Arc<dyn Controller>,
}

impl ControllerEntry {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn instance(&self) -> &Arc<dyn Controller> {
        &self.instance
    }
}

impl fmt::Debug for ControllerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerEntry")
            .field("name", &self.name)
            .field("methods", &self.instance.methods())
            .finish()
    }
}

/// Ordered, append-only set of controller instances.
///
/// Lookup returns the first instance registered under a name. A later
/// registration with the same short name is kept but never resolved.
#[derive(Clone, Default, Debug)]
pub struct ControllerSet {
    entries: Vec<ControllerEntry>,
}

impl ControllerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pre-built controller instance.
    pub fn register<C: Controller>(&mut self, controller: C) {
        let name = short_type_name(std::any::type_name::<C>());
        self.push(name, Arc::new(controller));
    }

    /// Register a controller by type, building it with `Default`.
    pub fn register_default<C: Controller + Default>(&mut self) {
        self.register(C::default());
    }

    /// Register an instance that is already shared elsewhere.
    pub fn register_shared<C: Controller>(&mut self, controller: Arc<C>) {
        let name = short_type_name(std::any::type_name::<C>());
        self.push(name, controller);
    }

    fn push(&mut self, name: &str, instance: Arc<dyn Controller>) {
        if self.entries.iter().any(|e| e.name.as_ref() == name) {
            warn!(
                controller = %name,
                "Controller name already registered - later instance is unreachable"
            );
        }
        debug!(
            controller = %name,
            total_controllers = self.entries.len() + 1,
            "Controller registered"
        );
        self.entries.push(ControllerEntry {
            name: Arc::from(name),
            instance,
        });
    }

    /// First controller registered under `name`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Arc<dyn Controller>> {
        self.entries
            .iter()
            .find(|e| e.name.as_ref() == name)
            .map(|e| &e.instance)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControllerEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
