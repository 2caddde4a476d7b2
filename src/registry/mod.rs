//! # Handler Registry
//!
//! The handler table maps an HTTP method and a discriminator value to a
//! [`HandlerDescriptor`]:
//!
//! ```text
//! GET
//! ├── "list"   → "Items@list"                 (MethodRef)
//! └── "show"   → ["Items@show", "id"]         (MethodRefWithArgs)
//! POST
//! └── "ping"   → |args| Ok("pong".into())     (DirectCallable)
//! ```
//!
//! Entries are supplied as [`RawHandler`]s and decoded into descriptors once,
//! when the registry is validated. Dispatch never re-inspects the raw shape.
//!
//! ## Example
//!
//! ```rust
//! use ajax_dispatch::registry::HandlerRegistry;
//! use ajax_dispatch::HttpMethod;
//!
//! let registry = HandlerRegistry::builder()
//!     .get("list", "Items@list")
//!     .get("show", vec!["Items@show", "id"])
//!     .callable("POST", "ping", |_args| Ok("pong".to_string()))
//!     .build()
//!     .expect("valid registry");
//!
//! assert!(registry.lookup(HttpMethod::Get, "show").is_some());
//! assert!(registry.lookup(HttpMethod::Post, "list").is_none());
//! ```

mod core;
mod descriptor;

pub use core::{HandlerRegistry, HandlerRegistryBuilder, RawRegistry};
pub use descriptor::{HandlerDescriptor, HandlerFn, RawHandler};
