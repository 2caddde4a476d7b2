//! # ajax-dispatch
//!
//! **ajax-dispatch** routes an XMLHttpRequest to exactly one of a statically
//! declared set of handlers, chosen by the HTTP method and the value of a
//! designated *discriminator* request parameter (`action` by default).
//!
//! It is a dispatch core, not a full router: there is no path matching, no
//! content negotiation and no response serialization. The host parses the
//! HTTP request, hands it over as an [`InboundRequest`], and transmits
//! whatever the handler produced.
//!
//! ## Architecture
//!
//! - **[`registry`]** - validated handler table, method → discriminator value → descriptor
//! - **[`controller`]** - controller instances looked up by short type name
//! - **[`context`]** - the request parameters of one dispatch
//! - **[`request`]** - the host-facing request interface and XHR check
//! - **[`resolver`]** - turns descriptors into bound invocations
//! - **[`policy`]** - exception interception around user code
//! - **[`dispatcher`]** - the orchestrator
//! - **[`config`]** / **[`logging`]** - static configuration and log setup
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Dispatcher
//!     participant Hook as Pre-dispatch hook
//!     participant Registry
//!     participant Resolver
//!     participant Handler
//!     participant Interceptor
//!
//!     Host->>Dispatcher: dispatch(request, out)
//!     Dispatcher->>Dispatcher: X-Requested-With check
//!     Dispatcher->>Dispatcher: method check, build context
//!     Dispatcher->>Hook: hook(ctx)
//!     alt hook aborts
//!         Hook-->>Host: Aborted (nothing written)
//!     end
//!     Dispatcher->>Registry: lookup(method, ctx[discriminator])
//!     Registry-->>Dispatcher: descriptor
//!     Dispatcher->>Resolver: resolve(descriptor, ctx)
//!     Resolver-->>Dispatcher: invocation
//!     Dispatcher->>Handler: invoke()
//!     alt handler fails, interceptor registered
//!         Dispatcher->>Interceptor: interceptor(err)
//!         Dispatcher-->>Host: Suppressed ("false" written)
//!     else success
//!         Dispatcher-->>Host: Completed(body written)
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use ajax_dispatch::{Controller, Dispatcher, HandlerRegistry, HttpRequest};
//!
//! #[derive(Default)]
//! struct Users;
//!
//! impl Controller for Users {
//!     fn methods(&self) -> &[&str] {
//!         &["greet"]
//!     }
//!
//!     fn invoke(&self, method: &str, args: &[String]) -> anyhow::Result<String> {
//!         match method {
//!             "greet" => Ok(format!("hi {}", args[0])),
//!             other => anyhow::bail!("unknown method {other}"),
//!         }
//!     }
//! }
//!
//! let registry = HandlerRegistry::builder()
//!     .get("greet", vec!["Users@greet", "name"])
//!     .build()
//!     .expect("valid registry");
//!
//! let dispatcher = Dispatcher::builder()
//!     .handlers(registry)
//!     .controller_default::<Users>()
//!     .build();
//!
//! let mut request = HttpRequest::get("/ajax.php?action=greet&name=Ann").xhr();
//! let mut out: Vec<u8> = Vec::new();
//! dispatcher.dispatch(&mut request, &mut out).expect("dispatch");
//! assert_eq!(out, b"hi Ann");
//! ```
//!
//! ## Errors
//!
//! Every failure is a [`DispatchError`]; see [`error`] for which ones the
//! exception interceptor can see.

pub mod cli;
pub mod config;
pub mod context;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod method;
pub mod policy;
pub mod registry;
pub mod request;
pub mod resolver;

pub use config::{load_config, DispatchConfig, DispatcherConfig};
pub use context::RequestContext;
pub use controller::{Controller, ControllerSet};
pub use dispatcher::{DispatchOutcome, Dispatcher, DispatcherBuilder, HookFlow};
pub use error::{DispatchError, DispatchErrorKind};
pub use method::HttpMethod;
pub use policy::{ExceptionPolicy, Guarded};
pub use registry::{HandlerDescriptor, HandlerRegistry, RawHandler};
pub use request::{HeaderAccessError, HttpRequest, InboundRequest};
