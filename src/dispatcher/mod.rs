//! # Dispatcher Module
//!
//! The dispatcher is the orchestrator: it takes one inbound request and
//! routes it to exactly one registered handler, selected by the HTTP method
//! and the value of the discriminator parameter.
//!
//! ## Request Flow
//!
//! 1. Verify the request is an XMLHttpRequest (`X-Requested-With`)
//! 2. Verify the method is GET, POST, PUT, DELETE or PATCH
//! 3. Build the [`RequestContext`](crate::context::RequestContext): query
//!    string for GET, url-encoded body otherwise
//! 4. Run the pre-dispatch hook, which may abort the request
//! 5. Read the discriminator value and look up the handler for the method
//! 6. Resolve the handler (controller, method, arguments)
//! 7. Invoke it and write the result
//!
//! Steps 1–3 and 5–6 fail with a [`DispatchError`](crate::DispatchError) that
//! always reaches the caller. Steps 4 and 7 run user code under the
//! [`ExceptionPolicy`](crate::policy::ExceptionPolicy): with an interceptor
//! registered, a failure there is handed to it and the dispatch ends
//! [`Suppressed`](DispatchOutcome::Suppressed) (or
//! [`Aborted`](DispatchOutcome::Aborted) for the hook).
//!
//! ## Example
//!
//! ```rust
//! use ajax_dispatch::dispatcher::{Dispatcher, DispatchOutcome, HookFlow};
//! use ajax_dispatch::registry::HandlerRegistry;
//! use ajax_dispatch::request::HttpRequest;
//!
//! let registry = HandlerRegistry::builder()
//!     .callable("GET", "sum", |args| {
//!         let total: i64 = args.iter().map(|a| a.parse::<i64>()).sum::<Result<_, _>>()?;
//!         Ok(total.to_string())
//!     })
//!     .build()
//!     .expect("valid registry");
//!
//! let dispatcher = Dispatcher::builder()
//!     .handlers(registry)
//!     .before(|ctx| Ok(HookFlow::from(ctx.get("token") != Some("revoked"))))
//!     .build();
//!
//! let mut request = HttpRequest::get("/api?action=sum&a=2&b=3").xhr();
//! let mut out: Vec<u8> = Vec::new();
//! let outcome = dispatcher.dispatch(&mut request, &mut out).expect("dispatch");
//!
//! assert_eq!(outcome, DispatchOutcome::Completed("5".to_string()));
//! assert_eq!(out, b"5");
//! ```
//!
//! ## Concurrency
//!
//! A built [`Dispatcher`] is immutable and `Send + Sync`. Share it behind an
//! `Arc` and call [`dispatch`](Dispatcher::dispatch) from as many request
//! threads as needed; each call owns its context. Dispatch itself is fully
//! synchronous and has no timeout: a handler that blocks, blocks the call.

mod core;

pub use core::{
    DispatchOutcome, Dispatcher, DispatcherBuilder, HookFlow, PreDispatchHook, REQUEST_ID_HEADER,
    SUPPRESSED_BODY,
};
