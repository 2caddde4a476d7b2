use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use crate::config::DispatcherConfig;
use crate::context::RequestContext;
use crate::controller::{Controller, ControllerSet};
use crate::error::DispatchError;
use crate::ids::DispatchId;
use crate::method::HttpMethod;
use crate::policy::{ExceptionPolicy, Guarded};
use crate::registry::HandlerRegistry;
use crate::request::{verify_xhr, InboundRequest};
use crate::resolver::HandlerResolver;

/// Header an upstream proxy may use to hand over a correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Body written when the interceptor suppressed a failure.
pub const SUPPRESSED_BODY: &str = "false";

/// What the pre-dispatch hook decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookFlow {
    /// Go on with handler lookup.
    Continue,
    /// Stop silently: no handler runs, nothing is written.
    Abort,
}

impl From<bool> for HookFlow {
    fn from(proceed: bool) -> Self {
        if proceed {
            HookFlow::Continue
        } else {
            HookFlow::Abort
        }
    }
}

/// Callback run before handler lookup, with the request parameters.
pub type PreDispatchHook =
    Arc<dyn Fn(&RequestContext) -> anyhow::Result<HookFlow> + Send + Sync>;

/// How a dispatch that did not fail ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler returned this body.
    Completed(String),
    /// The hook or handler failed and the interceptor handled it.
    Suppressed,
    /// The pre-dispatch hook stopped the request.
    Aborted,
}

impl DispatchOutcome {
    /// Bytes to write to the response channel, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Completed(body) => Some(body),
            DispatchOutcome::Suppressed => Some(SUPPRESSED_BODY),
            DispatchOutcome::Aborted => None,
        }
    }
}

/// Routes a request to exactly one registered handler.
///
/// Built once through [`Dispatcher::builder`], then shared read-only between
/// requests. Every call to [`dispatch`](Dispatcher::dispatch) builds its own
/// [`RequestContext`], so nothing leaks from one request to the next.
#[derive(Clone)]
pub struct Dispatcher {
    config: DispatcherConfig,
    registry: HandlerRegistry,
    controllers: ControllerSet,
    before: Option<PreDispatchHook>,
    policy: ExceptionPolicy,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("handlers", &self.registry.len())
            .field("controllers", &self.controllers.len())
            .field("before", &self.before.is_some())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Dispatcher {
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    #[must_use]
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    #[must_use]
    pub fn controllers(&self) -> &ControllerSet {
        &self.controllers
    }

    /// Dispatch `request` and write the result to `out`.
    ///
    /// `Completed` writes the handler's body verbatim, `Suppressed` writes
    /// `false`, `Aborted` writes nothing. The outcome is returned so callers
    /// can tell a suppressed failure apart from a handler that returned
    /// `"false"` itself.
    pub fn dispatch<R, W>(
        &self,
        request: &mut R,
        out: &mut W,
    ) -> Result<DispatchOutcome, DispatchError>
    where
        R: InboundRequest + ?Sized,
        W: Write + ?Sized,
    {
        let outcome = self.resolve_outcome(request)?;
        if let Some(body) = outcome.body() {
            out.write_all(body.as_bytes())
                .and_then(|()| out.flush())
                .map_err(DispatchError::Output)?;
        }
        Ok(outcome)
    }

    /// Run a dispatch without writing anything.
    pub fn resolve_outcome<R>(&self, request: &mut R) -> Result<DispatchOutcome, DispatchError>
    where
        R: InboundRequest + ?Sized,
    {
        let dispatch_id = DispatchId::from_header_or_new(
            request
                .headers()
                .ok()
                .and_then(|h| h.get(REQUEST_ID_HEADER))
                .and_then(|v| v.to_str().ok()),
        );
        let span = info_span!(
            "dispatch",
            dispatch_id = %dispatch_id,
            method = %request.method(),
            discriminator = %self.config.discriminator,
        );
        let _entered = span.enter();
        let start = Instant::now();

        let result = self.run(request);

        let elapsed_us = start.elapsed().as_micros() as u64;
        match &result {
            Ok(outcome) => info!(
                outcome = ?OutcomeKind::from(outcome),
                elapsed_us = elapsed_us,
                "Dispatch complete"
            ),
            Err(e) => warn!(
                error_kind = %e.kind(),
                error = %e,
                elapsed_us = elapsed_us,
                "Dispatch failed"
            ),
        }
        result
    }

    fn run<R>(&self, request: &mut R) -> Result<DispatchOutcome, DispatchError>
    where
        R: InboundRequest + ?Sized,
    {
        // D1: transport and method checks, before any user code
        verify_xhr(&*request)?;
        let method = HttpMethod::parse(request.method())?;

        let ctx = build_context(method, request)?;
        debug!(param_count = ctx.len(), "Request context built");

        // D2: pre-dispatch hook
        if let Some(hook) = &self.before {
            match self.policy.guard("pre_dispatch", || hook(&ctx))? {
                Guarded::Value(HookFlow::Continue) => {}
                Guarded::Value(HookFlow::Abort) => {
                    info!("Pre-dispatch hook aborted dispatch");
                    return Ok(DispatchOutcome::Aborted);
                }
                Guarded::Suppressed => {
                    info!("Pre-dispatch hook failed and was intercepted - aborting");
                    return Ok(DispatchOutcome::Aborted);
                }
            }
        }

        // D3: handler lookup
        let field = self.config.discriminator.as_str();
        let value = ctx
            .get(field)
            .ok_or_else(|| DispatchError::MissingDiscriminator {
                field: field.to_string(),
            })?;
        let descriptor =
            self.registry
                .lookup(method, value)
                .ok_or_else(|| DispatchError::HandlerNotFound {
                    method: method.to_string(),
                    field: field.to_string(),
                    value: value.to_string(),
                })?;
        debug!(
            discriminator_value = %value,
            handler = %descriptor,
            "Handler found"
        );

        // D4: resolve and invoke
        let invocation = HandlerResolver::new(&self.controllers, field).resolve(descriptor, &ctx)?;
        info!(handler = %invocation, arg_count = invocation.args().len(), "Invoking handler");

        match self.policy.guard("handler", || invocation.invoke())? {
            Guarded::Value(body) => Ok(DispatchOutcome::Completed(body)),
            Guarded::Suppressed => Ok(DispatchOutcome::Suppressed),
        }
    }
}

/// Parameters come from the query string for GET and from the url-encoded
/// body for every other method.
fn build_context<R>(method: HttpMethod, request: &mut R) -> Result<RequestContext, DispatchError>
where
    R: InboundRequest + ?Sized,
{
    if method == HttpMethod::Get {
        return Ok(RequestContext::from_pairs(method, request.query_pairs()));
    }

    let body = request.read_body().map_err(|e| DispatchError::BodyRead {
        reason: e.to_string(),
    })?;
    if body.is_empty() {
        return Err(DispatchError::BodyRead {
            reason: "request body is empty".to_string(),
        });
    }
    debug!(body_size_bytes = body.len(), "Request body read");
    Ok(RequestContext::from_urlencoded(method, &body))
}

#[derive(Debug)]
enum OutcomeKind {
    Completed,
    Suppressed,
    Aborted,
}

impl From<&DispatchOutcome> for OutcomeKind {
    fn from(o: &DispatchOutcome) -> Self {
        match o {
            DispatchOutcome::Completed(_) => OutcomeKind::Completed,
            DispatchOutcome::Suppressed => OutcomeKind::Suppressed,
            DispatchOutcome::Aborted => OutcomeKind::Aborted,
        }
    }
}

/// Fluent registration of everything a [`Dispatcher`] needs.
#[derive(Default)]
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    registry: HandlerRegistry,
    controllers: ControllerSet,
    before: Option<PreDispatchHook>,
    interceptor: Option<crate::policy::Interceptor>,
}

impl DispatcherBuilder {
    #[must_use]
    pub fn config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Shortcut for a config that only changes the discriminator.
    #[must_use]
    pub fn discriminator(mut self, field: impl Into<String>) -> Self {
        self.config.discriminator = field.into();
        self
    }

    #[must_use]
    pub fn handlers(mut self, registry: HandlerRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn controller<C: Controller>(mut self, controller: C) -> Self {
        self.controllers.register(controller);
        self
    }

    #[must_use]
    pub fn controller_default<C: Controller + Default>(mut self) -> Self {
        self.controllers.register_default::<C>();
        self
    }

    #[must_use]
    pub fn controller_shared<C: Controller>(mut self, controller: Arc<C>) -> Self {
        self.controllers.register_shared(controller);
        self
    }

    /// Set the pre-dispatch hook. A later call replaces an earlier one.
    #[must_use]
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RequestContext) -> anyhow::Result<HookFlow> + Send + Sync + 'static,
    {
        self.before = Some(Arc::new(hook));
        self
    }

    /// Set the exception interceptor. A later call replaces an earlier one.
    #[must_use]
    pub fn on_error<F>(mut self, interceptor: F) -> Self
    where
        F: Fn(&anyhow::Error) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.interceptor = Some(Arc::new(interceptor));
        self
    }

    #[must_use]
    pub fn build(self) -> Dispatcher {
        let policy = match self.interceptor {
            Some(i) => ExceptionPolicy::with_interceptor(i),
            None => ExceptionPolicy::propagate(),
        };
        info!(
            discriminator = %self.config.discriminator,
            handlers = self.registry.len(),
            controllers = self.controllers.len(),
            pre_dispatch_hook = self.before.is_some(),
            interceptor = policy.has_interceptor(),
            "Dispatcher built"
        );
        Dispatcher {
            config: self.config,
            registry: self.registry,
            controllers: self.controllers,
            before: self.before,
            policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchErrorKind;
    use crate::request::HttpRequest;

    fn ping_dispatcher() -> Dispatcher {
        let registry = HandlerRegistry::builder()
            .callable("GET", "ping", |_| Ok("pong".to_string()))
            .callable("POST", "echo", |args| Ok(args.join(",")))
            .build()
            .unwrap();
        Dispatcher::builder().handlers(registry).build()
    }

    #[test]
    fn test_outcome_bodies() {
        assert_eq!(DispatchOutcome::Completed("x".into()).body(), Some("x"));
        assert_eq!(DispatchOutcome::Suppressed.body(), Some("false"));
        assert_eq!(DispatchOutcome::Aborted.body(), None);
    }

    #[test]
    fn test_hook_flow_from_bool() {
        assert_eq!(HookFlow::from(false), HookFlow::Abort);
        assert_eq!(HookFlow::from(true), HookFlow::Continue);
    }

    #[test]
    fn test_get_reads_query() {
        let d = ping_dispatcher();
        let mut req = HttpRequest::get("/api?action=ping").xhr();
        let outcome = d.resolve_outcome(&mut req).unwrap();
        assert_eq!(outcome, DispatchOutcome::Completed("pong".to_string()));
    }

    #[test]
    fn test_post_reads_body_not_query() {
        let d = ping_dispatcher();
        let mut req = HttpRequest::post("/api?action=ping")
            .xhr()
            .form([("action", "echo"), ("a", "1")]);
        let outcome = d.resolve_outcome(&mut req).unwrap();
        assert_eq!(outcome, DispatchOutcome::Completed("1".to_string()));
    }

    #[test]
    fn test_post_empty_body() {
        let d = ping_dispatcher();
        let mut req = HttpRequest::post("/api?action=echo").xhr();
        let err = d.resolve_outcome(&mut req).unwrap_err();
        assert_eq!(err.kind(), DispatchErrorKind::BodyRead);
    }

    #[test]
    fn test_unsupported_live_method() {
        let d = ping_dispatcher();
        let mut req = HttpRequest::new("HEAD", "/api?action=ping").xhr();
        let err = d.resolve_outcome(&mut req).unwrap_err();
        assert_eq!(err.kind(), DispatchErrorKind::UnsupportedMethod);
    }

    #[test]
    fn test_lookup_does_not_cross_methods() {
        let d = ping_dispatcher();
        let mut req = HttpRequest::put("/").xhr().form([("action", "ping")]);
        let err = d.resolve_outcome(&mut req).unwrap_err();
        assert_eq!(err.kind(), DispatchErrorKind::HandlerNotFound);
    }

    #[test]
    fn test_dispatcher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Dispatcher>();
    }
}
