use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tracing::{debug, info};

use super::descriptor::{HandlerDescriptor, RawHandler};
use crate::error::DispatchError;
use crate::method::HttpMethod;

/// Unvalidated registry: method token → discriminator value → handler.
pub type RawRegistry = HashMap<String, HashMap<String, RawHandler>>;

/// Validated handler table keyed by method, then discriminator value.
///
/// Immutable once built. Validation is structural: controller and method
/// names inside references are checked at dispatch time, because controllers
/// are registered separately and may arrive after the table is built.
#[derive(Clone, Default, Debug)]
pub struct HandlerRegistry {
    routes: HashMap<HttpMethod, HashMap<String, HandlerDescriptor>>,
}

impl HandlerRegistry {
    /// Start building a registry entry by entry.
    #[must_use]
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::default()
    }

    /// Validate a raw registry.
    ///
    /// Fails with `Configuration` if a top-level key is not one of the five
    /// supported methods, or an entry is not a string, a list, or a callable.
    pub fn validate(raw: RawRegistry) -> Result<Self, DispatchError> {
        let mut routes: HashMap<HttpMethod, HashMap<String, HandlerDescriptor>> = HashMap::new();

        // Sorted, so the first bad entry reported is the same on every run
        let sorted: BTreeMap<String, BTreeMap<String, RawHandler>> = raw
            .into_iter()
            .map(|(m, handlers)| (m, handlers.into_iter().collect()))
            .collect();

        for (method_token, handlers) in sorted {
            let method = HttpMethod::parse(&method_token).map_err(|e| {
                DispatchError::configuration(format!("handler table key rejected: {e}"))
            })?;
            let table = routes.entry(method).or_default();
            for (value, raw_handler) in handlers {
                let location = format!("{method}.{value}");
                let descriptor = HandlerDescriptor::from_raw(raw_handler, &location)?;
                debug!(
                    method = %method,
                    discriminator_value = %value,
                    handler = %descriptor,
                    "Handler entry validated"
                );
                table.insert(value, descriptor);
            }
        }

        let registry = Self { routes };
        info!(
            methods = registry.routes.len(),
            total_handlers = registry.len(),
            "Handler registry validated"
        );
        Ok(registry)
    }

    /// Validate a registry described as a JSON-like document:
    /// `{ "GET": { "value": "Name@method" | ["Name@method", "arg", ...] } }`.
    pub fn from_value(value: Value) -> Result<Self, DispatchError> {
        let Value::Object(methods) = value else {
            return Err(DispatchError::configuration(
                "handler table must be a mapping of HTTP methods",
            ));
        };

        let mut raw = RawRegistry::new();
        for (method, handlers) in methods {
            let Value::Object(handlers) = handlers else {
                return Err(DispatchError::configuration(format!(
                    "handlers for '{method}' must be a mapping of discriminator values"
                )));
            };
            raw.insert(
                method,
                handlers
                    .into_iter()
                    .map(|(k, v)| (k, RawHandler::Value(v)))
                    .collect(),
            );
        }
        Self::validate(raw)
    }

    /// Descriptor registered for `(method, value)`. Other methods are not consulted.
    #[must_use]
    pub fn lookup(&self, method: HttpMethod, value: &str) -> Option<&HandlerDescriptor> {
        self.routes.get(&method).and_then(|t| t.get(value))
    }

    /// Every entry, sorted by method then discriminator value.
    #[must_use]
    pub fn entries(&self) -> Vec<(HttpMethod, &str, &HandlerDescriptor)> {
        let sorted: BTreeMap<(HttpMethod, &str), &HandlerDescriptor> = self
            .routes
            .iter()
            .flat_map(|(m, t)| t.iter().map(move |(v, d)| ((*m, v.as_str()), d)))
            .collect();
        sorted.into_iter().map(|((m, v), d)| (m, v, d)).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fluent construction of a [`HandlerRegistry`].
///
/// Entries are collected raw and validated together by
/// [`build`](HandlerRegistryBuilder::build).
#[derive(Default, Debug)]
pub struct HandlerRegistryBuilder {
    raw: RawRegistry,
}

impl HandlerRegistryBuilder {
    /// Add an entry under an arbitrary method token.
    #[must_use]
    pub fn route(
        mut self,
        method: &str,
        value: impl Into<String>,
        handler: impl Into<RawHandler>,
    ) -> Self {
        self.raw
            .entry(method.to_string())
            .or_default()
            .insert(value.into(), handler.into());
        self
    }

    /// Add a direct-callable entry.
    #[must_use]
    pub fn callable<F>(self, method: &str, value: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[String]) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        self.route(method, value, RawHandler::callable(f))
    }

    #[must_use]
    pub fn get(self, value: impl Into<String>, handler: impl Into<RawHandler>) -> Self {
        self.route("GET", value, handler)
    }

    #[must_use]
    pub fn post(self, value: impl Into<String>, handler: impl Into<RawHandler>) -> Self {
        self.route("POST", value, handler)
    }

    #[must_use]
    pub fn put(self, value: impl Into<String>, handler: impl Into<RawHandler>) -> Self {
        self.route("PUT", value, handler)
    }

    #[must_use]
    pub fn delete(self, value: impl Into<String>, handler: impl Into<RawHandler>) -> Self {
        self.route("DELETE", value, handler)
    }

    #[must_use]
    pub fn patch(self, value: impl Into<String>, handler: impl Into<RawHandler>) -> Self {
        self.route("PATCH", value, handler)
    }

    pub fn build(self) -> Result<HandlerRegistry, DispatchError> {
        HandlerRegistry::validate(self.raw)
    }
}
