//! # Exception Policy
//!
//! Uniform failure handling for the two places user code runs during a
//! dispatch: the pre-dispatch hook and the handler itself.
//!
//! [`ExceptionPolicy::guard`] runs a callback and:
//!
//! - returns [`Guarded::Value`] on success;
//! - on failure (a returned error or a panic), hands the error to the
//!   interceptor if one is registered and returns [`Guarded::Suppressed`];
//! - without an interceptor, returns the error unchanged as
//!   `DispatchError::Application`.
//!
//! An interceptor that itself fails re-raises: its error reaches the
//! dispatch caller.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{error, warn};

use crate::error::DispatchError;

/// Callback that observes failures of user code.
pub type Interceptor = Arc<dyn Fn(&anyhow::Error) -> anyhow::Result<()> + Send + Sync>;

/// Result of a guarded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    /// The callback completed normally.
    Value(T),
    /// The callback failed and the interceptor handled it.
    Suppressed,
}

impl<T> Guarded<T> {
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Guarded::Suppressed)
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Guarded::Value(v) => Some(v),
            Guarded::Suppressed => None,
        }
    }
}

/// Wraps user code so failures go through a single interceptor.
#[derive(Clone, Default)]
pub struct ExceptionPolicy {
    interceptor: Option<Interceptor>,
}

impl fmt::Debug for ExceptionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionPolicy")
            .field("interceptor", &self.interceptor.is_some())
            .finish()
    }
}

impl ExceptionPolicy {
    /// Policy without an interceptor: failures propagate.
    #[must_use]
    pub fn propagate() -> Self {
        Self { interceptor: None }
    }

    #[must_use]
    pub fn with_interceptor(interceptor: Interceptor) -> Self {
        Self {
            interceptor: Some(interceptor),
        }
    }

    #[must_use]
    pub fn has_interceptor(&self) -> bool {
        self.interceptor.is_some()
    }

    /// Run `callback` under this policy. `site` labels the call in logs.
    pub fn guard<T, F>(&self, site: &str, callback: F) -> Result<Guarded<T>, DispatchError>
    where
        F: FnOnce() -> anyhow::Result<T>,
    {
        let failure = match catch_unwind(AssertUnwindSafe(callback)) {
            Ok(Ok(value)) => return Ok(Guarded::Value(value)),
            Ok(Err(err)) => err,
            Err(panic) => {
                let panic_message = panic_message(panic.as_ref());
                error!(
                    site = %site,
                    panic_message = %panic_message,
                    "User code panicked"
                );
                anyhow::anyhow!("panicked: {panic_message}")
            }
        };

        let Some(interceptor) = &self.interceptor else {
            warn!(site = %site, error = %failure, "Unhandled application error");
            return Err(DispatchError::Application(failure));
        };

        warn!(site = %site, error = %failure, "Application error passed to interceptor");
        match interceptor(&failure) {
            Ok(()) => Ok(Guarded::Suppressed),
            Err(reraised) => {
                error!(site = %site, error = %reraised, "Interceptor re-raised");
                Err(DispatchError::Application(reraised))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_success_passes_through() {
        let policy = ExceptionPolicy::propagate();
        let r = policy.guard("handler", || Ok(5)).unwrap();
        assert_eq!(r, Guarded::Value(5));
    }

    #[test]
    fn test_error_propagates_unmodified() {
        let policy = ExceptionPolicy::propagate();
        let err = policy
            .guard::<(), _>("handler", || Err(anyhow::anyhow!("database offline")))
            .unwrap_err();
        assert!(err.is_application());
        assert_eq!(err.to_string(), "database offline");
    }

    #[test]
    fn test_interceptor_suppresses() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let policy = ExceptionPolicy::with_interceptor(Arc::new(move |e: &anyhow::Error| {
            sink.lock().unwrap().push(e.to_string());
            Ok(())
        }));

        let r = policy
            .guard::<String, _>("handler", || Err(anyhow::anyhow!("nope")))
            .unwrap();
        assert!(r.is_suppressed());
        assert_eq!(*seen.lock().unwrap(), vec!["nope".to_string()]);
    }

    #[test]
    fn test_interceptor_not_called_on_success() {
        let policy = ExceptionPolicy::with_interceptor(Arc::new(|_: &anyhow::Error| {
            Err(anyhow::anyhow!("should not run"))
        }));
        assert_eq!(policy.guard("hook", || Ok("ok")).unwrap().into_value(), Some("ok"));
    }

    #[test]
    fn test_interceptor_reraise_propagates() {
        let policy = ExceptionPolicy::with_interceptor(Arc::new(|e: &anyhow::Error| {
            Err(anyhow::anyhow!("wrapped: {e}"))
        }));
        let err = policy
            .guard::<(), _>("handler", || Err(anyhow::anyhow!("inner")))
            .unwrap_err();
        assert_eq!(err.to_string(), "wrapped: inner");
    }

    #[test]
    fn test_panic_is_treated_as_error() {
        let policy = ExceptionPolicy::propagate();
        let err = policy
            .guard::<(), _>("handler", || panic!("kaboom"))
            .unwrap_err();
        assert_eq!(err.to_string(), "panicked: kaboom");
    }
}
