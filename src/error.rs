//! # Dispatch Errors
//!
//! Every failure a dispatch can end with is a [`DispatchError`]. The variants
//! split into two groups:
//!
//! - **Infrastructure errors** (transport, method, configuration, body,
//!   discriminator, lookup, argument binding). These are raised by the
//!   dispatcher itself before any handler runs and always reach the caller.
//! - **Application errors** raised by user code (the pre-dispatch hook, a
//!   handler, or an interceptor that re-raises). These are only seen by the
//!   caller when no exception interceptor is registered.

use std::fmt;

use thiserror::Error;

/// Reportable dispatch failure.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request was not made by an XMLHttpRequest-style client, or its
    /// headers could not be read.
    #[error("transport context error: {reason}")]
    TransportContext {
        /// What was wrong with the transport context
        reason: String,
    },

    /// HTTP method outside GET, POST, PUT, DELETE, PATCH.
    #[error("unsupported HTTP method '{method}'")]
    UnsupportedMethod {
        /// The method token as received
        method: String,
    },

    /// A handler registry entry is structurally invalid.
    #[error("configuration error: {reason}")]
    Configuration {
        /// Which entry was rejected and why
        reason: String,
    },

    /// The body of a non-GET request could not be read or was empty.
    #[error("failed to read request body: {reason}")]
    BodyRead {
        /// Underlying read failure, or "empty body"
        reason: String,
    },

    /// The discriminator parameter is absent from the request.
    #[error("missing discriminator parameter '{field}'")]
    MissingDiscriminator {
        /// Name of the discriminator field
        field: String,
    },

    /// No handler is registered for the method and discriminator value.
    #[error("no handler registered for {method} {field}={value}")]
    HandlerNotFound {
        /// Request method
        method: String,
        /// Discriminator field name
        field: String,
        /// Discriminator value that missed
        value: String,
    },

    /// A symbolic reference names a controller that was never registered.
    #[error("controller '{controller}' is not registered")]
    ControllerNotFound {
        /// Unqualified controller name
        controller: String,
    },

    /// The controller exists but does not expose the referenced method.
    #[error("controller '{controller}' has no method '{method}'")]
    ControllerMethodNotFound {
        /// Unqualified controller name
        controller: String,
        /// Method name from the reference
        method: String,
    },

    /// A parameter declared as a forwarded argument is absent.
    #[error("missing argument parameter '{name}'")]
    MissingArgument {
        /// The request parameter that was expected
        name: String,
    },

    /// Failure raised by user code and not suppressed by an interceptor.
    #[error(transparent)]
    Application(anyhow::Error),

    /// Writing the result to the response channel failed.
    #[error("failed to write response output: {0}")]
    Output(#[source] std::io::Error),
}

/// Payload-free category of a [`DispatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchErrorKind {
    TransportContext,
    UnsupportedMethod,
    Configuration,
    BodyRead,
    MissingDiscriminator,
    HandlerNotFound,
    ControllerNotFound,
    ControllerMethodNotFound,
    MissingArgument,
    Application,
    Output,
}

impl DispatchError {
    /// Category of this error, for matching without destructuring.
    #[must_use]
    pub fn kind(&self) -> DispatchErrorKind {
        match self {
            DispatchError::TransportContext { .. } => DispatchErrorKind::TransportContext,
            DispatchError::UnsupportedMethod { .. } => DispatchErrorKind::UnsupportedMethod,
            DispatchError::Configuration { .. } => DispatchErrorKind::Configuration,
            DispatchError::BodyRead { .. } => DispatchErrorKind::BodyRead,
            DispatchError::MissingDiscriminator { .. } => DispatchErrorKind::MissingDiscriminator,
            DispatchError::HandlerNotFound { .. } => DispatchErrorKind::HandlerNotFound,
            DispatchError::ControllerNotFound { .. } => DispatchErrorKind::ControllerNotFound,
            DispatchError::ControllerMethodNotFound { .. } => {
                DispatchErrorKind::ControllerMethodNotFound
            }
            DispatchError::MissingArgument { .. } => DispatchErrorKind::MissingArgument,
            DispatchError::Application(_) => DispatchErrorKind::Application,
            DispatchError::Output(_) => DispatchErrorKind::Output,
        }
    }

    /// True for errors raised by user code rather than by the dispatcher.
    #[must_use]
    pub fn is_application(&self) -> bool {
        matches!(self, DispatchError::Application(_))
    }

    pub(crate) fn transport(reason: impl Into<String>) -> Self {
        DispatchError::TransportContext {
            reason: reason.into(),
        }
    }

    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        DispatchError::Configuration {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for DispatchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DispatchErrorKind::TransportContext => "TransportContextError",
            DispatchErrorKind::UnsupportedMethod => "UnsupportedMethodError",
            DispatchErrorKind::Configuration => "ConfigurationError",
            DispatchErrorKind::BodyRead => "BodyReadError",
            DispatchErrorKind::MissingDiscriminator => "MissingDiscriminatorError",
            DispatchErrorKind::HandlerNotFound => "HandlerNotFoundError",
            DispatchErrorKind::ControllerNotFound => "ControllerNotFoundError",
            DispatchErrorKind::ControllerMethodNotFound => "ControllerMethodNotFoundError",
            DispatchErrorKind::MissingArgument => "MissingArgumentError",
            DispatchErrorKind::Application => "ApplicationError",
            DispatchErrorKind::Output => "OutputError",
        };
        write!(f, "{}", s)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DispatchError>;
