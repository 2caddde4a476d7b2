//! # Handler Resolution
//!
//! Turns a [`HandlerDescriptor`] into an [`Invocation`]: a fully bound unit
//! of work that can be called exactly once. All lookups and argument binding
//! happen here, before any user code runs, so every failure raised by this
//! module is an infrastructure error that bypasses the exception interceptor.
//!
//! | Descriptor            | Target                    | Arguments                                  |
//! |-----------------------|---------------------------|--------------------------------------------|
//! | `MethodRef`           | controller method         | none                                       |
//! | `MethodRefWithArgs`   | controller method         | named parameters, in declared order        |
//! | `DirectCallable`      | the function              | all parameter values except discriminator  |

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::context::RequestContext;
use crate::controller::{Controller, ControllerSet};
use crate::error::DispatchError;
use crate::registry::{HandlerDescriptor, HandlerFn};

/// What an [`Invocation`] calls.
#[derive(Clone)]
pub enum Target {
    Method {
        controller_name: String,
        controller: Arc<dyn Controller>,
        method: String,
    },
    Function(HandlerFn),
}

/// A resolved handler with its positional arguments bound.
#[derive(Clone)]
pub struct Invocation {
    target: Target,
    args: Vec<String>,
}

impl Invocation {
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Call the handler. Consumes the invocation so it runs once.
    pub fn invoke(self) -> anyhow::Result<String> {
        match &self.target {
            Target::Method {
                controller, method, ..
            } => controller.invoke(method, &self.args),
            Target::Function(f) => f(&self.args),
        }
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("target", &self.to_string())
            .field("args", &self.args)
            .finish()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::Method {
                controller_name,
                method,
                ..
            } => write!(f, "{controller_name}@{method}"),
            Target::Function(_) => f.write_str("<callable>"),
        }
    }
}

/// Resolves descriptors against registered controllers.
pub struct HandlerResolver<'a> {
    controllers: &'a ControllerSet,
    discriminator: &'a str,
}

impl<'a> HandlerResolver<'a> {
    #[must_use]
    pub fn new(controllers: &'a ControllerSet, discriminator: &'a str) -> Self {
        Self {
            controllers,
            discriminator,
        }
    }

    pub fn resolve(
        &self,
        descriptor: &HandlerDescriptor,
        ctx: &RequestContext,
    ) -> Result<Invocation, DispatchError> {
        let invocation = match descriptor {
            HandlerDescriptor::MethodRef { controller, method } => Invocation {
                target: self.controller_target(controller, method)?,
                args: Vec::new(),
            },
            HandlerDescriptor::MethodRefWithArgs {
                controller,
                method,
                args,
            } => {
                let target = self.controller_target(controller, method)?;
                let args = args
                    .iter()
                    .map(|name| {
                        ctx.get(name)
                            .map(str::to_string)
                            .ok_or_else(|| DispatchError::MissingArgument { name: name.clone() })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Invocation { target, args }
            }
            HandlerDescriptor::DirectCallable(f) => Invocation {
                target: Target::Function(Arc::clone(f)),
                args: ctx.values_except(self.discriminator),
            },
        };

        debug!(
            handler = %invocation,
            arg_count = invocation.args.len(),
            "Handler resolved"
        );
        Ok(invocation)
    }

    fn controller_target(&self, name: &str, method: &str) -> Result<Target, DispatchError> {
        let controller =
            self.controllers
                .resolve(name)
                .ok_or_else(|| DispatchError::ControllerNotFound {
                    controller: name.to_string(),
                })?;
        if !controller.has_method(method) {
            return Err(DispatchError::ControllerMethodNotFound {
                controller: name.to_string(),
                method: method.to_string(),
            });
        }
        Ok(Target::Method {
            controller_name: name.to_string(),
            controller: Arc::clone(controller),
            method: method.to_string(),
        })
    }
}
