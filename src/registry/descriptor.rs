use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::DispatchError;

/// A handler function registered directly, not tied to a controller.
///
/// Receives the request parameter values positionally, with the
/// discriminator's own entry removed.
pub type HandlerFn = Arc<dyn Fn(&[String]) -> anyhow::Result<String> + Send + Sync>;

/// A handler entry as supplied by the registrant, before validation.
///
/// Entries coming from configuration files are [`RawHandler::Value`]s and may
/// have any shape; validation decides whether they describe a handler.
#[derive(Clone)]
pub enum RawHandler {
    Value(Value),
    Callable(HandlerFn),
}

impl RawHandler {
    /// Wrap a closure as a direct-callable handler.
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&[String]) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        RawHandler::Callable(Arc::new(f))
    }
}

impl fmt::Debug for RawHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawHandler::Value(v) => f.debug_tuple("Value").field(v).finish(),
            RawHandler::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

impl From<Value> for RawHandler {
    fn from(v: Value) -> Self {
        RawHandler::Value(v)
    }
}

impl From<&str> for RawHandler {
    fn from(s: &str) -> Self {
        RawHandler::Value(Value::String(s.to_string()))
    }
}

impl From<String> for RawHandler {
    fn from(s: String) -> Self {
        RawHandler::Value(Value::String(s))
    }
}

impl From<Vec<&str>> for RawHandler {
    fn from(items: Vec<&str>) -> Self {
        RawHandler::Value(Value::Array(
            items.into_iter().map(|s| Value::String(s.to_string())).collect(),
        ))
    }
}

impl From<Vec<String>> for RawHandler {
    fn from(items: Vec<String>) -> Self {
        RawHandler::Value(Value::Array(items.into_iter().map(Value::String).collect()))
    }
}

impl From<HandlerFn> for RawHandler {
    fn from(f: HandlerFn) -> Self {
        RawHandler::Callable(f)
    }
}

/// How to reach and invoke a handler, decided once at validation time.
#[derive(Clone)]
pub enum HandlerDescriptor {
    /// `"Name@method"`: call `method` on controller `Name` with no arguments.
    MethodRef { controller: String, method: String },
    /// `["Name@method", "p1", "p2", ...]`: forward the named request
    /// parameters as positional arguments, in declared order.
    MethodRefWithArgs {
        controller: String,
        method: String,
        args: Vec<String>,
    },
    /// A function value supplied by the registrant.
    DirectCallable(HandlerFn),
}

impl HandlerDescriptor {
    /// Decode a raw entry into one of the three descriptor shapes.
    ///
    /// `location` names the entry in error messages (e.g. `GET.save`).
    pub fn from_raw(raw: RawHandler, location: &str) -> Result<Self, DispatchError> {
        match raw {
            RawHandler::Callable(f) => Ok(HandlerDescriptor::DirectCallable(f)),
            RawHandler::Value(Value::String(reference)) => {
                let (controller, method) = parse_reference(&reference, location)?;
                Ok(HandlerDescriptor::MethodRef { controller, method })
            }
            RawHandler::Value(Value::Array(items)) => {
                let mut items = items.into_iter();
                let reference = match items.next() {
                    Some(Value::String(s)) => s,
                    Some(other) => {
                        return Err(DispatchError::configuration(format!(
                            "handler {location}: first element must be a \"Name@method\" string, got {}",
                            json_type(&other)
                        )))
                    }
                    None => {
                        return Err(DispatchError::configuration(format!(
                            "handler {location}: argument list is empty"
                        )))
                    }
                };
                let (controller, method) = parse_reference(&reference, location)?;
                let args = items
                    .enumerate()
                    .map(|(i, v)| match v {
                        Value::String(name) => Ok(name),
                        other => Err(DispatchError::configuration(format!(
                            "handler {location}: argument #{} must be a parameter name, got {}",
                            i + 1,
                            json_type(&other)
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(HandlerDescriptor::MethodRefWithArgs {
                    controller,
                    method,
                    args,
                })
            }
            RawHandler::Value(other) => Err(DispatchError::configuration(format!(
                "handler {location}: expected a string, a list or a callable, got {}",
                json_type(&other)
            ))),
        }
    }

    /// Controller name for symbolic references.
    #[must_use]
    pub fn controller(&self) -> Option<&str> {
        match self {
            HandlerDescriptor::MethodRef { controller, .. }
            | HandlerDescriptor::MethodRefWithArgs { controller, .. } => Some(controller),
            HandlerDescriptor::DirectCallable(_) => None,
        }
    }
}

impl fmt::Display for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerDescriptor::MethodRef { controller, method } => {
                write!(f, "{controller}@{method}")
            }
            HandlerDescriptor::MethodRefWithArgs {
                controller,
                method,
                args,
            } => write!(f, "{controller}@{method}({})", args.join(", ")),
            HandlerDescriptor::DirectCallable(_) => f.write_str("<callable>"),
        }
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerDescriptor::MethodRef { controller, method } => f
                .debug_struct("MethodRef")
                .field("controller", controller)
                .field("method", method)
                .finish(),
            HandlerDescriptor::MethodRefWithArgs {
                controller,
                method,
                args,
            } => f
                .debug_struct("MethodRefWithArgs")
                .field("controller", controller)
                .field("method", method)
                .field("args", args)
                .finish(),
            HandlerDescriptor::DirectCallable(_) => f.write_str("DirectCallable(..)"),
        }
    }
}

/// Split `"Name@method"` into its two non-empty halves.
fn parse_reference(reference: &str, location: &str) -> Result<(String, String), DispatchError> {
    match reference.split_once('@') {
        Some((controller, method))
            if !controller.is_empty() && !method.is_empty() && !method.contains('@') =>
        {
            Ok((controller.to_string(), method.to_string()))
        }
        _ => Err(DispatchError::configuration(format!(
            "handler {location}: '{reference}' is not a \"Name@method\" reference"
        ))),
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchErrorKind;
    use serde_json::json;

    #[test]
    fn test_string_becomes_method_ref() {
        let d = HandlerDescriptor::from_raw("Foo@bar".into(), "GET.bar").unwrap();
        match d {
            HandlerDescriptor::MethodRef { controller, method } => {
                assert_eq!(controller, "Foo");
                assert_eq!(method, "bar");
            }
            other => panic!("unexpected descriptor {other:?}"),
        }
    }

    #[test]
    fn test_list_becomes_method_ref_with_args() {
        let d = HandlerDescriptor::from_raw(vec!["Foo@greet", "name", "title"].into(), "GET.greet")
            .unwrap();
        assert_eq!(d.to_string(), "Foo@greet(name, title)");
        assert_eq!(d.controller(), Some("Foo"));
    }

    #[test]
    fn test_list_without_args_is_allowed() {
        let d = HandlerDescriptor::from_raw(vec!["Foo@bar"].into(), "GET.bar").unwrap();
        assert!(matches!(d, HandlerDescriptor::MethodRefWithArgs { ref args, .. } if args.is_empty()));
    }

    #[test]
    fn test_callable() {
        let d = HandlerDescriptor::from_raw(RawHandler::callable(|_| Ok(String::new())), "GET.x")
            .unwrap();
        assert!(d.controller().is_none());
        assert_eq!(d.to_string(), "<callable>");
    }

    #[test]
    fn test_rejected_shapes() {
        let bad = [
            json!(42),
            json!(null),
            json!(true),
            json!({"controller": "Foo"}),
            json!([]),
            json!([1, "name"]),
            json!(["Foo@bar", 7]),
            json!("Foo"),
            json!("@bar"),
            json!("Foo@"),
            json!("Foo@bar@baz"),
        ];
        for v in bad {
            let err = HandlerDescriptor::from_raw(v.clone().into(), "POST.x").unwrap_err();
            assert_eq!(err.kind(), DispatchErrorKind::Configuration, "value {v}");
            assert!(err.to_string().contains("POST.x"));
        }
    }
}
