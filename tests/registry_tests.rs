//! Handler registry validation through the public API

use ajax_dispatch::{DispatchErrorKind, HandlerDescriptor, HandlerRegistry, HttpMethod, RawHandler};
use serde_json::json;

#[test]
fn test_every_unsupported_method_key_is_a_configuration_error() {
    for key in ["HEAD", "OPTIONS", "TRACE", "CONNECT", "post", "Get", ""] {
        let err = HandlerRegistry::from_value(json!({ key: { "x": "Foo@bar" } })).unwrap_err();
        assert_eq!(err.kind(), DispatchErrorKind::Configuration, "key {key:?}");
    }
}

#[test]
fn test_all_supported_methods_accepted() {
    let mut builder = HandlerRegistry::builder();
    for m in HttpMethod::ALL {
        builder = builder.route(m.as_str(), "ping", "Health@ping");
    }
    let registry = builder.build().unwrap();
    assert_eq!(registry.len(), 5);
    for m in HttpMethod::ALL {
        assert!(registry.lookup(m, "ping").is_some());
    }
}

#[test]
fn test_one_bad_entry_rejects_whole_table() {
    let err = HandlerRegistry::from_value(json!({
        "GET": { "ok": "Foo@bar", "bad": { "nested": true } },
    }))
    .unwrap_err();
    assert_eq!(err.kind(), DispatchErrorKind::Configuration);
    assert!(err.to_string().contains("GET.bad"));
}

#[test]
fn test_references_are_not_checked_against_controllers() {
    let registry = HandlerRegistry::builder()
        .get("x", "DoesNotExist@nothing")
        .build()
        .unwrap();
    assert!(matches!(
        registry.lookup(HttpMethod::Get, "x"),
        Some(HandlerDescriptor::MethodRef { controller, method })
            if controller == "DoesNotExist" && method == "nothing"
    ));
}

#[test]
fn test_shapes_are_decided_at_validation() {
    let registry = HandlerRegistry::builder()
        .get("a", "C@a")
        .get("b", vec!["C@b", "p", "q"])
        .get("c", RawHandler::callable(|args| Ok(args.concat())))
        .get("d", json!(["C@d"]))
        .build()
        .unwrap();

    assert!(matches!(
        registry.lookup(HttpMethod::Get, "a"),
        Some(HandlerDescriptor::MethodRef { .. })
    ));
    match registry.lookup(HttpMethod::Get, "b") {
        Some(HandlerDescriptor::MethodRefWithArgs { args, .. }) => assert_eq!(args, &["p", "q"]),
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        registry.lookup(HttpMethod::Get, "c"),
        Some(HandlerDescriptor::DirectCallable(_))
    ));
    assert!(matches!(
        registry.lookup(HttpMethod::Get, "d"),
        Some(HandlerDescriptor::MethodRefWithArgs { args, .. }) if args.is_empty()
    ));
}

#[test]
fn test_later_entry_for_same_key_replaces_earlier() {
    let registry = HandlerRegistry::builder()
        .get("x", "First@run")
        .get("x", "Second@run")
        .build()
        .unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.lookup(HttpMethod::Get, "x").unwrap().controller(),
        Some("Second")
    );
}
