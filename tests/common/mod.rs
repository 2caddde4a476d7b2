#![allow(dead_code)]

pub mod temp_files {
    use std::io::Write;

    /// Write `content` to a temporary file with the given extension.
    pub fn create_temp_config(content: &str, ext: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new()
            .prefix("ajax_dispatch_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }
}

pub mod tracing_util {
    /// Routes log output of the current test thread to the test harness.
    pub struct TestTracing {
        _guard: tracing::subscriber::DefaultGuard,
    }

    impl TestTracing {
        pub fn init() -> Self {
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::DEBUG)
                .with_test_writer()
                .finish();
            Self {
                _guard: tracing::subscriber::set_default(subscriber),
            }
        }
    }
}

pub mod fixtures {
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use ajax_dispatch::{Controller, HeaderAccessError, InboundRequest};
    use http::HeaderMap;

    /// Controller used across the dispatcher tests.
    #[derive(Default)]
    pub struct Foo {
        pub calls: Arc<AtomicUsize>,
    }

    impl Foo {
        pub fn counting(calls: Arc<AtomicUsize>) -> Self {
            Self { calls }
        }
    }

    impl Controller for Foo {
        fn methods(&self) -> &[&str] {
            &["bar", "greet", "fail", "explode", "falsy"]
        }

        fn invoke(&self, method: &str, args: &[String]) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match method {
                "bar" => Ok("ok".to_string()),
                "greet" => Ok(format!("hi {}", args[0])),
                "fail" => anyhow::bail!("greeting service unavailable"),
                "explode" => panic!("handler blew up"),
                "falsy" => Ok("false".to_string()),
                other => anyhow::bail!("Foo has no method {other}"),
            }
        }
    }

    /// Host whose header retrieval fails.
    pub struct BrokenHeaders;

    impl InboundRequest for BrokenHeaders {
        fn method(&self) -> &str {
            "GET"
        }

        fn headers(&self) -> Result<&HeaderMap, HeaderAccessError> {
            Err(HeaderAccessError::Failed("socket closed".to_string()))
        }

        fn query_pairs(&self) -> Vec<(String, String)> {
            vec![("action".to_string(), "bar".to_string())]
        }

        fn read_body(&mut self) -> io::Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    /// XHR POST whose body read fails.
    pub struct UnreadableBody {
        pub headers: HeaderMap,
    }

    impl UnreadableBody {
        pub fn new() -> Self {
            let mut headers = HeaderMap::new();
            headers.insert(
                "x-requested-with",
                http::HeaderValue::from_static("XMLHttpRequest"),
            );
            Self { headers }
        }
    }

    impl InboundRequest for UnreadableBody {
        fn method(&self) -> &str {
            "POST"
        }

        fn headers(&self) -> Result<&HeaderMap, HeaderAccessError> {
            Ok(&self.headers)
        }

        fn query_pairs(&self) -> Vec<(String, String)> {
            Vec::new()
        }

        fn read_body(&mut self) -> io::Result<Vec<u8>> {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "client went away"))
        }
    }
}
