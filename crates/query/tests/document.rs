//! Document construction through a fake HTTP collaborator

use query::{Document, HttpClient, HttpResponse, QueryError, Result};
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

const PAGE: &str = r#"<html><body><p id="a">x</p><p id="b">y</p></body></html>"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Body that records whether it was dropped, optionally failing mid-read
struct TrackedBody {
    data: io::Cursor<Vec<u8>>,
    fail: bool,
    released: Arc<AtomicBool>,
}

impl Read for TrackedBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        }
        self.data.read(buf)
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Serves one page, redirecting every address to `final_url`
struct FakeClient {
    final_url: &'static str,
    body: &'static str,
    fail_body: bool,
    released: Arc<AtomicBool>,
}

impl FakeClient {
    fn new(final_url: &'static str, body: &'static str) -> Self {
        Self {
            final_url,
            body,
            fail_body: false,
            released: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl HttpClient for FakeClient {
    fn get(&self, address: &str) -> Result<HttpResponse> {
        if address.contains(".invalid") {
            return Err(QueryError::transport(address, "no such host"));
        }
        Ok(HttpResponse {
            url: Url::parse(self.final_url).unwrap(),
            body: Box::new(TrackedBody {
                data: io::Cursor::new(self.body.as_bytes().to_vec()),
                fail: self.fail_body,
                released: Arc::clone(&self.released),
            }),
        })
    }
}

#[test]
fn test_construct_uses_resolved_url() {
    init_tracing();
    let client = FakeClient::new("https://example.test/final", PAGE);

    let doc = Document::construct_with("http://example.test/start", &client).unwrap();

    assert_eq!(doc.url().as_str(), "https://example.test/final");
    assert_eq!(doc.find("p").len(), 2);
    assert!(client.released.load(Ordering::SeqCst));
}

#[test]
fn test_transport_failure_returns_no_document() {
    let client = FakeClient::new("http://unused.test/", PAGE);

    let err = Document::construct_with("http://bad-host.invalid", &client).unwrap_err();

    assert!(err.is_transport());
    assert!(!client.released.load(Ordering::SeqCst));
}

#[test]
fn test_body_read_failure_is_parse_error_and_releases_body() {
    init_tracing();
    let mut client = FakeClient::new("http://example.test/", PAGE);
    client.fail_body = true;

    let err = Document::construct_with("http://example.test/", &client).unwrap_err();

    assert!(err.is_parse());
    assert!(client.released.load(Ordering::SeqCst));
}

#[test]
fn test_real_client_bad_host() {
    init_tracing();
    let err = Document::construct("http://bad-host.invalid").unwrap_err();
    assert!(matches!(err, QueryError::Transport { .. }));
}

#[test]
fn test_documents_are_shareable_across_threads() {
    let doc = Document::parse(PAGE, Url::parse("http://example.test/").unwrap()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let doc = Arc::clone(&doc);
            std::thread::spawn(move || doc.find("p").attr("id").map(String::from))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Some("a"));
    }
}
