//! Tests for the tiny_http engine over real loopback sockets
//!
//! Every host binds port 0 so tests never collide.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use nancy_pack::adapters::{EchoDispatcher, TinyHttpEngine};
use nancy_pack::core::models::HostConfig;
use nancy_pack::core::ports::{DispatchRequest, DispatchResponse, Dispatcher, EngineError};
use nancy_pack::core::services::{HostController, HostError};

/// Minimal HTTP/1.1 client; returns status and body
fn request(addr: SocketAddr, method: &str, target: &str, body: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    write!(
        stream,
        "{method} {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .unwrap();

    let mut raw = String::new();
    stream.read_to_string(&mut raw).unwrap();

    let status = raw.split_whitespace().nth(1).unwrap().parse().unwrap();
    let body = raw.split_once("\r\n\r\n").map(|(_, b)| b.to_string()).unwrap_or_default();
    (status, body)
}

fn get(addr: SocketAddr, target: &str) -> (u16, String) {
    request(addr, "GET", target, "")
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap()
}

/// The listening socket closes on tiny_http's accept thread, so allow it a moment
fn port_is_released(addr: SocketAddr) -> bool {
    (0..50).any(|_| {
        let free = TcpListener::bind(addr).is_ok();
        if !free {
            thread::sleep(Duration::from_millis(50));
        }
        free
    })
}

fn echo_host(uris: &[&str]) -> HostController<TinyHttpEngine> {
    let mut host = HostController::with_output(TinyHttpEngine, io::sink());
    host.set_dispatcher(Arc::new(EchoDispatcher)).unwrap();
    host.set_listen_uris(uris).unwrap();
    host
}

fn bound_addr(host: &HostController<TinyHttpEngine>) -> SocketAddr {
    host.handle().unwrap().local_addrs()[0]
}

#[test]
fn test_serves_requests_through_dispatcher() {
    let mut host = echo_host(&["http://127.0.0.1:0/"]);
    host.start().unwrap();
    let addr = bound_addr(&host);

    assert_ne!(addr.port(), 0);

    let (status, body) = request(addr, "POST", "/items?page=2", "hello");
    let body = json(&body);

    assert_eq!(status, 200);
    assert_eq!(body["method"], "POST");
    assert_eq!(body["path"], "/items");
    assert_eq!(body["query"], "page=2");
    assert_eq!(body["body_bytes"], 5);
}

#[test]
fn test_prefixes_share_one_socket() {
    let mut host = echo_host(&["http://127.0.0.1:0/", "http://127.0.0.1:0/api/"]);
    host.start().unwrap();

    assert_eq!(host.handle().unwrap().local_addrs().len(), 1);
    let addr = bound_addr(&host);

    let (_, root) = get(addr, "/status");
    let (_, api) = get(addr, "/api/status");

    assert_eq!(json(&root)["base_uri"], "http://127.0.0.1:0/");
    assert_eq!(json(&root)["path"], "/status");
    assert_eq!(json(&api)["base_uri"], "http://127.0.0.1:0/api/");
    assert_eq!(json(&api)["path"], "/status");
}

#[test]
fn test_outside_prefix_is_not_found() {
    let mut host = echo_host(&["http://127.0.0.1:0/app/"]);
    host.start().unwrap();
    let addr = bound_addr(&host);

    let (status, _) = get(addr, "/elsewhere");
    assert_eq!(status, 404);

    let (status, body) = get(addr, "/app");
    assert_eq!(status, 200);
    assert_eq!(json(&body)["path"], "/");
}

#[test]
fn test_dispatcher_panic_is_500_and_serving_continues() {
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(|request: &DispatchRequest| {
        assert!(request.path != "/boom", "dispatcher blew up");
        DispatchResponse::text(200, "fine")
    });
    let mut host = HostController::with_output(TinyHttpEngine, io::sink());
    host.set_dispatcher(dispatcher).unwrap();
    host.set_listen_uris(["http://127.0.0.1:0/"]).unwrap();
    host.start().unwrap();
    let addr = bound_addr(&host);

    let (status, _) = get(addr, "/boom");
    assert_eq!(status, 500);

    let (status, body) = get(addr, "/ok");
    assert_eq!(status, 200);
    assert_eq!(body, "fine");
}

#[test]
fn test_response_headers_are_sent() {
    let dispatcher: Arc<dyn Dispatcher> = Arc::new(|_: &DispatchRequest| {
        DispatchResponse::new(201).with_header("X-Pack", "yes").with_body("made")
    });
    let mut host = HostController::with_output(TinyHttpEngine, io::sink());
    host.set_dispatcher(dispatcher).unwrap();
    host.set_listen_uris(["http://127.0.0.1:0/"]).unwrap();
    host.set_host_config(Some(HostConfig {
        allow_chunked_encoding: false,
        worker_threads: 2,
        ..HostConfig::default()
    }))
    .unwrap();
    host.start().unwrap();
    let addr = bound_addr(&host);

    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    write!(stream, "GET / HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n").unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).unwrap();

    assert!(raw.starts_with("HTTP/1.1 201"));
    assert!(raw.to_lowercase().contains("x-pack: yes"));
    assert!(raw.ends_with("made"));
}

#[test]
fn test_oversized_body_is_rejected() {
    let mut host = echo_host(&["http://127.0.0.1:0/"]);
    host.set_host_config(Some(HostConfig {
        max_body_bytes: 8,
        ..HostConfig::default()
    }))
    .unwrap();
    host.start().unwrap();
    let addr = bound_addr(&host);

    let (status, _) = request(addr, "POST", "/upload", "0123456789abcdef");
    assert_eq!(status, 413);

    let (status, body) = request(addr, "POST", "/upload", "01234567");
    assert_eq!(status, 200);
    assert_eq!(json(&body)["body_bytes"], 8);
}

#[test]
fn test_port_in_use_fails_start() {
    let blocker = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = blocker.local_addr().unwrap().port();
    let mut host = echo_host(&[format!("http://127.0.0.1:{port}/").as_str()]);

    let err = host.start().unwrap_err();

    assert!(matches!(err, HostError::EngineStart(EngineError::Bind { .. })));
    assert!(!host.is_started());
}

#[test]
fn test_partial_bind_failure_releases_earlier_sockets() {
    let blocker = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = blocker.local_addr().unwrap().port();
    let free = TcpListener::bind("127.0.0.1:0").unwrap();
    let free_port = free.local_addr().unwrap().port();
    drop(free);

    let mut host = echo_host(&[
        format!("http://127.0.0.1:{free_port}/").as_str(),
        format!("http://127.0.0.1:{port}/").as_str(),
    ]);
    assert!(host.start().is_err());

    // The first socket was bound then released
    assert!(port_is_released(SocketAddr::from(([127, 0, 0, 1], free_port))));
}

#[test]
fn test_https_is_unsupported() {
    let mut host = echo_host(&["https://127.0.0.1:0/"]);

    let err = host.start().unwrap_err();

    assert!(matches!(
        err,
        HostError::EngineStart(EngineError::UnsupportedScheme { ref scheme, .. }) if scheme == "https"
    ));
    assert!(!host.is_started());
}

#[test]
fn test_changing_uris_while_running_rebinds() {
    let mut host = echo_host(&["http://127.0.0.1:0/"]);
    host.start().unwrap();

    host.set_listen_uris(["http://127.0.0.1:0/v2/"]).unwrap();

    assert!(host.is_started());
    let addr = bound_addr(&host);
    let (status, body) = get(addr, "/v2/things");
    assert_eq!(status, 200);
    assert_eq!(json(&body)["path"], "/things");
}

#[test]
fn test_stop_closes_socket() {
    let mut host = echo_host(&["http://127.0.0.1:0/"]);
    host.start().unwrap();
    let addr = bound_addr(&host);

    host.stop();

    assert!(port_is_released(addr));
}

#[test]
fn test_empty_uri_set_starts_without_sockets() {
    let mut host = echo_host(&[]);

    host.start().unwrap();

    assert!(host.is_started());
    assert!(host.handle().unwrap().local_addrs().is_empty());
}
