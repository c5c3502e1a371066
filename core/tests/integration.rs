//! End-to-end calls against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives both repository
//! operations over real HTTP through the default `UreqTransport`.

use std::io::Write;
use std::net::{SocketAddr, TcpListener};
use std::thread;
use std::time::{Duration, Instant};

use codecov_core::{ApiError, Client, Context, Endpoint, TransportError, UreqTransport};

fn start_mock_server() -> SocketAddr {
    let std_listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client_for(addr: SocketAddr, token: &str) -> Client {
    let mut client = Client::new(token);
    client.set_endpoint(Endpoint::parse(&format!("http://{addr}/api/")).unwrap());
    client
}

#[test]
fn repository_operations_round_trip() {
    let addr = start_mock_server();
    let client = client_for(addr, "testing");
    let ctx = Context::background().with_timeout(Duration::from_secs(10));

    // Step 1: list the seeded owner.
    let listed = client.list_repositories(&ctx, "test-account").unwrap();
    assert_eq!(listed.meta.status, 200);
    assert_eq!(listed.repos.len(), 2);
    assert!(listed.repos[0].updatestamp.is_some());
    assert!(listed.repos[1].updatestamp.is_none());
    assert_eq!(listed.repos[1].coverage, 0.0);

    // Step 2: fetch one of them.
    let fetched = client
        .get_repository(&ctx, "test-account", "guess-my-word")
        .unwrap();
    assert_eq!(fetched.meta.status, 200);
    assert_eq!(fetched.repo, listed.repos[0]);

    // Step 3: unknown owner surfaces the envelope's reason.
    let err = client.list_repositories(&ctx, "nobody").unwrap_err();
    assert!(matches!(err, ApiError::Api { status: 404, .. }));
    assert_eq!(err.to_string(), "404: Team not found.");

    // Step 4: unknown repository.
    let err = client
        .get_repository(&ctx, "test-account", "missing")
        .unwrap_err();
    assert_eq!(err.to_string(), "404: GitHub API: Not Found");
}

#[test]
fn empty_token_is_rejected_by_server() {
    let addr = start_mock_server();
    let client = client_for(addr, "");

    let err = client
        .list_repositories(&Context::background(), "test-account")
        .unwrap_err();
    assert_eq!(err.to_string(), "401: Not authenticated.");
}

/// Accept connections, write `reply` on each, then hold them open without
/// ever finishing the response.
fn stalling_server(reply: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming() {
            match stream {
                Ok(mut stream) => {
                    let _ = stream.write_all(reply);
                    let _ = stream.flush();
                    held.push(stream);
                }
                Err(_) => break,
            }
        }
    });

    addr
}

#[test]
fn silent_server_hits_deadline() {
    let client = client_for(stalling_server(b""), "testing");
    let ctx = Context::background().with_timeout(Duration::from_millis(200));
    let started = Instant::now();
    let err = client.list_repositories(&ctx, "test-account").unwrap_err();

    assert!(
        matches!(err, ApiError::Transport(TransportError::DeadlineExceeded)),
        "unexpected error: {err:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn deadline_while_reading_body_is_deadline_exceeded() {
    let addr = stalling_server(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"meta\":");
    let client = client_for(addr, "testing");
    let ctx = Context::background().with_timeout(Duration::from_millis(300));

    let err = client.list_repositories(&ctx, "test-account").unwrap_err();
    assert!(
        matches!(err, ApiError::Transport(TransportError::DeadlineExceeded)),
        "unexpected error: {err:?}"
    );
}

#[test]
fn cancel_while_waiting_aborts_the_call() {
    let client = client_for(stalling_server(b""), "testing");
    let (ctx, cancel) = Context::background()
        .with_timeout(Duration::from_secs(5))
        .with_cancel();

    thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        cancel.cancel();
    });

    let started = Instant::now();
    let err = client.list_repositories(&ctx, "test-account").unwrap_err();
    assert!(
        matches!(err, ApiError::Transport(TransportError::Canceled)),
        "unexpected error: {err:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
}

#[test]
fn cancelable_context_still_completes_normally() {
    let client = client_for(start_mock_server(), "testing");
    let (ctx, _cancel) = Context::background().with_cancel();

    let listed = client.list_repositories(&ctx, "test-account").unwrap();
    assert_eq!(listed.repos.len(), 2);
}

#[test]
fn body_over_limit_is_a_transport_error() {
    let addr = start_mock_server();
    let mut client = Client::with_transport("testing", UreqTransport::default().with_body_limit(16));
    client.set_endpoint(Endpoint::parse(&format!("http://{addr}/api/")).unwrap());

    let err = client
        .list_repositories(&Context::background(), "test-account")
        .unwrap_err();
    assert!(
        matches!(err, ApiError::Transport(TransportError::Http(ureq::Error::BodyExceedsLimit(_)))),
        "unexpected error: {err:?}"
    );
}
