//! End-to-end tests over real TCP connections.
//!
//! Each test binds an ephemeral hub, drives script clients through the
//! wire protocol, and asserts on the replies.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use relay_hub::{Hub, HubConfig};

const READ_WINDOW: Duration = Duration::from_millis(200);

fn test_config() -> HubConfig {
    HubConfig {
        bind_address: "127.0.0.1".to_string(),
        port: 0,
        max_message_len: 1024,
        shutdown_timeout_ms: 2000,
        ack_poll_interval_ms: 20,
        log_file: None,
    }
}

async fn spawn_hub() -> (SocketAddr, JoinHandle<()>) {
    spawn_hub_with(test_config()).await
}

async fn spawn_hub_with(config: HubConfig) -> (SocketAddr, JoinHandle<()>) {
    let hub = Hub::bind(config).await.expect("bind hub");
    let addr = hub.local_addr();
    let handle = tokio::spawn(async move {
        hub.run().await.expect("hub run failed");
    });
    (addr, handle)
}

struct TestClient {
    name: String,
    reader: BufReader<TcpStream>,
}

impl TestClient {
    /// Open a raw connection without sending a registration line.
    async fn connect_raw(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect");
        Self {
            name: String::new(),
            reader: BufReader::new(stream),
        }
    }

    /// Connect and register under `name`, reporting the local binding the
    /// way the real clients do.
    async fn connect(addr: SocketAddr, name: &str) -> Self {
        let mut client = Self::connect_raw(addr).await;
        let local = client.reader.get_ref().local_addr().expect("local addr");
        client
            .send(&format!("{};{}:{}", name, local.ip(), local.port()))
            .await;
        client.name = name.to_string();
        client
    }

    async fn send(&mut self, message: &str) {
        let stream = self.reader.get_mut();
        stream
            .write_all(format!("{}\n", message).as_bytes())
            .await
            .expect("write");
    }

    /// Read one line, failing the test if nothing arrives in time.
    async fn recv(&mut self) -> String {
        let mut line = String::new();
        let n = timeout(Duration::from_secs(2), self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for a line")
            .expect("read line");
        assert!(n > 0, "connection closed while expecting a line");
        line.trim_end().to_string()
    }

    /// Expect silence on this connection for a short window.
    async fn assert_no_line(&mut self) {
        let mut line = String::new();
        let read = timeout(READ_WINDOW, self.reader.read_line(&mut line)).await;
        assert!(read.is_err(), "unexpected data: {:?}", line.trim_end());
    }

    /// Expect the hub to close this connection.
    async fn assert_closed(&mut self) {
        let mut line = String::new();
        let n = timeout(Duration::from_secs(2), self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for close")
            .expect("read at close");
        assert_eq!(n, 0, "expected close, got: {}", line.trim_end());
    }

    /// Round-trip a self-directed message. Confirms this client's
    /// registration completed and routing reaches it.
    async fn sync(&mut self) {
        let name = self.name.clone();
        self.send(&format!("{};sync", name)).await;
        assert_eq!(self.recv().await, "sync");
    }
}

#[tokio::test]
async fn test_directed_message_reaches_target_verbatim() {
    let (addr, _hub) = spawn_hub().await;
    let mut a = TestClient::connect(addr, "Cmd").await;
    a.sync().await;
    let mut b = TestClient::connect(addr, "BM").await;
    b.sync().await;

    a.send("BM;hello").await;
    assert_eq!(b.recv().await, "hello");
    a.assert_no_line().await;
}

#[tokio::test]
async fn test_content_may_contain_separators() {
    let (addr, _hub) = spawn_hub().await;
    let mut a = TestClient::connect(addr, "Cmd").await;
    a.sync().await;
    let mut b = TestClient::connect(addr, "VM").await;
    b.sync().await;

    a.send("VM;ID:3,Cond:2;extra").await;
    assert_eq!(b.recv().await, "ID:3,Cond:2;extra");
}

#[tokio::test]
async fn test_unknown_target_yields_one_error_reply() {
    let (addr, _hub) = spawn_hub().await;
    let mut a = TestClient::connect(addr, "Cmd").await;
    a.sync().await;

    a.send("Ghost;x").await;
    let reply = a.recv().await;
    assert!(reply.starts_with("[error]"), "got: {}", reply);
    assert!(reply.contains("Ghost"));
    a.assert_no_line().await;
}

#[tokio::test]
async fn test_malformed_message_yields_format_error() {
    let (addr, _hub) = spawn_hub().await;
    let mut a = TestClient::connect(addr, "Cmd").await;
    a.sync().await;

    a.send("no separator here").await;
    let reply = a.recv().await;
    assert!(reply.starts_with("[error]"), "got: {}", reply);

    // The connection stays open after an in-session format error.
    a.sync().await;
}

#[tokio::test]
async fn test_overlong_message_is_rejected_not_routed() {
    let config = HubConfig {
        max_message_len: 64,
        ..test_config()
    };
    let (addr, _hub) = spawn_hub_with(config).await;
    let mut a = TestClient::connect(addr, "Cmd").await;
    a.sync().await;
    let mut b = TestClient::connect(addr, "BM").await;
    b.sync().await;

    a.send(&format!("BM;{}", "x".repeat(100))).await;
    let reply = a.recv().await;
    assert!(reply.starts_with("[error]"), "got: {}", reply);
    b.assert_no_line().await;
    a.sync().await;
}

#[tokio::test]
async fn test_malformed_registration_is_rejected_and_closed() {
    let (addr, _hub) = spawn_hub().await;

    let mut no_separators = TestClient::connect_raw(addr).await;
    no_separators.send("garbage").await;
    let reply = no_separators.recv().await;
    assert!(reply.starts_with("[error]"), "got: {}", reply);
    no_separators.assert_closed().await;

    let mut bad_port = TestClient::connect_raw(addr).await;
    bad_port.send("VM;127.0.0.1:notaport").await;
    let reply = bad_port.recv().await;
    assert!(reply.starts_with("[error]"), "got: {}", reply);
    bad_port.assert_closed().await;
}

#[tokio::test]
async fn test_duplicate_name_is_rejected_without_touching_original() {
    let (addr, _hub) = spawn_hub().await;
    let mut original = TestClient::connect(addr, "BM").await;
    original.sync().await;

    let mut imposter = TestClient::connect(addr, "BM").await;
    let reply = imposter.recv().await;
    assert!(reply.starts_with("[rejected]"), "got: {}", reply);
    assert!(reply.contains("BM"));
    imposter.assert_closed().await;

    // The original registration still routes.
    original.sync().await;
}

#[tokio::test]
async fn test_disconnect_frees_the_name_and_stops_routing() {
    let (addr, _hub) = spawn_hub().await;
    let mut leaving = TestClient::connect(addr, "VM").await;
    leaving.sync().await;
    let mut staying = TestClient::connect(addr, "Cmd").await;
    staying.sync().await;

    drop(leaving);
    tokio::time::sleep(Duration::from_millis(300)).await;

    staying.send("VM;anyone there").await;
    let reply = staying.recv().await;
    assert!(reply.starts_with("[error]"), "got: {}", reply);
    assert!(reply.contains("VM"));

    // The name is immediately reusable.
    let mut replacement = TestClient::connect(addr, "VM").await;
    replacement.sync().await;
    staying.send("VM;welcome back").await;
    assert_eq!(replacement.recv().await, "welcome back");
}

#[tokio::test]
async fn test_shutdown_converges_before_timeout_when_all_ack() {
    let (addr, hub) = spawn_hub().await;
    let mut a = TestClient::connect(addr, "Cmd").await;
    a.sync().await;
    let mut b = TestClient::connect(addr, "BM").await;
    b.sync().await;
    let mut c = TestClient::connect(addr, "VM").await;
    c.sync().await;

    let started = std::time::Instant::now();
    a.send("CMD;shutdown").await;

    for client in [&mut a, &mut b, &mut c] {
        assert_eq!(client.recv().await, "EXIT");
        client.send("ACK;EXIT_RECEIVED").await;
    }

    timeout(Duration::from_secs(2), hub)
        .await
        .expect("hub did not halt after all acks")
        .expect("hub task panicked");
    assert!(
        started.elapsed() < Duration::from_millis(1500),
        "halt took {:?}, expected well under the 2s ack timeout",
        started.elapsed()
    );

    for client in [&mut a, &mut b, &mut c] {
        client.assert_closed().await;
    }
}

#[tokio::test]
async fn test_shutdown_halts_at_timeout_when_one_client_stays_silent() {
    let config = HubConfig {
        shutdown_timeout_ms: 500,
        ..test_config()
    };
    let (addr, hub) = spawn_hub_with(config).await;
    let mut acking = TestClient::connect(addr, "Cmd").await;
    acking.sync().await;
    let mut silent = TestClient::connect(addr, "BM").await;
    silent.sync().await;

    let started = std::time::Instant::now();
    acking.send("CMD;shutdown").await;

    assert_eq!(acking.recv().await, "EXIT");
    acking.send("ACK;EXIT_RECEIVED").await;
    assert_eq!(silent.recv().await, "EXIT");
    // `silent` never acknowledges.

    timeout(Duration::from_secs(3), hub)
        .await
        .expect("hub never halted")
        .expect("hub task panicked");
    let elapsed = started.elapsed();
    assert!(
        elapsed >= Duration::from_millis(450),
        "halted after {:?}, before the 500ms grace period",
        elapsed
    );
    assert!(
        elapsed < Duration::from_millis(2000),
        "halted after {:?}, long past the 500ms grace period",
        elapsed
    );
}

#[tokio::test]
async fn test_repeated_shutdown_requests_broadcast_once() {
    let (addr, hub) = spawn_hub().await;
    let mut a = TestClient::connect(addr, "Cmd").await;
    a.sync().await;
    let mut b = TestClient::connect(addr, "BM").await;
    b.sync().await;

    a.send("CMD;shutdown").await;
    b.send("CMD;shutdown").await;

    assert_eq!(a.recv().await, "EXIT");
    assert_eq!(b.recv().await, "EXIT");
    a.send("ACK;EXIT_RECEIVED").await;
    b.send("ACK;EXIT_RECEIVED").await;

    timeout(Duration::from_secs(2), hub)
        .await
        .expect("hub did not halt")
        .expect("hub task panicked");

    // One EXIT each: the next read is the close, not a second signal.
    a.assert_closed().await;
    b.assert_closed().await;
}

#[tokio::test]
async fn test_cancel_token_stops_the_hub_without_broadcast() {
    let config = test_config();
    let hub = Hub::bind(config).await.expect("bind hub");
    let addr = hub.local_addr();
    let cancel = hub.cancel_token();
    let handle = tokio::spawn(async move {
        hub.run().await.expect("hub run failed");
    });

    let mut a = TestClient::connect(addr, "Cmd").await;
    a.sync().await;

    cancel.cancel();
    timeout(Duration::from_secs(2), handle)
        .await
        .expect("hub did not stop on cancellation")
        .expect("hub task panicked");

    // Abrupt stop: the connection just closes, no EXIT broadcast.
    a.assert_closed().await;
}
