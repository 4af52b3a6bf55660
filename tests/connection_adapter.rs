//! Integration tests for the persistent connection adapter.
//!
//! A scripted in-memory connector stands in for the network: each successful
//! connect hands the test the server side of the session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::mpsc as fmpsc;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value as JsonValue};
use tokio::sync::mpsc;
use tokio::time::Instant;

use host_bridge::adapters::{ActiveWebSocketAdapter, CommandHandlerMap};
use host_bridge::config::ConnectionConfig;
use host_bridge::domain::connection::ConnectionPhase;
use host_bridge::domain::foundation::{DomainError, ErrorCode};
use host_bridge::ports::{
    CommandHandler, ConnectionError, Connector, EventSink, FrameSink, FrameStream, WireFrame,
};

// =============================================================================
// Scripted connector
// =============================================================================

/// Server side of one scripted session.
struct ServerEnd {
    /// Frames written by the adapter.
    received: fmpsc::UnboundedReceiver<WireFrame>,
    /// Frames delivered to the adapter; dropping it drops the connection.
    deliver: fmpsc::UnboundedSender<Result<WireFrame, ConnectionError>>,
}

impl ServerEnd {
    async fn next_frame(&mut self) -> Option<WireFrame> {
        self.received.next().await
    }

    async fn next_json(&mut self) -> JsonValue {
        match self.next_frame().await {
            Some(WireFrame::Text(text)) => serde_json::from_str(&text).unwrap(),
            other => panic!("expected text frame, got {:?}", other),
        }
    }

    fn send_text(&self, text: &str) {
        self.deliver
            .unbounded_send(Ok(WireFrame::Text(text.to_string())))
            .unwrap();
    }
}

struct ScriptedConnector {
    attempts: Mutex<Vec<Instant>>,
    refuse: AtomicBool,
    /// Connect attempts never resolve while set.
    hold: AtomicBool,
    sessions: mpsc::UnboundedSender<ServerEnd>,
}

impl ScriptedConnector {
    fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ServerEnd>) {
        let (sessions, rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            attempts: Mutex::new(Vec::new()),
            refuse: AtomicBool::new(false),
            hold: AtomicBool::new(false),
            sessions,
        });
        (connector, rx)
    }

    fn refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    fn hold(&self, hold: bool) {
        self.hold.store(hold, Ordering::SeqCst);
    }

    fn attempts(&self) -> Vec<Instant> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _url: &str) -> Result<(FrameSink, FrameStream), ConnectionError> {
        self.attempts.lock().unwrap().push(Instant::now());
        if self.hold.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.refuse.load(Ordering::SeqCst) {
            return Err(ConnectionError::Connect("connection refused".to_string()));
        }

        let (client_tx, received) = fmpsc::unbounded::<WireFrame>();
        let (deliver, client_rx) = fmpsc::unbounded::<Result<WireFrame, ConnectionError>>();
        let _ = self.sessions.send(ServerEnd { received, deliver });

        let sink = client_tx.sink_map_err(|e| ConnectionError::Send(e.to_string()));
        Ok((Box::pin(sink), Box::pin(client_rx)))
    }
}

// =============================================================================
// Command handlers
// =============================================================================

struct Recorder {
    payloads: mpsc::UnboundedSender<JsonValue>,
}

#[async_trait]
impl CommandHandler for Recorder {
    async fn handle(&self, payload: JsonValue) -> Result<JsonValue, DomainError> {
        let _ = self.payloads.send(payload);
        Ok(JsonValue::Null)
    }

    fn action_name(&self) -> &'static str {
        "record"
    }
}

struct Failing;

#[async_trait]
impl CommandHandler for Failing {
    async fn handle(&self, _payload: JsonValue) -> Result<JsonValue, DomainError> {
        Err(DomainError::new(ErrorCode::OperationFailed, "handler exploded"))
    }

    fn action_name(&self) -> &'static str {
        "fail"
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn config(reconnect_delay_ms: u64, heartbeat_interval_ms: u64) -> ConnectionConfig {
    ConnectionConfig {
        url: "ws://127.0.0.1:3001".to_string(),
        reconnect_delay_ms,
        heartbeat_interval_ms,
        self_id: 10001,
    }
}

struct Harness {
    adapter: Arc<ActiveWebSocketAdapter>,
    connector: Arc<ScriptedConnector>,
    sessions: mpsc::UnboundedReceiver<ServerEnd>,
    commands: mpsc::UnboundedReceiver<JsonValue>,
}

fn harness(config: ConnectionConfig) -> Harness {
    let (connector, sessions) = ScriptedConnector::new();
    let (payloads, commands) = mpsc::unbounded_channel();
    let registry = CommandHandlerMap::new()
        .with_handler(Arc::new(Recorder { payloads }))
        .with_handler(Arc::new(Failing));
    let adapter = ActiveWebSocketAdapter::new_shared(config, connector.clone(), Arc::new(registry));
    Harness {
        adapter,
        connector,
        sessions,
        commands,
    }
}

async fn wait_for_phase(adapter: &ActiveWebSocketAdapter, phase: ConnectionPhase) {
    let mut phases = adapter.subscribe_phase();
    phases.wait_for(|current| *current == phase).await.unwrap();
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn open_connects_and_delivers_emitted_events() {
    let mut h = harness(config(1000, 30_000));

    h.adapter.open();
    let mut server = h.sessions.recv().await.unwrap();
    wait_for_phase(&h.adapter, ConnectionPhase::Open).await;

    assert!(h.adapter.emit(&json!({"post_type": "notice", "id": 1})));
    assert!(EventSink::emit(h.adapter.as_ref(), &json!({"id": 2})));

    assert_eq!(server.next_json().await, json!({"post_type": "notice", "id": 1}));
    assert_eq!(server.next_json().await["id"], 2);
    assert_eq!(h.connector.attempts().len(), 1);

    h.adapter.close();
    h.adapter.closed().await;
}

#[tokio::test(start_paused = true)]
async fn open_twice_does_not_start_second_loop() {
    let mut h = harness(config(1000, 30_000));

    h.adapter.open();
    h.adapter.open();
    let _server = h.sessions.recv().await.unwrap();
    wait_for_phase(&h.adapter, ConnectionPhase::Open).await;
    h.adapter.open();

    tokio::time::sleep(Duration::from_millis(5000)).await;
    assert_eq!(h.connector.attempts().len(), 1);

    h.adapter.close();
    h.adapter.closed().await;
}

#[tokio::test(start_paused = true)]
async fn dropped_connection_retries_at_fixed_delay_until_closed() {
    let mut h = harness(config(1000, 30_000));

    h.adapter.open();
    let server = h.sessions.recv().await.unwrap();
    wait_for_phase(&h.adapter, ConnectionPhase::Open).await;

    // Socket drops; every following attempt is refused.
    h.connector.refuse(true);
    drop(server);
    wait_for_phase(&h.adapter, ConnectionPhase::Idle).await;
    assert!(!h.adapter.emit(&json!({"dropped": true})));

    tokio::time::sleep(Duration::from_millis(3500)).await;

    let attempts = h.connector.attempts();
    assert_eq!(attempts.len(), 4);
    for pair in attempts.windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::from_millis(1000));
    }

    h.adapter.close();
    h.adapter.closed().await;
    let after_close = h.connector.attempts().len();

    tokio::time::sleep(Duration::from_millis(10 * 1000)).await;
    assert_eq!(h.connector.attempts().len(), after_close);
    assert_eq!(h.adapter.phase(), ConnectionPhase::Closed);
}

#[tokio::test(start_paused = true)]
async fn reconnects_after_drop_and_serves_new_session() {
    let mut h = harness(config(1000, 30_000));

    h.adapter.open();
    let first = h.sessions.recv().await.unwrap();
    wait_for_phase(&h.adapter, ConnectionPhase::Open).await;
    let dropped_at = Instant::now();
    drop(first);

    let mut second = h.sessions.recv().await.unwrap();
    assert_eq!(Instant::now() - dropped_at, Duration::from_millis(1000));
    wait_for_phase(&h.adapter, ConnectionPhase::Open).await;

    assert!(h.adapter.emit(&json!({"session": 2})));
    assert_eq!(second.next_json().await["session"], 2);

    h.adapter.close();
    h.adapter.closed().await;
}

#[tokio::test(start_paused = true)]
async fn heartbeat_runs_while_open_and_stops_on_close() {
    let mut h = harness(config(1000, 1000));
    h.adapter.set_online(false);

    h.adapter.open();
    let mut server = h.sessions.recv().await.unwrap();
    wait_for_phase(&h.adapter, ConnectionPhase::Open).await;
    let opened_at = Instant::now();

    for beat in 1..=3u64 {
        let frame = server.next_json().await;
        assert_eq!(Instant::now() - opened_at, Duration::from_millis(1000 * beat));
        assert_eq!(frame["post_type"], "meta_event");
        assert_eq!(frame["meta_event_type"], "heartbeat");
        assert_eq!(frame["self_id"], 10001);
        assert_eq!(frame["interval"], 1000);
        assert_eq!(frame["status"], json!({"online": false, "good": true}));
    }

    h.adapter.close();
    h.adapter.closed().await;

    // Only the close frame follows, then the adapter's sink is gone.
    assert_eq!(server.next_frame().await, Some(WireFrame::Close));
    tokio::time::sleep(Duration::from_millis(5000)).await;
    assert_eq!(server.next_frame().await, None);
}

#[tokio::test(start_paused = true)]
async fn malformed_and_unknown_frames_keep_connection_open() {
    let mut h = harness(config(1000, 30_000));

    h.adapter.open();
    let server = h.sessions.recv().await.unwrap();
    wait_for_phase(&h.adapter, ConnectionPhase::Open).await;

    server.send_text("{not json");
    server.send_text(r#"{"actionName":"missing","payload":1}"#);
    server.send_text(r#"{"actionName":"record","payload":{"n":1}}"#);

    assert_eq!(h.commands.recv().await.unwrap(), json!({"n": 1}));
    assert_eq!(h.adapter.phase(), ConnectionPhase::Open);
    assert_eq!(h.connector.attempts().len(), 1);

    h.adapter.close();
    h.adapter.closed().await;
}

#[tokio::test(start_paused = true)]
async fn failing_handler_does_not_block_later_frames() {
    let mut h = harness(config(1000, 30_000));

    h.adapter.open();
    let server = h.sessions.recv().await.unwrap();
    wait_for_phase(&h.adapter, ConnectionPhase::Open).await;

    server.send_text(r#"{"actionName":"fail"}"#);
    server.send_text(r#"{"actionName":"record","payload":"after"}"#);

    assert_eq!(h.commands.recv().await.unwrap(), json!("after"));
    assert_eq!(h.adapter.phase(), ConnectionPhase::Open);

    h.adapter.close();
    h.adapter.closed().await;
}

#[tokio::test(start_paused = true)]
async fn emit_while_not_open_is_silently_dropped() {
    let mut h = harness(config(1000, 30_000));
    h.connector.refuse(true);

    assert!(!h.adapter.emit(&json!({"before": "open"})));

    h.adapter.open();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(h.adapter.phase(), ConnectionPhase::Idle);
    assert!(!h.adapter.emit(&json!({"while": "retrying"})));

    h.adapter.close();
    h.adapter.closed().await;
    assert!(!h.adapter.emit(&json!({"after": "close"})));
    assert!(h.sessions.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn close_succeeds_from_each_live_phase() {
    // Idle, never opened.
    let h = harness(config(1000, 30_000));
    h.adapter.close();
    assert_eq!(h.adapter.phase(), ConnectionPhase::Closed);

    // Idle between retries.
    let h = harness(config(1000, 30_000));
    h.connector.refuse(true);
    h.adapter.open();
    tokio::time::sleep(Duration::from_millis(10)).await;
    h.adapter.close();
    h.adapter.closed().await;

    // Open.
    let mut h = harness(config(1000, 30_000));
    h.adapter.open();
    let _server = h.sessions.recv().await.unwrap();
    wait_for_phase(&h.adapter, ConnectionPhase::Open).await;
    h.adapter.close();
    h.adapter.closed().await;
    assert!(h.adapter.is_user_closed());
}

#[tokio::test(start_paused = true)]
async fn close_during_pending_connect_abandons_attempt() {
    let mut h = harness(config(1000, 30_000));
    h.connector.hold(true);
    h.adapter.open();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(h.adapter.phase(), ConnectionPhase::Connecting);
    assert_eq!(h.connector.attempts().len(), 1);

    h.adapter.close();
    h.adapter.closed().await;
    assert_eq!(h.adapter.phase(), ConnectionPhase::Closed);

    h.connector.hold(false);
    tokio::time::sleep(Duration::from_millis(10_000)).await;
    assert_eq!(h.connector.attempts().len(), 1);
    assert!(h.sessions.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
#[should_panic(expected = "already closed")]
async fn second_close_panics() {
    let mut h = harness(config(1000, 30_000));
    h.adapter.open();
    let _server = h.sessions.recv().await.unwrap();
    wait_for_phase(&h.adapter, ConnectionPhase::Open).await;

    h.adapter.close();
    h.adapter.close();
}
