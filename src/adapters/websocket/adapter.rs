//! Active WebSocket adapter - one long-lived outbound connection.
//!
//! # Lifecycle
//!
//! ```text
//!            open()
//!   Idle ───────────► Connecting ──connected──► Open ──close()──► Closing ──► Closed
//!    ▲                    │                      │
//!    │   connect failed   │     socket dropped   │
//!    └────────────────────┴──────────────────────┘
//!        (wait reconnect_delay, then Connecting again)
//! ```
//!
//! The socket is owned by a single connection task. Everything else talks to
//! it through an unbounded channel that exists only while the phase is
//! `Open`; `emit` outside that window drops the event.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::{SinkExt, StreamExt};
use serde_json::Value as JsonValue;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::ConnectionConfig;
use crate::domain::connection::{ConnectionPhase, HeartbeatEvent};
use crate::domain::foundation::StateMachine;
use crate::ports::{
    CommandRegistry, ConnectionError, Connector, EventSink, FrameSink, FrameStream, WireFrame,
};

use super::dispatcher::FrameDispatcher;

const DOUBLE_CLOSE: &str = "ActiveWebSocketAdapter::close called on an adapter that is already closed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Dropped,
    Shutdown,
}

#[derive(Default)]
struct ConnectionState {
    /// Set once by `close()`; never reset.
    user_closed: bool,
    outbound: Option<mpsc::UnboundedSender<WireFrame>>,
    task: Option<JoinHandle<()>>,
}

/// Persistent, auto-reconnecting client connection.
///
/// # Example
///
/// ```ignore
/// let adapter = ActiveWebSocketAdapter::new_shared(
///     config.connection.clone(),
///     Arc::new(TungsteniteConnector::new()),
///     Arc::new(commands),
/// );
/// adapter.open();
/// adapter.emit(&json!({"post_type": "notice"}));
/// adapter.close();
/// adapter.closed().await;
/// ```
pub struct ActiveWebSocketAdapter {
    config: ConnectionConfig,
    connector: Arc<dyn Connector>,
    dispatcher: FrameDispatcher,
    online: AtomicBool,
    state: Mutex<ConnectionState>,
    phase: watch::Sender<ConnectionPhase>,
    shutdown: watch::Sender<bool>,
}

impl ActiveWebSocketAdapter {
    pub fn new(
        config: ConnectionConfig,
        connector: Arc<dyn Connector>,
        commands: Arc<dyn CommandRegistry>,
    ) -> Self {
        let (phase, _) = watch::channel(ConnectionPhase::Idle);
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            connector,
            dispatcher: FrameDispatcher::new(commands),
            online: AtomicBool::new(true),
            state: Mutex::new(ConnectionState::default()),
            phase,
            shutdown,
        }
    }

    /// Create as an Arc (`open` needs one to hand to the connection task).
    pub fn new_shared(
        config: ConnectionConfig,
        connector: Arc<dyn Connector>,
        commands: Arc<dyn CommandRegistry>,
    ) -> Arc<Self> {
        Arc::new(Self::new(config, connector, commands))
    }

    /// Starts the connect loop.
    ///
    /// No-op while a loop is already running and after `close()`.
    pub fn open(self: &Arc<Self>) {
        let mut state = self.lock();
        if state.user_closed {
            tracing::debug!(url = %self.config.url, "Ignoring open on closed adapter");
            return;
        }
        if state.task.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }

        self.set_phase(ConnectionPhase::Connecting);
        let shutdown = self.shutdown.subscribe();
        state.task = Some(tokio::spawn(Arc::clone(self).run(shutdown)));
    }

    /// Shuts the adapter down for good.
    ///
    /// Stops the connect loop and the heartbeat, and closes the socket if one
    /// is open. The final `Closed` phase is reached asynchronously; await
    /// `closed()` to observe it.
    ///
    /// # Panics
    ///
    /// Panics if the adapter was already closed.
    pub fn close(&self) {
        let mut state = self.lock();
        if state.user_closed {
            drop(state);
            panic!("{}", DOUBLE_CLOSE);
        }
        state.user_closed = true;
        state.outbound = None;
        let task_running = state.task.as_ref().is_some_and(|task| !task.is_finished());
        drop(state);

        self.shutdown.send_replace(true);
        if !task_running {
            self.set_phase(ConnectionPhase::Closed);
        }
        tracing::info!(url = %self.config.url, "Connection closed by owner");
    }

    /// Writes `event` as one text frame if the connection is open.
    ///
    /// Returns `false` when the event was dropped.
    pub fn emit(&self, event: &JsonValue) -> bool {
        let state = self.lock();
        let Some(outbound) = state.outbound.as_ref().filter(|_| self.phase().is_open()) else {
            tracing::debug!(phase = ?self.phase(), "Dropping outbound event; connection not open");
            return false;
        };

        match serde_json::to_string(event) {
            Ok(text) => outbound.send(WireFrame::Text(text)).is_ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping unserializable outbound event");
                false
            }
        }
    }

    pub fn phase(&self) -> ConnectionPhase {
        *self.phase.borrow()
    }

    /// Receiver that observes every phase change.
    pub fn subscribe_phase(&self) -> watch::Receiver<ConnectionPhase> {
        self.phase.subscribe()
    }

    /// Resolves once the adapter reaches `Closed`.
    pub async fn closed(&self) {
        let mut phase = self.phase.subscribe();
        let _ = phase.wait_for(|phase| *phase == ConnectionPhase::Closed).await;
    }

    pub fn is_user_closed(&self) -> bool {
        self.lock().user_closed
    }

    /// Online flag reported in heartbeats.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }

    fn lock(&self) -> MutexGuard<'_, ConnectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, target: ConnectionPhase) {
        let mut from = None;
        let changed = self.phase.send_if_modified(|phase| {
            from = Some(*phase);
            phase.advance(target)
        });
        if changed {
            tracing::debug!(from = ?from, to = ?target, "Connection phase changed");
        }
    }

    /// Connect loop. Owns the socket for the lifetime of each session.
    async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let delay = self.config.reconnect_delay();
        let mut attempt: u64 = 0;

        while !*shutdown.borrow_and_update() {
            attempt += 1;
            self.set_phase(ConnectionPhase::Connecting);
            tracing::info!(url = %self.config.url, attempt, "Connecting");

            let connected = tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                connected = self.connector.connect(&self.config.url) => connected,
            };

            match connected {
                Ok((sink, stream)) => {
                    if self.run_session(sink, stream, &mut shutdown).await == SessionEnd::Shutdown {
                        break;
                    }
                    attempt = 0;
                    tracing::warn!(
                        url = %self.config.url,
                        delay_ms = delay.as_millis() as u64,
                        "Connection dropped; reconnecting"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        url = %self.config.url,
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Connect attempt failed; retrying"
                    );
                }
            }
            self.set_phase(ConnectionPhase::Idle);

            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }

        self.set_phase(ConnectionPhase::Closed);
        tracing::debug!(url = %self.config.url, "Connection task finished");
    }

    async fn run_session(
        &self,
        mut sink: FrameSink,
        mut stream: FrameStream,
        shutdown: &mut watch::Receiver<bool>,
    ) -> SessionEnd {
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
        let attached = {
            let mut state = self.lock();
            if !state.user_closed {
                state.outbound = Some(outbound_tx);
                self.set_phase(ConnectionPhase::Open);
            }
            !state.user_closed
        };
        if !attached {
            if let Err(e) = sink.close().await {
                tracing::debug!(error = %e, "Close after shutdown failed");
            }
            return SessionEnd::Shutdown;
        }
        tracing::info!(url = %self.config.url, "Connected");

        let period = self.config.heartbeat_interval();
        let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let end = loop {
            tokio::select! {
                biased;

                _ = shutdown.changed() => break SessionEnd::Shutdown,

                inbound = stream.next() => match inbound {
                    Some(Ok(WireFrame::Text(text))) => {
                        self.dispatcher.dispatch(&text);
                    }
                    Some(Ok(WireFrame::Ping(_))) | Some(Ok(WireFrame::Pong(_))) => {}
                    Some(Ok(WireFrame::Close)) | None => break SessionEnd::Dropped,
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Receive failed");
                        break SessionEnd::Dropped;
                    }
                },

                Some(frame) = outbound_rx.recv() => {
                    if let Err(e) = sink.send(frame).await {
                        tracing::warn!(error = %e, "Outbound write failed");
                        break SessionEnd::Dropped;
                    }
                }

                _ = heartbeat.tick() => {
                    if let Err(e) = self.send_heartbeat(&mut sink).await {
                        tracing::warn!(error = %e, "Heartbeat write failed");
                        break SessionEnd::Dropped;
                    }
                }
            }
        };

        self.lock().outbound = None;
        if end == SessionEnd::Shutdown {
            self.set_phase(ConnectionPhase::Closing);
            if let Err(e) = sink.send(WireFrame::Close).await {
                tracing::debug!(error = %e, "Close frame not delivered");
            }
            if let Err(e) = sink.close().await {
                tracing::debug!(error = %e, "Socket close failed");
            }
        }
        end
    }

    async fn send_heartbeat(&self, sink: &mut FrameSink) -> Result<(), ConnectionError> {
        let beat = HeartbeatEvent::new(
            self.config.self_id,
            self.config.heartbeat_interval_ms,
            self.online.load(Ordering::Relaxed),
        );
        let text =
            serde_json::to_string(&beat).map_err(|e| ConnectionError::Send(e.to_string()))?;
        tracing::debug!(self_id = beat.self_id, "Sending heartbeat");
        sink.send(WireFrame::Text(text)).await
    }
}

impl EventSink for ActiveWebSocketAdapter {
    fn emit(&self, event: &JsonValue) -> bool {
        ActiveWebSocketAdapter::emit(self, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::commands::CommandHandlerMap;
    use async_trait::async_trait;
    use std::convert::Infallible;

    /// Connector that always fails.
    struct Refusing;

    #[async_trait]
    impl Connector for Refusing {
        async fn connect(&self, _url: &str) -> Result<(FrameSink, FrameStream), ConnectionError> {
            Err(ConnectionError::Connect("refused".to_string()))
        }
    }

    /// Connector whose sessions never deliver anything.
    struct Silent;

    #[async_trait]
    impl Connector for Silent {
        async fn connect(&self, _url: &str) -> Result<(FrameSink, FrameStream), ConnectionError> {
            let sink = futures::sink::drain::<WireFrame>().sink_map_err(|e: Infallible| match e {});
            Ok((Box::pin(sink), Box::pin(futures::stream::pending::<Result<WireFrame, ConnectionError>>())))
        }
    }

    fn config() -> ConnectionConfig {
        ConnectionConfig {
            url: "ws://127.0.0.1:3001".to_string(),
            reconnect_delay_ms: 1000,
            heartbeat_interval_ms: 30000,
            self_id: 10001,
        }
    }

    fn adapter(connector: Arc<dyn Connector>) -> Arc<ActiveWebSocketAdapter> {
        ActiveWebSocketAdapter::new_shared(config(), connector, Arc::new(CommandHandlerMap::new()))
    }

    #[test]
    fn starts_idle() {
        let adapter = adapter(Arc::new(Refusing));
        assert_eq!(adapter.phase(), ConnectionPhase::Idle);
        assert!(!adapter.is_user_closed());
    }

    #[test]
    fn emit_before_open_is_dropped() {
        let adapter = adapter(Arc::new(Refusing));
        assert!(!adapter.emit(&serde_json::json!({"a": 1})));
    }

    #[tokio::test(start_paused = true)]
    async fn close_from_idle_reaches_closed() {
        let adapter = adapter(Arc::new(Refusing));

        adapter.close();

        assert_eq!(adapter.phase(), ConnectionPhase::Closed);
        assert!(adapter.is_user_closed());
    }

    #[tokio::test(start_paused = true)]
    #[should_panic(expected = "already closed")]
    async fn double_close_panics() {
        let adapter = adapter(Arc::new(Refusing));
        adapter.close();
        adapter.close();
    }

    #[tokio::test(start_paused = true)]
    async fn open_after_close_is_ignored() {
        let adapter = adapter(Arc::new(Refusing));
        adapter.close();

        adapter.open();

        assert_eq!(adapter.phase(), ConnectionPhase::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn open_connects_and_close_shuts_down() {
        let adapter = adapter(Arc::new(Silent));

        adapter.open();
        let mut phase = adapter.subscribe_phase();
        phase
            .wait_for(|phase| *phase == ConnectionPhase::Open)
            .await
            .unwrap();
        assert!(adapter.emit(&serde_json::json!({"a": 1})));

        adapter.close();
        adapter.closed().await;
        assert!(!adapter.emit(&serde_json::json!({"a": 2})));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_attempts_leave_adapter_idle_between_retries() {
        let adapter = adapter(Arc::new(Refusing));

        adapter.open();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert_eq!(adapter.phase(), ConnectionPhase::Idle);

        adapter.close();
        adapter.closed().await;
    }
}
