//! The channel session manager — the connection lifecycle state machine.
//!
//! One manager owns at most one chat-client handle for the whole process
//! lifetime, re-using it across reconfiguration. Client events arrive on the
//! client's own I/O task; a pump task drains them, applies the manager's
//! state transition first, then forwards the event to subscribers on a
//! broadcast channel. Host modules therefore never observe an event before
//! the flags it implies are in place.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::client::{ChatClient, ClientOptions, ConnectionCredentials};
use crate::config::{ConfigProvider, SessionConfig};
use crate::event::ChatEvent;
use crate::notify::NotificationSink;

/// Announcement sent into the channel once it has been joined.
pub const READY_MESSAGE: &str = "! TootTally Twitch Integration ready!";

const NOTIF_SUCCESS: &str = "Twitch Integration successful!";
const ERR_CHANNEL_UNSET: &str = "Twitch Username is empty. Please fill it in.";
const ERR_TOKEN_UNSET: &str = "Twitch Access Token is empty. Please fill it in.";
const ERR_BAD_LOGIN: &str = "Login credentials incorrect. Please re-authorize or refresh \
     your access token, and re-check your Twitch username.";

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The three authoritative session flags. Each is mutated only by the event
/// pump and by the explicit `initialize`/`disconnect` resets.
#[derive(Default)]
struct SessionFlags {
    connection_pending: AtomicBool,
    authenticated: AtomicBool,
    joined_channel: AtomicBool,
}

impl SessionFlags {
    fn reset(&self) {
        self.connection_pending.store(false, Ordering::Release);
        self.authenticated.store(false, Ordering::Release);
        self.joined_channel.store(false, Ordering::Release);
    }
}

/// State shared between the manager and its event pump task.
struct SessionShared<C: ChatClient> {
    /// The single client handle, created lazily and kept for the process
    /// lifetime (released only by `stop`).
    client: Mutex<Option<C>>,
    flags: SessionFlags,
    /// Channel name confirmed by the last `JoinedChannel` event.
    joined_channel: Mutex<String>,
    /// Messages queued while a connect is in flight; flushed on join,
    /// cleared entirely on every disconnect.
    outbound: Mutex<Vec<String>>,
    forward_tx: broadcast::Sender<ChatEvent>,
    notifier: Arc<dyn NotificationSink>,
}

/// Maintains at most one outbound chat session to a single configured
/// channel and fans client events out to subscribers.
///
/// `initialize` is safe to call repeatedly (every time the user opens
/// settings or edits credentials): the client handle is created once,
/// changed credentials are applied in place, and an unchanged config goes
/// straight to connect.
pub struct ChannelSessionManager<C: ChatClient> {
    shared: Arc<SessionShared<C>>,
    config: Arc<dyn ConfigProvider>,
    options: ClientOptions,
    build_client: Box<dyn Fn(&ClientOptions) -> C + Send + Sync>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl<C: ChatClient> ChannelSessionManager<C> {
    /// Create a manager. `build_client` constructs the wrapped client with
    /// the given policies; it runs at most once, on the first valid
    /// `initialize` call.
    pub fn new(
        options: ClientOptions,
        build_client: impl Fn(&ClientOptions) -> C + Send + Sync + 'static,
        config: Arc<dyn ConfigProvider>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let (forward_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(SessionShared {
                client: Mutex::new(None),
                flags: SessionFlags::default(),
                joined_channel: Mutex::new(String::new()),
                outbound: Mutex::new(Vec::new()),
                forward_tx,
                notifier,
            }),
            config,
            options,
            build_client: Box::new(build_client),
            pump: Mutex::new(None),
        }
    }

    /// Subscribe to every client event, in arrival order. The manager's own
    /// state transition for an event completes before it is forwarded.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.shared.forward_tx.subscribe()
    }

    /// Whether the underlying transport reports connected.
    pub fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }

    /// Authenticated, joined and the transport is up.
    pub fn is_ready(&self) -> bool {
        self.shared.flags.authenticated.load(Ordering::Acquire)
            && self.shared.flags.joined_channel.load(Ordering::Acquire)
            && self.is_connected()
    }

    /// A connect request is in flight with no terminal event yet.
    pub fn is_connection_pending(&self) -> bool {
        self.shared.flags.connection_pending.load(Ordering::Acquire)
    }

    /// Whether the target channel has been joined this session.
    pub fn has_joined_channel(&self) -> bool {
        self.shared.flags.joined_channel.load(Ordering::Acquire)
    }

    /// Channel name confirmed by the last join, if any.
    pub fn joined_channel(&self) -> Option<String> {
        let name = self.shared.joined_channel.lock().clone();
        if name.is_empty() { None } else { Some(name) }
    }

    /// Idempotent lazy construction of the client handle. Builds the client
    /// with the fixed throttling and reconnect policies, takes its event
    /// stream and spawns the pump task. Allocates the transport resource but
    /// does not open a connection.
    ///
    /// Must be called from within a tokio runtime.
    pub fn ensure_client_created(&self) {
        let mut guard = self.shared.client.lock();
        if guard.is_some() {
            return;
        }
        let mut client = (self.build_client)(&self.options);
        let events = client.take_events();
        *guard = Some(client);
        drop(guard);

        if let Some(rx) = events {
            let shared = Arc::clone(&self.shared);
            *self.pump.lock() = Some(tokio::spawn(pump(shared, rx)));
        }
        tracing::debug!("client setup done");
    }

    /// Primary entry point, callable repeatedly.
    ///
    /// Resets the session flags, snapshots the config and validates it (an
    /// invalid config notifies the user and returns without touching the
    /// client), then initializes or re-credentials the handle as needed and
    /// issues a connect request. Completion is signaled asynchronously via
    /// `Connected`, `IncorrectLogin` or `Disconnected` events — callers must
    /// not assume `is_ready` immediately after this returns.
    pub fn initialize(&self) {
        self.shared.flags.reset();

        let snapshot = self.config.snapshot();
        if !self.validate(&snapshot) {
            return;
        }

        self.ensure_client_created();

        let credentials = ConnectionCredentials {
            channel_name: snapshot.channel_name.clone(),
            access_token: snapshot.access_token,
        };

        let mut guard = self.shared.client.lock();
        let Some(client) = guard.as_mut() else {
            return;
        };
        match client.credentials() {
            None => {
                client.initialize(credentials, &snapshot.channel_name);
                tracing::debug!("client is being initialized");
            }
            Some(current) if current != credentials => {
                client.set_credentials(credentials);
                tracing::debug!("credentials updated on existing client");
            }
            Some(_) => {}
        }

        self.shared
            .flags
            .connection_pending
            .store(true, Ordering::Release);
        tracing::debug!("client is trying to connect");
        if let Err(e) = client.connect() {
            self.shared
                .flags
                .connection_pending
                .store(false, Ordering::Release);
            tracing::error!(error = %e, "connect request failed");
        }
    }

    /// Disconnect the transport if connected, clear the outbound queue and
    /// reset the pending/authenticated flags. Safe to call when already
    /// disconnected or before any client exists.
    pub fn disconnect(&self) {
        self.shared.disconnect();
    }

    /// Send `text` to the joined channel. No-op when no session is up;
    /// while a connect is in flight the message is queued and flushed on
    /// join.
    pub fn send_channel_message(&self, text: &str) {
        self.shared.send_channel_message(text);
    }

    /// Host lifecycle entry point; equivalent to [`Self::initialize`].
    pub fn start(&self) {
        self.initialize();
    }

    /// Host lifecycle teardown: disconnects, stops the event pump and
    /// releases the client handle.
    pub fn stop(&self) {
        self.shared.disconnect();
        if let Some(task) = self.pump.lock().take() {
            task.abort();
        }
        self.shared.client.lock().take();
        self.shared.joined_channel.lock().clear();
        self.shared.flags.reset();
    }

    /// Channel name checked before token; the first invalid field produces
    /// one user-facing error and aborts the attempt.
    fn validate(&self, config: &SessionConfig) -> bool {
        if !config.channel_name_is_set() {
            self.shared.notifier.display_error(ERR_CHANNEL_UNSET);
            return false;
        }
        if !config.access_token_is_set() {
            self.shared.notifier.display_error(ERR_TOKEN_UNSET);
            return false;
        }
        tracing::debug!("twitch config is filled in");
        true
    }
}

impl<C: ChatClient> SessionShared<C> {
    fn is_connected(&self) -> bool {
        self.client.lock().as_ref().is_some_and(|c| c.is_connected())
    }

    fn disconnect(&self) {
        let mut guard = self.client.lock();
        if let Some(client) = guard.as_mut()
            && client.is_connected()
        {
            client.disconnect();
        }
        drop(guard);
        self.outbound.lock().clear();
        self.flags.connection_pending.store(false, Ordering::Release);
        self.flags.authenticated.store(false, Ordering::Release);
    }

    fn send_channel_message(&self, text: &str) {
        let mut guard = self.client.lock();
        let Some(client) = guard.as_mut() else {
            return;
        };
        if !client.is_connected() || !self.flags.joined_channel.load(Ordering::Acquire) {
            if self.flags.connection_pending.load(Ordering::Acquire) || client.is_connected() {
                self.outbound.lock().push(text.to_string());
            }
            return;
        }
        let channel = self.joined_channel.lock().clone();
        if let Err(e) = client.send_message(&channel, text) {
            tracing::error!(error = %e, "channel message send failed");
        }
    }

    /// State transition and side effects for one client event. Runs to
    /// completion before the event is forwarded to subscribers.
    fn apply(&self, event: &ChatEvent) {
        match event {
            ChatEvent::Log {
                timestamp,
                bot_username,
                line,
            } => {
                tracing::debug!("{timestamp}: {bot_username} - {line}");
            }
            ChatEvent::Connected { bot_username, .. } => {
                self.flags.connection_pending.store(false, Ordering::Release);
                tracing::info!("connected as {bot_username}");
            }
            ChatEvent::Authenticated { .. } => {
                self.flags.authenticated.store(true, Ordering::Release);
            }
            ChatEvent::JoinedChannel { channel } => {
                self.flags.joined_channel.store(true, Ordering::Release);
                *self.joined_channel.lock() = channel.clone();
                let queued: Vec<String> = std::mem::take(&mut *self.outbound.lock());
                {
                    let mut guard = self.client.lock();
                    if let Some(client) = guard.as_mut() {
                        if let Err(e) = client.send_message(channel, READY_MESSAGE) {
                            tracing::error!(error = %e, "readiness announcement failed");
                        }
                        for text in queued {
                            if let Err(e) = client.send_message(channel, &text) {
                                tracing::error!(error = %e, "queued message send failed");
                            }
                        }
                    }
                }
                self.notifier.display_notif(NOTIF_SUCCESS);
                tracing::info!(channel = %channel, "twitch integration attached to chat");
            }
            ChatEvent::ChatCommandReceived { .. } => {}
            ChatEvent::IncorrectLogin { reason } => {
                tracing::warn!(reason = %reason, "login rejected");
                self.notifier.display_error(ERR_BAD_LOGIN);
                self.disconnect();
            }
            ChatEvent::Error { detail } => {
                tracing::error!("{detail}");
            }
            ChatEvent::Disconnected { reason } => {
                self.flags.reset();
                self.joined_channel.lock().clear();
                tracing::info!(reason = %reason, "disconnected from twitch");
            }
        }
    }
}

/// Drains the client's event stream for the lifetime of the handle.
async fn pump<C: ChatClient>(shared: Arc<SessionShared<C>>, mut events: mpsc::Receiver<ChatEvent>) {
    while let Some(event) = events.recv().await {
        shared.apply(&event);
        // Subscribers only see the event after the transition above; a lost
        // send just means nobody is subscribed right now.
        let _ = shared.forward_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::time::Duration;

    use parking_lot::Mutex;
    use tokio::sync::{broadcast, mpsc};

    use super::*;
    use crate::config::{SENTINEL_ACCESS_TOKEN, SENTINEL_CHANNEL_NAME};
    use crate::event::ChatCommand;

    #[derive(Default)]
    struct FakeState {
        built: AtomicU32,
        initialized: AtomicU32,
        credential_updates: AtomicU32,
        connect_calls: AtomicU32,
        connected: AtomicBool,
        credentials: Mutex<Option<ConnectionCredentials>>,
        sent: Mutex<Vec<(String, String)>>,
    }

    struct FakeClient {
        state: Arc<FakeState>,
        events: Option<mpsc::Receiver<ChatEvent>>,
    }

    impl ChatClient for FakeClient {
        fn initialize(&mut self, credentials: ConnectionCredentials, _auto_join_channel: &str) {
            self.state.initialized.fetch_add(1, Ordering::SeqCst);
            *self.state.credentials.lock() = Some(credentials);
        }

        fn set_credentials(&mut self, credentials: ConnectionCredentials) {
            self.state.credential_updates.fetch_add(1, Ordering::SeqCst);
            *self.state.credentials.lock() = Some(credentials);
        }

        fn credentials(&self) -> Option<ConnectionCredentials> {
            self.state.credentials.lock().clone()
        }

        fn connect(&mut self) -> anyhow::Result<()> {
            self.state.connect_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn disconnect(&mut self) {
            self.state.connected.store(false, Ordering::SeqCst);
        }

        fn is_connected(&self) -> bool {
            self.state.connected.load(Ordering::SeqCst)
        }

        fn send_message(&mut self, channel: &str, text: &str) -> anyhow::Result<()> {
            self.state
                .sent
                .lock()
                .push((channel.to_string(), text.to_string()));
            Ok(())
        }

        fn take_events(&mut self) -> Option<mpsc::Receiver<ChatEvent>> {
            self.events.take()
        }
    }

    struct TestConfig {
        channel_name: Mutex<String>,
        access_token: Mutex<String>,
    }

    impl TestConfig {
        fn new(channel: &str, token: &str) -> Arc<Self> {
            Arc::new(Self {
                channel_name: Mutex::new(channel.to_string()),
                access_token: Mutex::new(token.to_string()),
            })
        }
    }

    impl ConfigProvider for TestConfig {
        fn channel_name(&self) -> String {
            self.channel_name.lock().clone()
        }

        fn access_token(&self) -> String {
            self.access_token.lock().clone()
        }

        fn set_channel_name(&self, name: &str, _persist: bool) {
            *self.channel_name.lock() = name.to_string();
        }

        fn set_access_token(&self, token: &str, _persist: bool) {
            *self.access_token.lock() = token.to_string();
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        errors: Mutex<Vec<String>>,
        notifs: Mutex<Vec<String>>,
    }

    impl NotificationSink for RecordingNotifier {
        fn display_error(&self, message: &str) {
            self.errors.lock().push(message.to_string());
        }

        fn display_notif(&self, message: &str) {
            self.notifs.lock().push(message.to_string());
        }
    }

    struct Harness {
        manager: ChannelSessionManager<FakeClient>,
        state: Arc<FakeState>,
        inject: mpsc::Sender<ChatEvent>,
        config: Arc<TestConfig>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness(channel: &str, token: &str) -> Harness {
        let state = Arc::new(FakeState::default());
        let (inject, events) = mpsc::channel(64);
        let events = Mutex::new(Some(events));
        let config = TestConfig::new(channel, token);
        let notifier = Arc::new(RecordingNotifier::default());

        let build_state = Arc::clone(&state);
        let manager = ChannelSessionManager::new(
            ClientOptions::default(),
            move |_options: &ClientOptions| {
                build_state.built.fetch_add(1, Ordering::SeqCst);
                FakeClient {
                    state: Arc::clone(&build_state),
                    events: events.lock().take(),
                }
            },
            Arc::clone(&config) as Arc<dyn ConfigProvider>,
            Arc::clone(&notifier) as Arc<dyn NotificationSink>,
        );

        Harness {
            manager,
            state,
            inject,
            config,
            notifier,
        }
    }

    /// Inject a client event and wait until the manager has applied and
    /// forwarded it. Forwarding happens after the state transition, so once
    /// the subscriber sees the event the flags are settled.
    async fn drive(h: &Harness, rx: &mut broadcast::Receiver<ChatEvent>, event: ChatEvent) {
        h.inject.send(event).await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("event was not forwarded")
            .unwrap();
    }

    fn connected_event() -> ChatEvent {
        ChatEvent::Connected {
            bot_username: "viewerbot".to_string(),
            auto_join_channel: "viewerbot".to_string(),
        }
    }

    #[test]
    fn sentinel_channel_name_aborts_without_touching_client() {
        let h = harness(SENTINEL_CHANNEL_NAME, "oauth:abc");
        h.manager.initialize();

        assert_eq!(h.state.built.load(Ordering::SeqCst), 0);
        assert_eq!(h.state.connect_calls.load(Ordering::SeqCst), 0);
        let errors = h.notifier.errors.lock();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Username"));
    }

    #[test]
    fn missing_token_aborts_with_one_error() {
        let h = harness("viewerbot", SENTINEL_ACCESS_TOKEN);
        h.manager.initialize();

        assert_eq!(h.state.built.load(Ordering::SeqCst), 0);
        let errors = h.notifier.errors.lock();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Access Token"));
    }

    #[test]
    fn both_fields_invalid_reports_channel_name_first() {
        let h = harness("", "");
        h.manager.initialize();

        let errors = h.notifier.errors.lock();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Username"));
    }

    #[tokio::test]
    async fn reinitialize_with_unchanged_config_reuses_client() {
        let h = harness("viewerbot", "oauth:abc");
        h.manager.initialize();
        h.manager.initialize();

        assert_eq!(h.state.built.load(Ordering::SeqCst), 1);
        assert_eq!(h.state.initialized.load(Ordering::SeqCst), 1);
        assert_eq!(h.state.credential_updates.load(Ordering::SeqCst), 0);
        assert_eq!(h.state.connect_calls.load(Ordering::SeqCst), 2);
        assert!(h.manager.is_connection_pending());
    }

    #[tokio::test]
    async fn changed_token_updates_credentials_in_place() {
        let h = harness("viewerbot", "oauth:abc");
        h.manager.initialize();

        h.config.set_access_token("oauth:rotated", false);
        h.manager.initialize();

        assert_eq!(h.state.built.load(Ordering::SeqCst), 1);
        assert_eq!(h.state.initialized.load(Ordering::SeqCst), 1);
        assert_eq!(h.state.credential_updates.load(Ordering::SeqCst), 1);
        let creds = h.state.credentials.lock().clone().unwrap();
        assert_eq!(creds.access_token, "oauth:rotated");
    }

    #[tokio::test]
    async fn incorrect_login_resets_session_and_clears_queue() {
        let h = harness("viewerbot", "oauth:abc");
        let mut rx = h.manager.subscribe();
        h.manager.initialize();

        // Queued while the connect is pending; must vanish on login failure.
        h.manager.send_channel_message("hello");

        h.state.connected.store(true, Ordering::SeqCst);
        drive(&h, &mut rx, connected_event()).await;
        drive(
            &h,
            &mut rx,
            ChatEvent::IncorrectLogin {
                reason: "login authentication failed".to_string(),
            },
        )
        .await;

        assert!(!h.manager.is_connection_pending());
        assert!(!h.manager.is_ready());
        assert_eq!(h.notifier.errors.lock().len(), 1);
        assert!(h.notifier.errors.lock()[0].contains("credentials incorrect"));

        // A later successful join flushes nothing: the queue was cleared.
        h.state.connected.store(true, Ordering::SeqCst);
        drive(
            &h,
            &mut rx,
            ChatEvent::JoinedChannel {
                channel: "viewerbot".to_string(),
            },
        )
        .await;
        let sent = h.state.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, READY_MESSAGE);
    }

    #[tokio::test]
    async fn disconnected_event_resets_all_flags() {
        let h = harness("viewerbot", "oauth:abc");
        let mut rx = h.manager.subscribe();
        h.manager.initialize();
        h.state.connected.store(true, Ordering::SeqCst);

        drive(&h, &mut rx, connected_event()).await;
        drive(
            &h,
            &mut rx,
            ChatEvent::Authenticated {
                username: "viewerbot".to_string(),
            },
        )
        .await;
        drive(
            &h,
            &mut rx,
            ChatEvent::JoinedChannel {
                channel: "viewerbot".to_string(),
            },
        )
        .await;
        assert!(h.manager.is_ready());

        h.state.connected.store(false, Ordering::SeqCst);
        drive(
            &h,
            &mut rx,
            ChatEvent::Disconnected {
                reason: "EOF".to_string(),
            },
        )
        .await;

        assert!(!h.manager.is_connection_pending());
        assert!(!h.manager.has_joined_channel());
        assert!(!h.manager.is_ready());
        assert_eq!(h.manager.joined_channel(), None);
    }

    #[tokio::test]
    async fn readiness_requires_all_three_flags_and_transport() {
        let h = harness("viewerbot", "oauth:abc");
        let mut rx = h.manager.subscribe();
        h.manager.initialize();
        h.state.connected.store(true, Ordering::SeqCst);

        drive(&h, &mut rx, connected_event()).await;
        assert!(!h.manager.is_ready());
        drive(
            &h,
            &mut rx,
            ChatEvent::Authenticated {
                username: "viewerbot".to_string(),
            },
        )
        .await;
        assert!(!h.manager.is_ready());
        drive(
            &h,
            &mut rx,
            ChatEvent::JoinedChannel {
                channel: "viewerbot".to_string(),
            },
        )
        .await;
        assert!(h.manager.is_ready());

        // Transport dropping out alone defeats readiness, flags aside.
        h.state.connected.store(false, Ordering::SeqCst);
        assert!(!h.manager.is_ready());
    }

    #[tokio::test]
    async fn join_announces_readiness_exactly_once() {
        let h = harness("viewerbot", "oauth:abc");
        let mut rx = h.manager.subscribe();
        h.manager.initialize();
        h.state.connected.store(true, Ordering::SeqCst);

        drive(&h, &mut rx, connected_event()).await;
        drive(
            &h,
            &mut rx,
            ChatEvent::JoinedChannel {
                channel: "viewerbot".to_string(),
            },
        )
        .await;

        let sent = h.state.sent.lock();
        assert_eq!(
            *sent,
            vec![("viewerbot".to_string(), READY_MESSAGE.to_string())]
        );
        let notifs = h.notifier.notifs.lock();
        assert_eq!(*notifs, vec![NOTIF_SUCCESS.to_string()]);
        assert_eq!(h.manager.joined_channel().as_deref(), Some("viewerbot"));
    }

    #[tokio::test]
    async fn chat_commands_are_forwarded_untouched() {
        let h = harness("viewerbot", "oauth:abc");
        let mut rx = h.manager.subscribe();
        h.manager.initialize();

        let command = ChatCommand {
            command: "req".to_string(),
            args: vec!["some-song".to_string()],
            channel: "viewerbot".to_string(),
            sender: "viewer42".to_string(),
        };
        h.inject
            .send(ChatEvent::ChatCommandReceived {
                command: command.clone(),
            })
            .await
            .unwrap();

        let forwarded = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match forwarded {
            ChatEvent::ChatCommandReceived { command: got } => assert_eq!(got, command),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn queued_messages_flush_after_join() {
        let h = harness("viewerbot", "oauth:abc");
        let mut rx = h.manager.subscribe();
        h.manager.initialize();
        h.manager.send_channel_message("queued while pending");

        h.state.connected.store(true, Ordering::SeqCst);
        drive(&h, &mut rx, connected_event()).await;
        drive(
            &h,
            &mut rx,
            ChatEvent::JoinedChannel {
                channel: "viewerbot".to_string(),
            },
        )
        .await;

        let sent = h.state.sent.lock();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1, READY_MESSAGE);
        assert_eq!(sent[1].1, "queued while pending");
    }

    #[tokio::test]
    async fn send_is_a_noop_without_a_session() {
        let h = harness("viewerbot", "oauth:abc");
        h.manager.send_channel_message("dropped");
        assert!(h.state.sent.lock().is_empty());
    }

    #[test]
    fn disconnect_before_any_connect_is_safe() {
        let h = harness("viewerbot", "oauth:abc");
        h.manager.disconnect();

        assert!(!h.manager.is_connection_pending());
        assert!(!h.manager.has_joined_channel());
        assert!(!h.manager.is_ready());
    }

    #[tokio::test]
    async fn stop_releases_the_client_handle() {
        let h = harness("viewerbot", "oauth:abc");
        h.manager.initialize();
        h.state.connected.store(true, Ordering::SeqCst);

        h.manager.stop();
        assert!(!h.manager.is_connected());
        assert!(!h.manager.is_ready());

        // A later initialize builds a fresh handle.
        h.manager.initialize();
        assert_eq!(h.state.built.load(Ordering::SeqCst), 2);
    }
}
