//! The seam to the wrapped chat-client library.
//!
//! The session manager never speaks the IRC wire protocol; it drives a
//! [`ChatClient`] implementation supplied by the host. The contract mirrors
//! what the wrapped library exposes: non-blocking `connect`, credential
//! updates without discarding the handle, and an event stream delivered on
//! a tokio mpsc channel from the client's own I/O task.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::event::ChatEvent;

/// Channel login credentials handed to the client.
///
/// Equality drives the session manager's re-initialization logic: an
/// unchanged pair skips straight to connect, a changed pair is applied to
/// the existing handle via [`ChatClient::set_credentials`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionCredentials {
    /// Twitch channel (and bot login) name.
    pub channel_name: String,
    /// OAuth access token (`oauth:...`).
    pub access_token: String,
}

/// Fixed policies the client is constructed with.
///
/// Throttling and reconnection are properties of the wrapped transport,
/// configured here but not reimplemented by the session manager.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Outbound messages allowed per rolling throttling period.
    pub messages_allowed_in_period: u32,
    /// Rolling window for the rate limit.
    pub throttling_period: Duration,
    /// Fixed delay between automatic transport reconnect attempts.
    pub reconnect_interval: Duration,
    /// Cap on automatic reconnect attempts before the client gives up
    /// and emits `Disconnected`.
    pub max_reconnect_attempts: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            messages_allowed_in_period: 750,
            throttling_period: Duration::from_secs(30),
            reconnect_interval: Duration::from_secs(5),
            max_reconnect_attempts: 3,
        }
    }
}

/// Boundary trait for the wrapped chat-client library.
///
/// All calls are non-blocking: `connect` issues a request whose outcome is
/// signaled asynchronously through the event channel (`Connected`,
/// `IncorrectLogin` or `Disconnected`), never through a return value.
pub trait ChatClient: Send + 'static {
    /// One-time library initialization with credentials and the channel to
    /// auto-join after login. Called at most once per handle.
    fn initialize(&mut self, credentials: ConnectionCredentials, auto_join_channel: &str);

    /// Apply new credentials to an already-initialized handle without
    /// discarding it.
    fn set_credentials(&mut self, credentials: ConnectionCredentials);

    /// Credentials currently held by the handle, `None` before the first
    /// [`ChatClient::initialize`].
    fn credentials(&self) -> Option<ConnectionCredentials>;

    /// Issue a connect request. Completion arrives as an event.
    fn connect(&mut self) -> Result<()>;

    /// Ask the transport to close. Best-effort; a connect attempt already in
    /// flight may still deliver its callback.
    fn disconnect(&mut self);

    /// Whether the transport currently reports connected.
    fn is_connected(&self) -> bool;

    /// Send a message to a channel. Subject to the client's throttling
    /// policy.
    fn send_message(&mut self, channel: &str, text: &str) -> Result<()>;

    /// Hand over the receiving end of the client's event stream. The
    /// session manager calls this exactly once, right after construction,
    /// and drains it for the lifetime of the handle.
    fn take_events(&mut self) -> Option<mpsc::Receiver<ChatEvent>>;
}
