//! Events emitted by the wrapped chat client for the session manager and
//! host modules to consume.

use chrono::{DateTime, Utc};

/// A chat command typed in the joined channel (e.g. `!req song`).
///
/// This is the primary payload the rest of the host application consumes;
/// the session manager forwards it untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCommand {
    /// Command name without its prefix character.
    pub command: String,
    /// Whitespace-separated arguments following the command.
    pub args: Vec<String>,
    /// Channel the command was sent in.
    pub channel: String,
    /// Display name of the user who sent it.
    pub sender: String,
}

/// Events the wrapped chat client delivers on its event channel.
///
/// For a single connection attempt the client guarantees `Connected` precedes
/// `JoinedChannel`, which precedes any `ChatCommandReceived`. Once
/// `Disconnected` is delivered, no further command events arrive until a new
/// successful connect cycle.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// Raw client log line (pass-through, no state change).
    Log {
        timestamp: DateTime<Utc>,
        bot_username: String,
        line: String,
    },

    /// The transport is up and the login handshake was sent.
    Connected {
        bot_username: String,
        auto_join_channel: String,
    },

    /// The client reported a successful login.
    Authenticated { username: String },

    /// The client joined the target channel.
    JoinedChannel { channel: String },

    /// A chat command was received in the joined channel.
    ChatCommandReceived { command: ChatCommand },

    /// The server rejected our credentials.
    IncorrectLogin { reason: String },

    /// The client reported an error. Not by itself fatal to the session;
    /// the transport's own reconnection policy covers transient failures.
    Error { detail: String },

    /// Connection was closed.
    Disconnected { reason: String },
}
