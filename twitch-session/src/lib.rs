//! Session lifecycle management for a single Twitch chat channel.
//!
//! This crate is the core of a game-mod Twitch integration: it owns one
//! wrapped chat-client handle, tracks connection/session state, validates
//! channel/credential configuration, and fans client events out to the rest
//! of the host application. The IRC-over-WebSocket wire protocol itself is
//! not implemented here — the host injects its chat-client library behind
//! the [`client::ChatClient`] trait.
//!
//! Typical wiring:
//!
//! ```ignore
//! let config = Arc::new(FileConfigProvider::open(FileConfigProvider::default_path()));
//! let notifier = Arc::new(LogNotifier);
//! let manager = ChannelSessionManager::new(
//!     ClientOptions::default(),
//!     |options| MyWrappedClient::new(options),
//!     config,
//!     notifier,
//! );
//! let mut events = manager.subscribe();
//! manager.start();
//! ```

pub mod client;
pub mod config;
pub mod event;
pub mod notify;
pub mod session;

pub use client::{ChatClient, ClientOptions, ConnectionCredentials};
pub use config::{ConfigProvider, FileConfigProvider, SessionConfig};
pub use event::{ChatCommand, ChatEvent};
pub use notify::{LogNotifier, NotificationSink};
pub use session::ChannelSessionManager;
