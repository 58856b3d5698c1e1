//! Drives the session manager with a scripted in-process client.
//!
//! The scripted client plays the role of the wrapped chat library: after
//! `connect()` it emits a canned Connected → Authenticated → JoinedChannel →
//! ChatCommandReceived → Disconnected sequence, so the full lifecycle can be
//! watched without a real Twitch connection.
//!
//! Run with: `cargo run --example scripted_session`

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use twitch_session::{
    ChannelSessionManager, ChatClient, ChatCommand, ChatEvent, ClientOptions, ConfigProvider,
    ConnectionCredentials, FileConfigProvider, LogNotifier,
};

struct ScriptedClient {
    credentials: Option<ConnectionCredentials>,
    channel: String,
    connected: Arc<AtomicBool>,
    tx: mpsc::Sender<ChatEvent>,
    rx: Option<mpsc::Receiver<ChatEvent>>,
}

impl ScriptedClient {
    fn new(_options: &ClientOptions) -> Self {
        let (tx, rx) = mpsc::channel(64);
        Self {
            credentials: None,
            channel: String::new(),
            connected: Arc::new(AtomicBool::new(false)),
            tx,
            rx: Some(rx),
        }
    }
}

impl ChatClient for ScriptedClient {
    fn initialize(&mut self, credentials: ConnectionCredentials, auto_join_channel: &str) {
        self.channel = auto_join_channel.to_string();
        self.credentials = Some(credentials);
    }

    fn set_credentials(&mut self, credentials: ConnectionCredentials) {
        self.credentials = Some(credentials);
    }

    fn credentials(&self) -> Option<ConnectionCredentials> {
        self.credentials.clone()
    }

    fn connect(&mut self) -> Result<()> {
        let tx = self.tx.clone();
        let channel = self.channel.clone();
        let connected = Arc::clone(&self.connected);
        let username = self
            .credentials
            .as_ref()
            .map(|c| c.channel_name.clone())
            .unwrap_or_default();

        tokio::spawn(async move {
            connected.store(true, Ordering::SeqCst);
            let _ = tx
                .send(ChatEvent::Connected {
                    bot_username: username.clone(),
                    auto_join_channel: channel.clone(),
                })
                .await;
            let _ = tx
                .send(ChatEvent::Authenticated {
                    username: username.clone(),
                })
                .await;
            let _ = tx
                .send(ChatEvent::JoinedChannel {
                    channel: channel.clone(),
                })
                .await;

            tokio::time::sleep(Duration::from_millis(200)).await;
            let _ = tx
                .send(ChatEvent::ChatCommandReceived {
                    command: ChatCommand {
                        command: "req".to_string(),
                        args: vec!["demo-song".to_string()],
                        channel: channel.clone(),
                        sender: "viewer42".to_string(),
                    },
                })
                .await;

            tokio::time::sleep(Duration::from_millis(200)).await;
            connected.store(false, Ordering::SeqCst);
            let _ = tx
                .send(ChatEvent::Disconnected {
                    reason: "script finished".to_string(),
                })
                .await;
        });
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn send_message(&mut self, channel: &str, text: &str) -> Result<()> {
        tracing::info!(%channel, %text, "outbound message");
        Ok(())
    }

    fn take_events(&mut self) -> Option<mpsc::Receiver<ChatEvent>> {
        self.rx.take()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "twitch_session=debug,scripted_session=info".into()),
        )
        .init();

    let config = Arc::new(FileConfigProvider::open(
        std::env::temp_dir()
            .join("twitch-session-demo")
            .join("twitch.toml"),
    ));
    config.set_channel_name("viewerbot", false);
    config.set_access_token("oauth:demo", false);

    let manager = ChannelSessionManager::new(
        ClientOptions::default(),
        ScriptedClient::new,
        config,
        Arc::new(LogNotifier),
    );

    let mut events = manager.subscribe();
    manager.start();

    while let Ok(event) = events.recv().await {
        tracing::info!(?event, ready = manager.is_ready(), "forwarded");
        if matches!(event, ChatEvent::Disconnected { .. }) {
            break;
        }
    }

    manager.stop();
    Ok(())
}
