//! Live channel: the persistent push connection behind the dashboard pages.
//!
//! State machine: `connecting -> open -> (message)* -> closed -> connecting`.
//! Reconnection uses a fixed backoff with no cap; the loop runs until the
//! channel is shut down.

use std::time::Duration;

use futures::StreamExt;
use shared::protocol::LiveEvent;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};

use crate::error::ClientError;

/// Fixed delay between a lost connection and the next attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(1200);

const EVENT_BUFFER: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Socket opened; the status indicator should read "connected".
    Connected,
    /// Socket lost; a reconnect attempt is scheduled.
    Reconnecting,
    Event(LiveEvent),
}

pub struct LiveChannel {
    events: broadcast::Sender<ChannelEvent>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl LiveChannel {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            events,
            task: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events.subscribe()
    }

    /// Opens the channel against an `http(s)` base URL. A previous
    /// connection loop is cancelled first, so the channel never holds more
    /// than one live socket.
    pub async fn start(&self, server_url: &str) -> Result<(), ClientError> {
        let ws_url = ws_url_for(server_url)?;
        let handle = tokio::spawn(run_connection_loop(ws_url, self.events.clone()));
        if let Some(previous) = self.task.lock().await.replace(handle) {
            previous.abort();
        }
        Ok(())
    }

    pub async fn shutdown(&self) {
        if let Some(task) = self.task.lock().await.take() {
            task.abort();
        }
    }
}

impl Default for LiveChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// `http(s)` base -> `ws(s)` endpoint, scheme-matched.
fn ws_url_for(server_url: &str) -> Result<String, ClientError> {
    let base = if let Some(rest) = server_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = server_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        return Err(ClientError::InvalidServerUrl(server_url.to_string()));
    };
    Ok(format!("{}/ws", base.trim_end_matches('/')))
}

async fn run_connection_loop(ws_url: String, events: broadcast::Sender<ChannelEvent>) {
    loop {
        match connect_async(ws_url.as_str()).await {
            Ok((stream, _)) => {
                let _ = events.send(ChannelEvent::Connected);
                let (_, mut reader) = stream.split();
                while let Some(message) = reader.next().await {
                    match message {
                        Ok(Message::Text(text)) => {
                            match serde_json::from_str::<LiveEvent>(&text) {
                                Ok(event) => {
                                    let _ = events.send(ChannelEvent::Event(event));
                                }
                                // Not a validated contract: unknown or
                                // non-JSON frames are dropped, visibly.
                                Err(err) => warn!("live: dropping malformed event: {err}"),
                            }
                        }
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(err) => {
                            warn!("live: websocket receive failed: {err}");
                            break;
                        }
                    }
                }
            }
            Err(err) => debug!("live: connect failed: {err}"),
        }

        let _ = events.send(ChannelEvent::Reconnecting);
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

#[cfg(test)]
#[path = "tests/live_tests.rs"]
mod tests;
