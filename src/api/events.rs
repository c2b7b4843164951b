//! Push channel: server → client event stream over WebSocket.
//!
//! The backend emits JSON frames `{"event": <name>, "data": {...}}` for
//! logs, progress, task lifecycle and training progress. The listener
//! forwards decoded events over an mpsc channel into the TUI loop and
//! reconnects with a fixed backoff when the connection drops. A dead
//! push channel never breaks polling; it only delays live updates.

use std::time::Duration;

use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::logging::LogThrottle;

use super::types::{LogEntry, ProgressUpdate, TrainingProgress};

/// Delay between reconnect attempts after a dropped connection.
const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Task lifecycle payload for `task_start` / `task_complete`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskEvent {
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub worker: Option<u32>,
    #[serde(default)]
    pub platform: Option<String>,
}

/// Decoded push event.
#[derive(Debug, Clone)]
pub enum ServerEvent {
    Connect,
    LogUpdate(LogEntry),
    ProgressUpdate(ProgressUpdate),
    TaskStart(TaskEvent),
    TaskComplete(TaskEvent),
    TrainingProgress(TrainingProgress),
}

#[derive(Debug, Deserialize)]
struct PushFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Decode one wire frame. Unknown event names and malformed payloads
/// yield `None`; the stream carries on.
pub fn decode_frame(text: &str) -> Option<ServerEvent> {
    let frame: PushFrame = serde_json::from_str(text).ok()?;
    match frame.event.as_str() {
        "connect" | "connected" => Some(ServerEvent::Connect),
        "log_update" => serde_json::from_value(frame.data)
            .ok()
            .map(ServerEvent::LogUpdate),
        "progress_update" => serde_json::from_value(frame.data)
            .ok()
            .map(ServerEvent::ProgressUpdate),
        "task_start" => serde_json::from_value(frame.data)
            .ok()
            .map(ServerEvent::TaskStart),
        "task_complete" => serde_json::from_value(frame.data)
            .ok()
            .map(ServerEvent::TaskComplete),
        "training_progress" => serde_json::from_value(frame.data)
            .ok()
            .map(ServerEvent::TrainingProgress),
        _ => None,
    }
}

/// Connect to the push channel and forward events until the receiving
/// side is dropped. Reconnects forever on failure.
pub async fn run_listener(url: String, sender: mpsc::UnboundedSender<ServerEvent>) {
    let throttle = LogThrottle::new(Duration::from_millis(500));

    loop {
        match tokio_tungstenite::connect_async(&url).await {
            Ok((ws, _)) => {
                tracing::info!(url = %url, "Push channel connected");
                let (_write, mut read) = ws.split();

                while let Some(message) = read.next().await {
                    use tokio_tungstenite::tungstenite::Message;
                    let text = match message {
                        Ok(Message::Text(text)) => text,
                        Ok(Message::Close(_)) => break,
                        Ok(_) => continue, // Ignore binary, ping, pong
                        Err(e) => {
                            tracing::debug!(error = %e, "Push channel receive error");
                            break;
                        }
                    };

                    let Some(event) = decode_frame(&text) else {
                        continue;
                    };

                    if matches!(event, ServerEvent::ProgressUpdate(_)) {
                        if throttle.should_log() {
                            tracing::debug!("Progress update received");
                        }
                    } else {
                        tracing::debug!(event = ?event, "Push event received");
                    }

                    if sender.send(event).is_err() {
                        // Receiver gone, the TUI has shut down.
                        return;
                    }
                }

                tracing::info!("Push channel disconnected");
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Push channel connect failed");
            }
        }

        if sender.is_closed() {
            return;
        }
        sleep(RECONNECT_DELAY).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::LogLevel;

    #[test]
    fn decodes_log_update() {
        let frame = r#"{"event": "log_update", "data": {
            "message": "Scraped 42 buses",
            "level": "success",
            "timestamp": "2025-12-05T10:30:00",
            "platform": "redbus"
        }}"#;
        match decode_frame(frame) {
            Some(ServerEvent::LogUpdate(entry)) => {
                assert_eq!(entry.message, "Scraped 42 buses");
                assert_eq!(entry.level, LogLevel::Success);
                assert_eq!(entry.platform.as_deref(), Some("redbus"));
            }
            other => panic!("Unexpected decode result: {:?}", other),
        }
    }

    #[test]
    fn decodes_progress_update() {
        let frame = r#"{"event": "progress_update", "data": {
            "progress": 66.7, "completed": 20, "total": 30,
            "current_tasks": ["Jakarta-Semarang 2025-12-05"]
        }}"#;
        match decode_frame(frame) {
            Some(ServerEvent::ProgressUpdate(update)) => {
                assert_eq!(update.completed, 20);
                assert_eq!(update.total, 30);
            }
            other => panic!("Unexpected decode result: {:?}", other),
        }
    }

    #[test]
    fn decodes_connect_without_data() {
        assert!(matches!(
            decode_frame(r#"{"event": "connect"}"#),
            Some(ServerEvent::Connect)
        ));
        // Legacy name used by older servers
        assert!(matches!(
            decode_frame(r#"{"event": "connected", "data": {"message": "hi"}}"#),
            Some(ServerEvent::Connect)
        ));
    }

    #[test]
    fn decodes_training_progress() {
        let frame =
            r#"{"event": "training_progress", "data": {"progress": 40, "step": "Training models..."}}"#;
        match decode_frame(frame) {
            Some(ServerEvent::TrainingProgress(p)) => {
                assert_eq!(p.progress, 40.0);
                assert_eq!(p.step, "Training models...");
            }
            other => panic!("Unexpected decode result: {:?}", other),
        }
    }

    #[test]
    fn unknown_event_and_garbage_are_skipped() {
        assert!(decode_frame(r#"{"event": "heartbeat", "data": {}}"#).is_none());
        assert!(decode_frame("not json at all").is_none());
        // Malformed payload for a known event
        assert!(decode_frame(r#"{"event": "log_update", "data": 42}"#).is_none());
    }
}
