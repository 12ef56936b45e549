use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use monitor_core::VitalRecord;
use tokio::sync::broadcast;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::parse::parse_stream_record;

const EVENT_BUFFER: usize = 256;
const RECONNECT_SECS: u64 = 5;

/// WebSocket client for a live vitals feed.
///
/// Each text frame is one wire-format record. Parsed records fan out on a
/// broadcast channel; malformed frames are logged and dropped. The client
/// reconnects after errors until [`shutdown`](Self::shutdown) is called.
pub struct WebSocketSource {
    url: String,
    tx: broadcast::Sender<VitalRecord>,
    shutdown: Arc<tokio::sync::Notify>,
}

impl WebSocketSource {
    pub fn new(url: impl Into<String>) -> (Self, broadcast::Receiver<VitalRecord>) {
        let (tx, rx) = broadcast::channel(EVENT_BUFFER);
        let source = Self {
            url: url.into(),
            tx,
            shutdown: Arc::new(tokio::sync::Notify::new()),
        };
        (source, rx)
    }

    pub fn sender(&self) -> broadcast::Sender<VitalRecord> {
        self.tx.clone()
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    pub async fn run(&self) {
        loop {
            match self.connect_and_stream().await {
                Ok(()) => {
                    info!("Vitals stream disconnected gracefully");
                    break;
                }
                Err(e) => {
                    warn!("Vitals stream error: {}, reconnecting in {}s", e, RECONNECT_SECS);
                    tokio::select! {
                        _ = tokio::time::sleep(std::time::Duration::from_secs(RECONNECT_SECS)) => {}
                        _ = self.shutdown.notified() => {
                            info!("Vitals stream shutdown requested");
                            return;
                        }
                    }
                }
            }
        }
    }

    async fn connect_and_stream(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let (ws_stream, _) = connect_async(&self.url).await?;
        let (mut write, mut read) = ws_stream.split();
        info!("Connected to vitals stream at {}", self.url);

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_frame(&text);
                        }
                        Some(Ok(Message::Ping(data))) => {
                            let _ = write.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Vitals stream connection closed");
                            return Ok(());
                        }
                        Some(Err(e)) => {
                            return Err(Box::new(e));
                        }
                        _ => {}
                    }
                }
                _ = self.shutdown.notified() => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }
            }
        }
    }

    fn handle_frame(&self, text: &str) {
        match parse_stream_record(text) {
            Ok(record) => {
                debug!(
                    "Received {} reading for patient {}",
                    record.signal, record.patient_id
                );
                let _ = self.tx.send(record);
            }
            Err(err) => warn!("Dropping frame: {}", err),
        }
    }
}
