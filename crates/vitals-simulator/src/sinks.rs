use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use monitor_core::{SignalKind, VitalRecord};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Wire rendering of one record: `patientId,timestamp,label,payload`.
///
/// Marker records put their annotation on the wire instead of the numeric
/// value, matching what the stream parser expects back.
pub fn wire_line(record: &VitalRecord) -> String {
    let payload = match &record.annotation {
        Some(annotation) if record.signal == SignalKind::AlertMarker => annotation.clone(),
        _ => record.value.to_string(),
    };
    format!(
        "{},{},{},{}",
        record.patient_id, record.timestamp, record.signal, payload
    )
}

#[async_trait]
pub trait OutputSink: Send + Sync {
    async fn emit(&self, record: &VitalRecord) -> Result<()>;
}

/// One line per record on stdout.
pub struct ConsoleSink;

#[async_trait]
impl OutputSink for ConsoleSink {
    async fn emit(&self, record: &VitalRecord) -> Result<()> {
        println!("{}", wire_line(record));
        Ok(())
    }
}

/// Appends each record to `<dir>/<label>.txt`.
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        info!("Writing simulator output files under {}", dir.display());
        Ok(Self { dir })
    }
}

#[async_trait]
impl OutputSink for FileSink {
    async fn emit(&self, record: &VitalRecord) -> Result<()> {
        let path = self.dir.join(format!("{}.txt", record.signal));
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(format!("{}\n", wire_line(record)).as_bytes())
            .await?;
        Ok(())
    }
}

/// Pushes lines to a single TCP client.
///
/// Records emitted while no client is connected are dropped; a new
/// connection replaces the previous one.
pub struct TcpSink {
    client: Arc<Mutex<Option<TcpStream>>>,
}

impl TcpSink {
    pub async fn bind(port: u16) -> Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port)).await?;
        info!("TCP output listening on port {}", port);

        let client: Arc<Mutex<Option<TcpStream>>> = Arc::new(Mutex::new(None));
        let slot = client.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        info!("TCP client connected from {}", addr);
                        *slot.lock().await = Some(stream);
                    }
                    Err(e) => warn!("TCP accept error: {}", e),
                }
            }
        });

        Ok(Self { client })
    }
}

#[async_trait]
impl OutputSink for TcpSink {
    async fn emit(&self, record: &VitalRecord) -> Result<()> {
        let mut guard = self.client.lock().await;
        if let Some(stream) = guard.as_mut() {
            let line = format!("{}\n", wire_line(record));
            if let Err(e) = stream.write_all(line.as_bytes()).await {
                debug!("TCP client dropped: {}", e);
                *guard = None;
            }
        }
        Ok(())
    }
}
