//! monitor-daemon: run the vitals alert engine against a live feed.
//!
//! Default mode simulates a ward in-process, evaluates every tick, and logs
//! alert transitions as they happen.
//!
//! Usage:
//!   cargo run -p monitor-daemon                          # simulate 50 patients
//!   cargo run -p monitor-daemon -- --patient-count 8 --json
//!   cargo run -p monitor-daemon -- --emit tcp:7070       # also push the wire feed
//!   cargo run -p monitor-daemon -- --ws ws://host:8887   # consume a live stream
//!   cargo run -p monitor-daemon -- --load output/        # batch-evaluate files
//!   cargo run -p monitor-daemon -- --sim-only --emit file:output/

use std::collections::HashMap;
use std::sync::Arc;

use alert_lifecycle::{decorate, AlertEvent, AlertPolicy};
use anyhow::Context;
use chrono::Utc;
use monitor_core::{AlertKind, VitalRecord};
use patient_monitor::PatientMonitor;
use tokio::sync::broadcast::error::RecvError;
use vitals_ingest::{FileSource, WebSocketSource};
use vitals_simulator::{ConsoleSink, FileSink, OutputSink, Simulator, TcpSink};
use vitals_storage::{InMemoryStore, RecordStore};

const DEFAULT_PATIENT_COUNT: u32 = 50;
const DEFAULT_TICK_MS: u64 = 1_000;

struct DaemonConfig {
    patient_count: u32,
    tick_ms: u64,
    json_events: bool,
    /// Alert kinds that get PRIORITY decoration before reporting.
    escalate_kinds: Vec<AlertKind>,
    escalate_reason: String,
}

impl DaemonConfig {
    fn from_env_and_args(args: &[String]) -> anyhow::Result<Self> {
        let patient_count = flag_value(args, "--patient-count")
            .or_else(|| std::env::var("PATIENT_COUNT").ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PATIENT_COUNT);
        let tick_ms = flag_value(args, "--tick-ms")
            .or_else(|| std::env::var("TICK_MS").ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TICK_MS);
        let escalate_raw = flag_value(args, "--escalate")
            .or_else(|| std::env::var("ESCALATE_KINDS").ok())
            .unwrap_or_default();
        let escalate_reason =
            std::env::var("ESCALATE_REASON").unwrap_or_else(|_| "unacknowledged".to_string());

        Ok(Self {
            patient_count,
            tick_ms,
            json_events: args.iter().any(|a| a == "--json"),
            escalate_kinds: parse_escalate_kinds(&escalate_raw)?,
            escalate_reason,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "monitor_daemon=info,patient_monitor=info,alert_lifecycle=info,vitals_ingest=info,vitals_simulator=info"
                    .into()
            }),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help") {
        print_usage();
        return Ok(());
    }

    let config = DaemonConfig::from_env_and_args(&args)?;

    let sink = match flag_value(&args, "--emit") {
        Some(spec) => Some(build_sink(&spec).await?),
        None => None,
    };

    if let Some(dir) = flag_value(&args, "--load") {
        return run_batch(&config, &dir);
    }
    if let Some(url) = flag_value(&args, "--ws") {
        return run_stream(&config, &url).await;
    }
    if args.iter().any(|a| a == "--sim-only") {
        let sink = sink.unwrap_or_else(|| Arc::new(ConsoleSink));
        return run_sim_only(&config, sink).await;
    }
    run_simulation(&config, sink).await
}

/// Simulate, evaluate, and (optionally) mirror the wire feed to a sink.
async fn run_simulation(
    config: &DaemonConfig,
    sink: Option<Arc<dyn OutputSink>>,
) -> anyhow::Result<()> {
    let monitor = PatientMonitor::new();
    let mut simulator = Simulator::new(config.patient_count).with_tick_ms(config.tick_ms);
    tracing::info!(
        "Monitoring {} simulated patients with {} detectors. Press Ctrl+C to stop.",
        config.patient_count,
        monitor.registry().len()
    );

    let mut interval = tokio::time::interval(std::time::Duration::from_millis(config.tick_ms));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let records = simulator.tick();
                if let Some(sink) = &sink {
                    for record in &records {
                        if let Err(e) = sink.emit(record).await {
                            tracing::warn!("Output sink error: {}", e);
                        }
                    }
                }
                for (patient_id, batch) in group_by_patient(records) {
                    for event in monitor.evaluate(patient_id, batch) {
                        report_event(&event, config);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received SIGINT, shutting down");
                break;
            }
        }
    }

    summarize(&monitor);
    Ok(())
}

/// Consume a live WebSocket feed instead of simulating.
async fn run_stream(config: &DaemonConfig, url: &str) -> anyhow::Result<()> {
    let monitor = PatientMonitor::new();
    let (source, mut rx) = WebSocketSource::new(url);
    let source = Arc::new(source);
    let runner = source.clone();
    tokio::spawn(async move { runner.run().await });
    tracing::info!("Consuming vitals stream from {}. Press Ctrl+C to stop.", url);

    loop {
        tokio::select! {
            received = rx.recv() => {
                match received {
                    Ok(record) => {
                        let patient_id = record.patient_id;
                        for event in monitor.evaluate(patient_id, vec![record]) {
                            report_event(&event, config);
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!("Stream consumer lagged, {} records dropped", missed);
                    }
                    Err(RecvError::Closed) => {
                        tracing::info!("Stream closed");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received SIGINT, shutting down");
                source.shutdown();
                break;
            }
        }
    }

    summarize(&monitor);
    Ok(())
}

/// Load a directory of wire-format files, evaluate every patient once,
/// print the active alert set, and exit.
fn run_batch(config: &DaemonConfig, dir: &str) -> anyhow::Result<()> {
    let store = Arc::new(InMemoryStore::new());
    FileSource::new(dir)
        .load_into(&store)
        .with_context(|| format!("loading records from {}", dir))?;

    let monitor = PatientMonitor::new().with_store(store.clone());
    for patient_id in store.patient_ids() {
        for event in monitor.evaluate(patient_id, Vec::new()) {
            report_event(&event, config);
        }
    }

    let active = monitor.all_active_alerts();
    tracing::info!("Batch evaluation done: {} active alerts", active.len());
    for alert in &active {
        println!("{}", alert);
    }
    Ok(())
}

/// Run the generators and a sink without evaluating anything.
async fn run_sim_only(config: &DaemonConfig, sink: Arc<dyn OutputSink>) -> anyhow::Result<()> {
    let simulator = Simulator::new(config.patient_count).with_tick_ms(config.tick_ms);
    let shutdown = Arc::new(tokio::sync::Notify::new());
    let stopper = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        stopper.notify_one();
    });
    simulator.run(sink, shutdown).await
}

fn report_event(event: &AlertEvent, config: &DaemonConfig) {
    let decorated = if config.escalate_kinds.contains(&event.alert.kind) {
        let policy = AlertPolicy::EscalatePriority {
            reason: config.escalate_reason.clone(),
        };
        Some(decorate(&event.alert, &[policy], Utc::now().timestamp_millis()))
    } else {
        None
    };

    if config.json_events {
        let event = match &decorated {
            Some(alert) => AlertEvent::new(event.transition, alert.clone()),
            None => event.clone(),
        };
        if let Ok(line) = serde_json::to_string(&event) {
            println!("{}", line);
        }
    } else if let Some(alert) = decorated {
        tracing::warn!("Escalated {}: {}", event.transition.as_str(), alert);
    }
}

fn summarize(monitor: &PatientMonitor) {
    let active = monitor.all_active_alerts();
    tracing::info!("{} alerts active at shutdown", active.len());
    for alert in active {
        tracing::info!("  {}", alert);
    }
}

fn group_by_patient(records: Vec<VitalRecord>) -> HashMap<u32, Vec<VitalRecord>> {
    let mut by_patient: HashMap<u32, Vec<VitalRecord>> = HashMap::new();
    for record in records {
        by_patient
            .entry(record.patient_id)
            .or_default()
            .push(record);
    }
    by_patient
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_escalate_kinds(raw: &str) -> anyhow::Result<Vec<AlertKind>> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            name.parse::<AlertKind>()
                .with_context(|| format!("unknown alert kind in escalation config: '{}'", name))
        })
        .collect()
}

async fn build_sink(spec: &str) -> anyhow::Result<Arc<dyn OutputSink>> {
    if spec == "console" {
        return Ok(Arc::new(ConsoleSink));
    }
    if let Some(dir) = spec.strip_prefix("file:") {
        return Ok(Arc::new(FileSink::create(dir).await?));
    }
    if let Some(port) = spec.strip_prefix("tcp:") {
        let port: u16 = port
            .parse()
            .with_context(|| format!("invalid TCP port '{}'", port))?;
        return Ok(Arc::new(TcpSink::bind(port).await?));
    }
    anyhow::bail!(
        "unknown --emit target '{}' (use console, file:DIR, or tcp:PORT)",
        spec
    )
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  monitor-daemon                       Simulate and evaluate (default)");
    eprintln!("  monitor-daemon --ws URL              Evaluate a live WebSocket feed");
    eprintln!("  monitor-daemon --load DIR            Batch-evaluate wire-format files");
    eprintln!("  monitor-daemon --sim-only            Generate the feed without evaluating");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --patient-count N    Simulated patients (default: {})", DEFAULT_PATIENT_COUNT);
    eprintln!("  --tick-ms N          Tick interval in milliseconds (default: {})", DEFAULT_TICK_MS);
    eprintln!("  --emit TARGET        Also push the wire feed: console, file:DIR, tcp:PORT");
    eprintln!("  --json               Print lifecycle events as JSON lines");
    eprintln!("  --escalate KINDS     Comma-separated alert kinds to mark PRIORITY");
    eprintln!();
    eprintln!("Env: PATIENT_COUNT, TICK_MS, ESCALATE_KINDS, ESCALATE_REASON");
}
