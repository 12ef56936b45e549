use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use monitor_core::VitalRecord;
use tracing::{debug, info, warn};

use crate::generators::{
    AlertMarkerGenerator, BloodLevelsGenerator, BloodPressureGenerator, EcgGenerator,
    SaturationGenerator, VitalGenerator,
};
use crate::sinks::OutputSink;

const DEFAULT_TICK_MS: u64 = 1_000;

// Cadences in ticks, matching how often each signal is observed on a ward.
const SATURATION_EVERY: u64 = 1;
const ECG_EVERY: u64 = 1;
const MARKER_EVERY: u64 = 20;
const BLOOD_PRESSURE_EVERY: u64 = 60;
const BLOOD_LEVELS_EVERY: u64 = 120;

struct ScheduleEntry {
    generator: Box<dyn VitalGenerator>,
    every_ticks: u64,
}

/// Drives the generator set on a fixed tick, fastest signals first.
pub struct Simulator {
    patient_count: u32,
    tick_ms: u64,
    ticks: u64,
    entries: Vec<ScheduleEntry>,
}

impl Simulator {
    pub fn new(patient_count: u32) -> Self {
        let entries = vec![
            ScheduleEntry {
                generator: Box::new(SaturationGenerator::new(patient_count)),
                every_ticks: SATURATION_EVERY,
            },
            ScheduleEntry {
                generator: Box::new(EcgGenerator::new(patient_count)),
                every_ticks: ECG_EVERY,
            },
            ScheduleEntry {
                generator: Box::new(AlertMarkerGenerator::new(patient_count)),
                every_ticks: MARKER_EVERY,
            },
            ScheduleEntry {
                generator: Box::new(BloodPressureGenerator::new(patient_count)),
                every_ticks: BLOOD_PRESSURE_EVERY,
            },
            ScheduleEntry {
                generator: Box::new(BloodLevelsGenerator::new(patient_count)),
                every_ticks: BLOOD_LEVELS_EVERY,
            },
        ];
        Self {
            patient_count,
            tick_ms: DEFAULT_TICK_MS,
            ticks: 0,
            entries,
        }
    }

    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    pub fn patient_count(&self) -> u32 {
        self.patient_count
    }

    pub fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    /// Advance one tick and collect every record due at `now_ms`.
    pub fn tick_at(&mut self, now_ms: i64) -> Vec<VitalRecord> {
        self.ticks += 1;
        let mut records = Vec::new();
        for entry in &mut self.entries {
            if self.ticks % entry.every_ticks != 0 {
                continue;
            }
            for patient_id in 1..=self.patient_count {
                records.extend(entry.generator.generate(patient_id, now_ms));
            }
        }
        records
    }

    /// Advance one tick stamped with the current wall clock.
    pub fn tick(&mut self) -> Vec<VitalRecord> {
        self.tick_at(Utc::now().timestamp_millis())
    }

    /// Tick forever, pushing every record to the sink, until shutdown.
    pub async fn run(
        mut self,
        sink: Arc<dyn OutputSink>,
        shutdown: Arc<tokio::sync::Notify>,
    ) -> Result<()> {
        info!(
            "Simulating {} patients, one tick every {}ms",
            self.patient_count, self.tick_ms
        );
        for entry in &self.entries {
            debug!(
                "Scheduled {} every {} tick(s)",
                entry.generator.name(),
                entry.every_ticks
            );
        }
        let mut interval = tokio::time::interval(std::time::Duration::from_millis(self.tick_ms));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    for record in self.tick() {
                        if let Err(e) = sink.emit(&record).await {
                            warn!("Output sink error: {}", e);
                        }
                    }
                }
                _ = shutdown.notified() => {
                    info!("Simulator stopped");
                    return Ok(());
                }
            }
        }
    }
}
