//! Synthetic vitals feed for development and load testing.
//!
//! Random-walk generators produce per-patient readings on realistic
//! cadences; output sinks render them in the wire format the ingestion
//! side parses.

pub mod generators;
pub mod scheduler;
pub mod sinks;

pub use generators::{
    AlertMarkerGenerator, BloodLevelsGenerator, BloodPressureGenerator, CompositeGenerator,
    EcgGenerator, SaturationGenerator, VitalGenerator,
};
pub use scheduler::Simulator;
pub use sinks::{wire_line, ConsoleSink, FileSink, OutputSink, TcpSink};
