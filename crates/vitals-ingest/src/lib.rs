//! Ingestion boundary: wire and file parsing plus the live stream client.
//!
//! Everything downstream of this crate works with fully parsed
//! [`monitor_core::VitalRecord`] values; malformed input is rejected here
//! and never reaches the evaluation core.

pub mod error;
pub mod file;
pub mod parse;
pub mod ws;

pub use error::IngestError;
pub use file::FileSource;
pub use parse::{parse_csv_record, parse_stream_record};
pub use ws::WebSocketSource;
