use std::fs;
use std::path::PathBuf;

use monitor_core::VitalRecord;
use tracing::{info, warn};
use vitals_storage::InMemoryStore;

use crate::error::IngestError;
use crate::parse::parse_stream_record;

/// Batch loader for a directory of per-signal `.txt` output files.
///
/// Malformed lines are logged and skipped rather than failing the whole
/// load; an unreadable directory or file is an error.
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn load(&self) -> Result<Vec<VitalRecord>, IngestError> {
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("txt") {
                continue;
            }
            let contents = fs::read_to_string(&path)?;
            for line in contents.lines() {
                if line.trim().is_empty() {
                    continue;
                }
                match parse_stream_record(line) {
                    Ok(record) => records.push(record),
                    Err(err) => {
                        skipped += 1;
                        warn!("Skipping line in {}: {}", path.display(), err);
                    }
                }
            }
        }

        info!(
            "Loaded {} records from {} ({} lines skipped)",
            records.len(),
            self.dir.display(),
            skipped
        );
        Ok(records)
    }

    /// Load everything straight into a store, returning the record count.
    pub fn load_into(&self, store: &InMemoryStore) -> Result<usize, IngestError> {
        let records = self.load()?;
        let count = records.len();
        for record in records {
            store.add_record(record);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use vitals_storage::RecordStore;

    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let dir = std::env::temp_dir().join(format!(
            "vitals-ingest-{}-{}-{}",
            tag,
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_loads_txt_files_and_skips_bad_lines() {
        let dir = scratch_dir("load");
        fs::write(
            dir.join("ECG.txt"),
            "1,1000,ECG,70.0\nnot a record\n1,2000,ECG,72.0\n\n",
        )
        .unwrap();
        fs::write(dir.join("Alert.txt"), "1,1500,Alert,triggered\n").unwrap();
        fs::write(dir.join("notes.log"), "1,9999,ECG,70.0\n").unwrap();

        let records = FileSource::new(&dir).load().unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|record| record.timestamp != 9999));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_into_fills_the_store() {
        let dir = scratch_dir("store");
        fs::write(
            dir.join("SystolicBP.txt"),
            "1,1000,SystolicBP,121.0\n2,1000,SystolicBP,133.0\n",
        )
        .unwrap();

        let store = InMemoryStore::new();
        let count = FileSource::new(&dir).load_into(&store).unwrap();
        assert_eq!(count, 2);
        assert_eq!(store.patient_ids(), vec![1, 2]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = std::env::temp_dir().join("vitals-ingest-definitely-missing");
        assert!(FileSource::new(&dir).load().is_err());
    }
}
