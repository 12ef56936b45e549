use monitor_core::{SignalKind, VitalRecord};

use crate::error::IngestError;

const MARKER_TRIGGERED: &str = "triggered";

/// Parse one wire line: `patientId,timestamp,label,value`.
///
/// The "Alert" marker kind has no numeric reading; its fourth field is the
/// annotation (`triggered` / `resolved`), mapped to value 1.0 / 0.0. For
/// every other kind the fourth field must be a number.
pub fn parse_stream_record(line: &str) -> Result<VitalRecord, IngestError> {
    let fields = split_fields(line, 4, 4)?;
    let patient_id = parse_patient_id(line, fields[0])?;
    let timestamp = parse_timestamp(line, fields[1])?;
    let signal = SignalKind::parse(fields[2]);

    if signal == SignalKind::AlertMarker {
        let annotation = fields[3];
        let value = if annotation.eq_ignore_ascii_case(MARKER_TRIGGERED) {
            1.0
        } else {
            0.0
        };
        return Ok(VitalRecord::annotated(
            patient_id, signal, value, timestamp, annotation,
        ));
    }

    let value = parse_value(line, fields[3])?;
    Ok(VitalRecord::new(patient_id, signal, value, timestamp))
}

/// Parse one batch-file line: `patientId,value,label,timestamp[,annotation]`.
///
/// The batch format puts the numeric value second and the timestamp last,
/// the opposite of the wire order; the annotation rides in an optional
/// fifth column instead of replacing the value.
pub fn parse_csv_record(line: &str) -> Result<VitalRecord, IngestError> {
    let fields = split_fields(line, 4, 5)?;
    let patient_id = parse_patient_id(line, fields[0])?;
    let value = parse_value(line, fields[1])?;
    let signal = SignalKind::parse(fields[2]);
    let timestamp = parse_timestamp(line, fields[3])?;

    let mut record = VitalRecord::new(patient_id, signal, value, timestamp);
    if let Some(annotation) = fields.get(4) {
        record.annotation = Some((*annotation).to_string());
    }
    Ok(record)
}

fn split_fields<'a>(line: &'a str, min: usize, max: usize) -> Result<Vec<&'a str>, IngestError> {
    let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
    if fields.len() < min || fields.len() > max {
        return Err(IngestError::malformed(
            line,
            format!("expected {}-{} fields, got {}", min, max, fields.len()),
        ));
    }
    Ok(fields)
}

fn parse_patient_id(line: &str, field: &str) -> Result<u32, IngestError> {
    field
        .parse()
        .map_err(|_| IngestError::malformed(line, "patient id is not an unsigned integer"))
}

fn parse_timestamp(line: &str, field: &str) -> Result<i64, IngestError> {
    field
        .parse()
        .map_err(|_| IngestError::malformed(line, "timestamp is not epoch milliseconds"))
}

fn parse_value(line: &str, field: &str) -> Result<f64, IngestError> {
    field
        .parse()
        .map_err(|_| IngestError::malformed(line, "value is not a number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_line_with_numeric_value() {
        let record = parse_stream_record("1,1700000000000,ECG,82.5").unwrap();
        assert_eq!(record.patient_id, 1);
        assert_eq!(record.timestamp, 1_700_000_000_000);
        assert_eq!(record.signal, SignalKind::Ecg);
        assert_eq!(record.value, 82.5);
        assert!(record.annotation.is_none());
    }

    #[test]
    fn test_stream_marker_line_carries_annotation() {
        let record = parse_stream_record("3,1700000000000,Alert,triggered").unwrap();
        assert_eq!(record.signal, SignalKind::AlertMarker);
        assert_eq!(record.value, 1.0);
        assert_eq!(record.annotation.as_deref(), Some("triggered"));

        let record = parse_stream_record("3,1700000001000,Alert,resolved").unwrap();
        assert_eq!(record.value, 0.0);
        assert_eq!(record.annotation.as_deref(), Some("resolved"));
    }

    #[test]
    fn test_stream_rejects_wrong_field_count() {
        let err = parse_stream_record("1,1700000000000,ECG").unwrap_err();
        assert!(err.to_string().contains("expected 4-4 fields"));

        let err = parse_stream_record("1,1700000000000,ECG,82.5,extra").unwrap_err();
        assert!(matches!(err, IngestError::Malformed { .. }));
    }

    #[test]
    fn test_stream_rejects_non_numeric_fields() {
        assert!(parse_stream_record("abc,1700000000000,ECG,82.5").is_err());
        assert!(parse_stream_record("1,not-a-time,ECG,82.5").is_err());
        assert!(parse_stream_record("1,1700000000000,ECG,fast").is_err());
    }

    #[test]
    fn test_error_quotes_the_offending_line() {
        let err = parse_stream_record("1,1700000000000,ECG,fast").unwrap_err();
        assert!(err.to_string().contains("1,1700000000000,ECG,fast"));
    }

    #[test]
    fn test_unknown_labels_are_kept_not_rejected() {
        let record = parse_stream_record("1,1700000000000,Cholesterol,181.0").unwrap();
        assert_eq!(record.signal, SignalKind::Other("Cholesterol".to_string()));
    }

    #[test]
    fn test_fields_are_trimmed() {
        let record = parse_stream_record(" 1 , 1700000000000 , ECG , 82.5 ").unwrap();
        assert_eq!(record.patient_id, 1);
        assert_eq!(record.value, 82.5);
    }

    #[test]
    fn test_csv_line_with_annotation_column() {
        let record = parse_csv_record("2,1.0,Alert,1700000000000,triggered").unwrap();
        assert_eq!(record.signal, SignalKind::AlertMarker);
        assert_eq!(record.value, 1.0);
        assert_eq!(record.timestamp, 1_700_000_000_000);
        assert_eq!(record.annotation.as_deref(), Some("triggered"));
    }

    #[test]
    fn test_csv_line_without_annotation_column() {
        let record = parse_csv_record("2,121.0,SystolicBP,1700000000000").unwrap();
        assert_eq!(record.signal, SignalKind::SystolicBp);
        assert_eq!(record.value, 121.0);
        assert!(record.annotation.is_none());
    }

    #[test]
    fn test_csv_value_must_be_numeric_even_for_markers() {
        assert!(parse_csv_record("2,triggered,Alert,1700000000000").is_err());
    }

    #[test]
    fn test_csv_rejects_wire_ordered_lines() {
        // Wire order puts the timestamp second, which lands a float in the
        // batch format's timestamp column.
        assert!(parse_csv_record("1,1700000000000,ECG,82.5").is_err());
    }
}
