use tracing::warn;

use crate::tsv::RawRecord;

/// Rows with fewer fields than this cannot hold a full status record and
/// are discarded by validation. Both source kinds share the schema width.
const MIN_FIELDS: usize = 6;

/// One completed `barman-cloud-backup` run.
///
/// Raw field layout: `timestamp, bucket_name, exit_code, duration_seconds,
/// size_bytes, backup_id`. Success is derived from exit code zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub timestamp: i64,
    pub bucket_name: String,
    pub success: bool,
    pub duration_seconds: u64,
    pub size_bytes: u64,
    pub backup_id: String,
}

impl BackupRecord {
    fn from_raw(fields: &RawRecord) -> Option<Self> {
        if fields.len() < MIN_FIELDS {
            return None;
        }
        Some(Self {
            timestamp: fields[0].parse().ok()?,
            bucket_name: fields[1].clone(),
            success: fields[2].parse::<i64>().ok()? == 0,
            duration_seconds: fields[3].parse().ok()?,
            size_bytes: fields[4].parse().ok()?,
            backup_id: fields[5].clone(),
        })
    }
}

/// One completed `barman-cloud-wal-archive` run.
///
/// Raw field layout: `timestamp, bucket_name, wal_name, size_bytes,
/// success_flag, duration_seconds`. A nonzero flag means success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalRecord {
    pub timestamp: i64,
    pub bucket_name: String,
    pub wal_name: String,
    pub size_bytes: u64,
    pub success: bool,
    pub duration_seconds: u64,
}

impl WalRecord {
    fn from_raw(fields: &RawRecord) -> Option<Self> {
        if fields.len() < MIN_FIELDS {
            return None;
        }
        Some(Self {
            timestamp: fields[0].parse().ok()?,
            bucket_name: fields[1].clone(),
            wal_name: fields[2].clone(),
            size_bytes: fields[3].parse().ok()?,
            success: fields[4].parse::<i64>().ok()? != 0,
            duration_seconds: fields[5].parse().ok()?,
        })
    }
}

/// Convert raw backup rows into typed records, in file order.
///
/// A row that fails any field conversion is dropped with a warning; it
/// never aborts the batch and never shadows previously accepted records.
pub fn validate_backups(rows: &[RawRecord]) -> Vec<BackupRecord> {
    validate(rows, BackupRecord::from_raw, "backup")
}

/// Convert raw WAL rows into typed records, in file order. Same
/// discard-on-malformed policy as [`validate_backups`].
pub fn validate_wals(rows: &[RawRecord]) -> Vec<WalRecord> {
    validate(rows, WalRecord::from_raw, "wal")
}

fn validate<T>(rows: &[RawRecord], convert: fn(&RawRecord) -> Option<T>, kind: &str) -> Vec<T> {
    rows.iter()
        .filter_map(|row| match convert(row) {
            Some(record) => Some(record),
            None => {
                warn!(target: "barman.collect", kind, row = ?row, "discarding malformed row");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(fields: &[&str]) -> RawRecord {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn backup_row_parses_with_exit_code_zero_as_success() {
        let records = validate_backups(&[raw(&["1700000000", "bkt-a", "0", "120", "2048", "id-1"])]);
        assert_eq!(
            records,
            vec![BackupRecord {
                timestamp: 1_700_000_000,
                bucket_name: "bkt-a".into(),
                success: true,
                duration_seconds: 120,
                size_bytes: 2048,
                backup_id: "id-1".into(),
            }]
        );
    }

    #[test]
    fn backup_nonzero_exit_code_means_failure() {
        let records = validate_backups(&[raw(&["1700003600", "bkt-a", "1", "60", "4096", "id-2"])]);
        assert!(!records[0].success);
    }

    #[test]
    fn short_backup_row_is_discarded() {
        let records = validate_backups(&[raw(&["1700000000", "bkt-a", "0", "120"])]);
        assert!(records.is_empty());
    }

    #[test]
    fn unparseable_field_discards_only_that_row() {
        let records = validate_backups(&[
            raw(&["1700000000", "bkt-a", "0", "120", "2048", "id-1"]),
            raw(&["not-a-number", "bkt-a", "0", "60", "4096", "id-2"]),
            raw(&["1700007200", "bkt-a", "0", "30", "8192", "id-3"]),
        ]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].backup_id, "id-1");
        assert_eq!(records[1].backup_id, "id-3");
    }

    #[test]
    fn extra_trailing_fields_are_tolerated() {
        let records =
            validate_backups(&[raw(&["1", "bkt", "0", "2", "3", "id", "surplus", "fields"])]);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn wal_row_parses_with_flag_semantics() {
        let records = validate_wals(&[
            raw(&["1700000000", "bkt-a", "000000010000000000000001", "16777216", "1", "2"]),
            raw(&["1700000060", "bkt-a", "000000010000000000000002", "16777216", "0", "3"]),
        ]);
        assert!(records[0].success);
        assert!(!records[1].success);
        assert_eq!(records[1].wal_name, "000000010000000000000002");
        assert_eq!(records[1].duration_seconds, 3);
    }

    #[test]
    fn wal_negative_size_is_rejected() {
        let records = validate_wals(&[raw(&["1700000000", "bkt-a", "wal-1", "-5", "1", "2"])]);
        assert!(records.is_empty());
    }
}
