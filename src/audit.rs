use chrono::Local;
use tracing::warn;

use crate::{
    error::Result,
    settings::LogLevel,
    storage::{CellValue, Record, TableStore},
};

/// Persisted run log, appended to the logs table as (timestamp, message)
/// rows. Verbosity follows the LogLevel setting: Minimal keeps only forced
/// entries, Detailed keeps everything. An append failure must never fail the
/// action it is describing, so it is demoted to a tracing warning.
pub struct AuditLog<'a> {
    store: &'a dyn TableStore,
    table: &'a str,
    level: LogLevel,
}

impl<'a> AuditLog<'a> {
    pub fn new(store: &'a dyn TableStore, table: &'a str, level: LogLevel) -> Self {
        Self {
            store,
            table,
            level,
        }
    }

    /// Detailed-level entry.
    pub fn record(&self, message: &str) {
        if self.level == LogLevel::Detailed {
            self.append(message);
        }
    }

    /// Entry kept at any verbosity.
    pub fn record_forced(&self, message: &str) {
        self.append(message);
    }

    fn append(&self, message: &str) {
        let row = Record::from_cells(vec![
            CellValue::Date(Local::now().naive_local()),
            CellValue::text(message),
        ]);
        if let Err(e) = self.store.append_row(self.table, row) {
            warn!("Failed to append audit log entry: {}", e);
        }
    }

    /// Drop all log rows, keeping the header.
    pub fn clear(&self) -> Result<()> {
        self.store.clear_data_rows(self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Record, SqliteTableStore};

    fn store_with_log_table() -> SqliteTableStore {
        let store = SqliteTableStore::in_memory().unwrap();
        store
            .append_row("Logs", Record::from_texts(&["Timestamp", "Message"]))
            .unwrap();
        store
    }

    #[test]
    fn test_minimal_level_keeps_only_forced_entries() {
        let store = store_with_log_table();
        let audit = AuditLog::new(&store, "Logs", LogLevel::Minimal);
        audit.record("chatty");
        audit.record_forced("important");

        let table = store.get_all_rows("Logs").unwrap();
        assert_eq!(table.data_row_count(), 1);
        assert_eq!(table.rows()[1].get(1), &CellValue::text("important"));
    }

    #[test]
    fn test_detailed_level_keeps_everything() {
        let store = store_with_log_table();
        let audit = AuditLog::new(&store, "Logs", LogLevel::Detailed);
        audit.record("chatty");
        audit.record_forced("important");
        assert_eq!(store.get_all_rows("Logs").unwrap().data_row_count(), 2);
    }

    #[test]
    fn test_clear_keeps_header() {
        let store = store_with_log_table();
        let audit = AuditLog::new(&store, "Logs", LogLevel::Detailed);
        audit.record_forced("entry");
        audit.clear().unwrap();
        let table = store.get_all_rows("Logs").unwrap();
        assert_eq!(table.row_count(), 1);
    }
}
