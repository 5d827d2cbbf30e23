use rusqlite::{params, Connection, OptionalExtension};

use crate::{
    error::{CrmBotError, Result},
    storage::models::{CellMarker, CellValue, Record, Table},
    storage::store::TableStore,
};

/// SQLite-backed table store. Each sheet row is kept as one JSON-encoded
/// record keyed by (sheet, row_idx); markers live in a side table since they
/// are cosmetic and never read back by the engines.
pub struct SqliteTableStore {
    conn: Connection,
}

impl SqliteTableStore {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS sheet_rows (
                sheet TEXT NOT NULL,
                row_idx INTEGER NOT NULL,
                cells TEXT NOT NULL,
                PRIMARY KEY (sheet, row_idx)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS cell_markers (
                sheet TEXT NOT NULL,
                row_idx INTEGER NOT NULL,
                col_idx INTEGER NOT NULL,
                color TEXT NOT NULL,
                PRIMARY KEY (sheet, row_idx, col_idx)
            )",
            [],
        )?;

        Ok(())
    }

    fn next_row_idx(&self, table: &str) -> Result<usize> {
        let max: Option<i64> = self.conn.query_row(
            "SELECT MAX(row_idx) FROM sheet_rows WHERE sheet = ?1",
            [table],
            |row| row.get(0),
        )?;
        Ok(max.map_or(0, |m| m as usize + 1))
    }

    fn get_row(&self, table: &str, row: usize) -> Result<Option<Record>> {
        let cells: Option<String> = self
            .conn
            .query_row(
                "SELECT cells FROM sheet_rows WHERE sheet = ?1 AND row_idx = ?2",
                params![table, row as i64],
                |r| r.get(0),
            )
            .optional()?;

        match cells {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn put_row(&self, table: &str, row: usize, record: &Record) -> Result<()> {
        let json = serde_json::to_string(record)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO sheet_rows (sheet, row_idx, cells) VALUES (?1, ?2, ?3)",
            params![table, row as i64, json],
        )?;
        Ok(())
    }
}

impl TableStore for SqliteTableStore {
    fn get_all_rows(&self, table: &str) -> Result<Table> {
        let mut stmt = self.conn.prepare(
            "SELECT cells FROM sheet_rows WHERE sheet = ?1 ORDER BY row_idx",
        )?;

        let rows = stmt
            .query_map([table], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if rows.is_empty() {
            return Err(CrmBotError::MissingTable(table.to_string()));
        }

        let records = rows
            .iter()
            .map(|json| serde_json::from_str(json))
            .collect::<std::result::Result<Vec<Record>, _>>()?;

        Ok(Table::new(table, records))
    }

    fn set_cell(&self, table: &str, row: usize, col: usize, value: CellValue) -> Result<()> {
        let mut record = self.get_row(table, row)?.unwrap_or_default();
        record.set(col, value);
        self.put_row(table, row, &record)
    }

    fn append_row(&self, table: &str, record: Record) -> Result<()> {
        let idx = self.next_row_idx(table)?;
        self.put_row(table, idx, &record)
    }

    fn set_cell_marker(&self, table: &str, row: usize, col: usize, marker: CellMarker) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO cell_markers (sheet, row_idx, col_idx, color)
             VALUES (?1, ?2, ?3, ?4)",
            params![table, row as i64, col as i64, marker.color()],
        )?;
        Ok(())
    }

    fn clear_data_rows(&self, table: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM sheet_rows WHERE sheet = ?1 AND row_idx > 0",
            [table],
        )?;
        self.conn.execute(
            "DELETE FROM cell_markers WHERE sheet = ?1 AND row_idx > 0",
            [table],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SqliteTableStore {
        let store = SqliteTableStore::in_memory().unwrap();
        store
            .append_row("Leads", Record::from_texts(&["Name", "Phone"]))
            .unwrap();
        store
            .append_row("Leads", Record::from_texts(&["Ana", "555-0101"]))
            .unwrap();
        store
    }

    #[test]
    fn test_append_and_read_back() {
        let store = seeded();
        let table = store.get_all_rows("Leads").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[1].get(0), &CellValue::text("Ana"));
    }

    #[test]
    fn test_missing_table_is_structural_error() {
        let store = SqliteTableStore::in_memory().unwrap();
        match store.get_all_rows("Nope") {
            Err(CrmBotError::MissingTable(name)) => assert_eq!(name, "Nope"),
            other => panic!("expected MissingTable, got {:?}", other.map(|t| t.row_count())),
        }
    }

    #[test]
    fn test_set_cell_overwrites_in_place() {
        let store = seeded();
        store
            .set_cell("Leads", 1, 1, CellValue::text("555-0199"))
            .unwrap();
        let table = store.get_all_rows("Leads").unwrap();
        assert_eq!(table.rows()[1].get(1), &CellValue::text("555-0199"));
        assert_eq!(table.rows()[1].get(0), &CellValue::text("Ana"));
    }

    #[test]
    fn test_set_cell_past_row_width_grows_record() {
        let store = seeded();
        store.set_cell("Leads", 1, 6, CellValue::text("Yes")).unwrap();
        let table = store.get_all_rows("Leads").unwrap();
        assert_eq!(table.rows()[1].get(6), &CellValue::text("Yes"));
    }

    #[test]
    fn test_clear_data_rows_keeps_header() {
        let store = seeded();
        store.clear_data_rows("Leads").unwrap();
        let table = store.get_all_rows("Leads").unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows()[0].get(0), &CellValue::text("Name"));
    }

    #[test]
    fn test_rows_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheets.db");
        let path = path.to_str().unwrap();
        {
            let store = SqliteTableStore::new(path).unwrap();
            store
                .append_row("Leads", Record::from_texts(&["Name"]))
                .unwrap();
            store
                .append_row("Leads", Record::from_texts(&["Ana"]))
                .unwrap();
        }

        let store = SqliteTableStore::new(path).unwrap();
        let table = store.get_all_rows("Leads").unwrap();
        assert_eq!(table.data_row_count(), 1);
        assert_eq!(table.rows()[1].get(0), &CellValue::text("Ana"));
    }

    #[test]
    fn test_markers_are_write_only() {
        let store = seeded();
        store
            .set_cell_marker("Leads", 1, 0, CellMarker::Success)
            .unwrap();
        // values untouched
        let table = store.get_all_rows("Leads").unwrap();
        assert_eq!(table.rows()[1].get(0), &CellValue::text("Ana"));
    }
}
