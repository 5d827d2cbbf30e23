use tracing::debug;

use crate::{
    settings::ImportSettings,
    storage::{CellValue, Record, Table},
};

/// Per-row result of a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported,
    Duplicate,
    /// Blank primary key in the staging row.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct RowOutcome {
    pub row: usize,
    pub outcome: ImportOutcome,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub rows: Vec<RowOutcome>,
    pub appended: Vec<Record>,
    pub imported: usize,
    pub duplicates: usize,
}

/// Reconcile the staging table against the destination table.
///
/// Staging rows are visited in order with no stop-at-blank truncation; a row
/// with a blank primary-key cell is skipped instead. The duplicate check
/// runs against a snapshot of the destination keys taken before the loop:
/// rows appended by this same run are not visible to later checks, so a key
/// occurring twice in staging imports twice. That is the documented
/// behavior, not an accident.
pub fn reconcile(staging: &Table, destination: &Table, settings: &ImportSettings) -> ImportReport {
    let key_src = settings.primary_key_src.index();
    let key_dest = settings.primary_key_dest.index();

    let dest_keys: Vec<&CellValue> = destination
        .data_rows()
        .map(|(_, row)| row.get(key_dest))
        .collect();

    let mut report = ImportReport::default();

    for (row_idx, row) in staging.data_rows() {
        let key = row.get(key_src);
        if key.is_blank() {
            report.rows.push(RowOutcome {
                row: row_idx,
                outcome: ImportOutcome::Skipped,
            });
            continue;
        }

        let is_duplicate = dest_keys.iter().any(|dest| dest.loosely_eq(key));
        if is_duplicate {
            debug!("Row {}: duplicate key {:?}", row_idx + 1, key.display());
            report.rows.push(RowOutcome {
                row: row_idx,
                outcome: ImportOutcome::Duplicate,
            });
            report.duplicates += 1;
            continue;
        }

        let mut mapped = Record::new();
        for (dest_col, src_col) in &settings.mappings {
            mapped.set(dest_col.index(), row.get(src_col.index()).clone());
        }

        report.appended.push(mapped);
        report.rows.push(RowOutcome {
            row: row_idx,
            outcome: ImportOutcome::Imported,
        });
        report.imported += 1;
    }

    report
}
