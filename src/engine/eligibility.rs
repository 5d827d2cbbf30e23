use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::{
    engine::dates::{self, FOLLOW_UP_OFFSET_DAYS},
    schema::LeadSchema,
    storage::{CellMarker, CellValue, Table},
};

/// A tracked lead whose follow-up falls due today.
#[derive(Debug, Clone)]
pub struct DueLead {
    pub row: usize,
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub renewal_date: Option<NaiveDateTime>,
}

/// One pending cell mutation produced by a scan. Applied by the caller after
/// the full pass so the eligibility check always sees pre-mutation flags.
#[derive(Debug, Clone, PartialEq)]
pub struct CellWrite {
    pub row: usize,
    pub col: usize,
    pub value: CellValue,
    pub marker: Option<CellMarker>,
}

#[derive(Debug, Default)]
pub struct DueScan {
    pub due: Vec<DueLead>,
    pub flag_writes: Vec<CellWrite>,
}

/// Scan the tracked-lead table for rows due today.
///
/// Iteration stops at the first row with a blank first column; that row is
/// the end-of-data sentinel, and rows after it are never reached even if
/// populated. A row whose follow-up date fails to normalize is skipped, not
/// a stop. Due rows are collected in encounter order together with the flag
/// writes that mark them notified.
pub fn scan_due_today(table: &Table, schema: &LeadSchema, today: NaiveDate) -> DueScan {
    let mut scan = DueScan::default();

    for (row_idx, row) in table.bounded_rows() {
        let follow_up = match dates::normalize(row.get(schema.follow_up_date)) {
            Some(d) => d,
            None => {
                debug!("Row {}: invalid or missing follow-up date", row_idx + 1);
                continue;
            }
        };
        let renewal_date = dates::normalize(row.get(schema.renewal_date));
        let notified = row.get(schema.notified).as_trimmed_text() == "Yes";

        if dates::is_same_date(follow_up, today.and_time(NaiveTime::MIN)) && !notified {
            scan.due.push(DueLead {
                row: row_idx,
                first_name: row.get(schema.first_name).display(),
                last_name: row.get(schema.last_name).display(),
                contact_number: row.get(schema.contact_number).display(),
                renewal_date,
            });
            scan.flag_writes.push(CellWrite {
                row: row_idx,
                col: schema.notified,
                value: CellValue::text("Yes"),
                marker: Some(CellMarker::Success),
            });
        } else {
            debug!("Row {}: not eligible for notification", row_idx + 1);
        }
    }

    scan
}

#[derive(Debug, Default)]
pub struct RecalcResult {
    pub updated: usize,
    pub date_writes: Vec<CellWrite>,
}

/// Recompute every follow-up date as renewal minus 42 calendar days.
///
/// Day-granular subtraction, so month and year boundaries are crossed
/// correctly. Rows with an unparseable renewal date are skipped without
/// failing the batch, and the stop-at-blank sentinel applies as in
/// [`scan_due_today`].
pub fn recalculate_follow_up_dates(table: &Table, schema: &LeadSchema) -> RecalcResult {
    let mut result = RecalcResult::default();

    for (row_idx, row) in table.bounded_rows() {
        let renewal = match dates::normalize(row.get(schema.renewal_date)) {
            Some(d) => d,
            None => continue,
        };

        let follow_up = renewal - Duration::days(FOLLOW_UP_OFFSET_DAYS);
        result.date_writes.push(CellWrite {
            row: row_idx,
            col: schema.follow_up_date,
            value: CellValue::Date(follow_up),
            marker: None,
        });
        result.updated += 1;
    }

    result
}
