pub mod dates;
pub mod eligibility;
pub mod import;

pub use eligibility::{recalculate_follow_up_dates, scan_due_today, CellWrite, DueLead};
pub use import::{reconcile, ImportOutcome, ImportReport};
