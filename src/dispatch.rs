use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::{
    audit::AuditLog,
    config::Config,
    engine::{self, CellWrite, ImportOutcome},
    error::Result,
    notify::{formatters, Digest},
    schema::LeadSchema,
    settings::{Settings, ATTR_MONTHLY_RECIPIENTS, ATTR_RENEWAL_RECIPIENTS},
    storage::{CellMarker, CellValue, TableStore},
};

/// The closed set of dispatchable actions. Anything else on the wire lands
/// in `Unknown` and is handled deliberately instead of falling through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CheckAndNotifyRenewals,
    NotifyMonthlyWorkingLeads,
    UpdateRenewalReminderDates,
    ImportLeadsFromStaging,
    Unknown(String),
}

impl Action {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "checkAndNotifyRenewals" => Action::CheckAndNotifyRenewals,
            "notifyMonthlyWorkingLeads" => Action::NotifyMonthlyWorkingLeads,
            "updateRenewalReminderDates" => Action::UpdateRenewalReminderDates,
            "importLeadsFromStaging" => Action::ImportLeadsFromStaging,
            other => Action::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Action::CheckAndNotifyRenewals => "checkAndNotifyRenewals",
            Action::NotifyMonthlyWorkingLeads => "notifyMonthlyWorkingLeads",
            Action::UpdateRenewalReminderDates => "updateRenewalReminderDates",
            Action::ImportLeadsFromStaging => "importLeadsFromStaging",
            Action::Unknown(name) => name,
        }
    }
}

/// What one dispatch produced: the caller-facing response string plus any
/// digests still to be delivered. Delivery happens outside so the store is
/// not held across network calls.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub response: String,
    pub digests: Vec<Digest>,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        self.response == "Success"
    }
}

/// Run one action to completion. Failures never propagate: they are logged
/// and folded into the coarse "Error: <message>" response; per-row detail
/// only ever reaches the audit log.
pub fn run_action(
    store: &dyn TableStore,
    config: &Config,
    action: &Action,
    today: NaiveDate,
) -> DispatchOutcome {
    info!("Dispatching action: {}", action.name());
    let mut digests = Vec::new();

    match dispatch(store, config, action, today, &mut digests) {
        Ok(()) => DispatchOutcome {
            response: "Success".to_string(),
            digests,
        },
        Err(e) => {
            error!("Exception in {}: {}", action.name(), e);
            DispatchOutcome {
                response: format!("Error: {}", e),
                digests,
            }
        }
    }
}

fn dispatch(
    store: &dyn TableStore,
    config: &Config,
    action: &Action,
    today: NaiveDate,
    digests: &mut Vec<Digest>,
) -> Result<()> {
    let setup = store.get_all_rows(&config.tables.setup)?;
    let settings = Settings::resolve(&setup);
    let audit = AuditLog::new(store, &config.tables.logs, settings.log_level());

    match action {
        Action::CheckAndNotifyRenewals => {
            check_and_notify_renewals(store, config, &settings, &audit, today, digests)
        }
        Action::NotifyMonthlyWorkingLeads => {
            notify_monthly_working_leads(store, config, &settings, &audit, today, digests)
        }
        Action::UpdateRenewalReminderDates => {
            update_renewal_reminder_dates(store, config, &audit)
        }
        Action::ImportLeadsFromStaging => {
            import_leads_from_staging(store, config, &settings, &audit)
        }
        Action::Unknown(name) => {
            audit.record_forced(&format!("Unknown action received: {}", name));
            Ok(())
        }
    }
}

fn check_and_notify_renewals(
    store: &dyn TableStore,
    config: &Config,
    settings: &Settings,
    audit: &AuditLog,
    today: NaiveDate,
    digests: &mut Vec<Digest>,
) -> Result<()> {
    audit.record_forced("Started checkAndNotifyRenewals");

    let schema = LeadSchema::from_config(&config.lead_schema)?;
    let table = store.get_all_rows(&config.tables.tracked_leads)?;
    audit.record(&format!(
        "Fetched {} rows from {}",
        table.data_row_count(),
        table.name()
    ));

    let scan = engine::scan_due_today(&table, &schema, today);

    if !scan.due.is_empty() {
        let recipients = settings.recipients(ATTR_RENEWAL_RECIPIENTS)?;
        digests.push(Digest {
            recipients,
            subject: formatters::renewal_digest_subject(today),
            body: formatters::render_renewal_digest(&scan.due),
        });
        apply_writes(store, &config.tables.tracked_leads, &scan.flag_writes)?;
    }

    audit.record_forced(&format!("Total reminders sent: {}", scan.due.len()));
    Ok(())
}

fn notify_monthly_working_leads(
    store: &dyn TableStore,
    config: &Config,
    settings: &Settings,
    audit: &AuditLog,
    today: NaiveDate,
    digests: &mut Vec<Digest>,
) -> Result<()> {
    audit.record_forced("Started notifyMonthlyWorkingLeads");

    let table = store.get_all_rows(&config.tables.working_leads)?;
    audit.record(&format!(
        "Fetched {} rows from {}",
        table.data_row_count(),
        table.name()
    ));

    let recipients = settings.recipients(ATTR_MONTHLY_RECIPIENTS)?;
    digests.push(Digest {
        recipients,
        subject: formatters::working_leads_subject(today),
        body: formatters::render_working_leads_digest(&table),
    });

    audit.record("Monthly working leads digest queued for delivery");
    Ok(())
}

fn update_renewal_reminder_dates(
    store: &dyn TableStore,
    config: &Config,
    audit: &AuditLog,
) -> Result<()> {
    audit.record_forced("Started updateRenewalReminderDates");

    let schema = LeadSchema::from_config(&config.lead_schema)?;
    let table = store.get_all_rows(&config.tables.tracked_leads)?;
    audit.record(&format!(
        "Fetched {} rows from {}",
        table.data_row_count(),
        table.name()
    ));

    let result = engine::recalculate_follow_up_dates(&table, &schema);
    apply_writes(store, &config.tables.tracked_leads, &result.date_writes)?;

    audit.record_forced(&format!(
        "Total renewal reminder dates updated: {}",
        result.updated
    ));
    Ok(())
}

fn import_leads_from_staging(
    store: &dyn TableStore,
    config: &Config,
    settings: &Settings,
    audit: &AuditLog,
) -> Result<()> {
    audit.record_forced("Started importLeadsFromStaging");

    let import = settings.import_settings()?;
    audit.record(&format!(
        "Primary key columns: destination {}, source {}; status column {}; {} mapping pairs",
        import.primary_key_dest,
        import.primary_key_src,
        import.status_col,
        import.mappings.len()
    ));

    let staging = store.get_all_rows(&config.tables.lead_stage)?;
    let destination = store.get_all_rows(&config.tables.working_leads)?;

    let report = engine::reconcile(&staging, &destination, &import);

    let status_col = import.status_col.index();
    for row in &report.rows {
        let (status, marker) = match row.outcome {
            ImportOutcome::Imported => ("Imported", CellMarker::Success),
            ImportOutcome::Duplicate => ("Duplicate", CellMarker::Warning),
            ImportOutcome::Skipped => continue,
        };
        store.set_cell(
            &config.tables.lead_stage,
            row.row,
            status_col,
            CellValue::text(status),
        )?;
        mark_cell(store, &config.tables.lead_stage, row.row, status_col, marker);
    }

    for record in &report.appended {
        store.append_row(&config.tables.working_leads, record.clone())?;
    }

    audit.record_forced(&format!(
        "Lead Import Complete. Imported: {}, Duplicates: {}",
        report.imported, report.duplicates
    ));
    Ok(())
}

fn apply_writes(store: &dyn TableStore, table: &str, writes: &[CellWrite]) -> Result<()> {
    for write in writes {
        store.set_cell(table, write.row, write.col, write.value.clone())?;
        if let Some(marker) = write.marker {
            mark_cell(store, table, write.row, write.col, marker);
        }
    }
    Ok(())
}

fn mark_cell(store: &dyn TableStore, table: &str, row: usize, col: usize, marker: CellMarker) {
    if let Err(e) = store.set_cell_marker(table, row, col, marker) {
        warn!("Failed to set cell marker on {} ({},{}): {}", table, row, col, e);
    }
}
