mod audit;
mod cli;
mod config;
mod dispatch;
mod engine;
mod error;
mod notify;
mod schema;
mod server;
mod settings;
mod storage;
mod utils;

use chrono::Local;
use clap::Parser;
use cli::{Cli, Commands};
use colored::*;
use config::Config;
use storage::{Record, SqliteTableStore, TableStore};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("crm_bot=debug,crm_workflow_bot=debug,info")
        .init();

    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Serve { port } => {
            info!("Starting HTTP action dispatcher...");
            serve(config, port).await
        }

        Commands::Run { action } => run_single_action(&config, &action).await,

        Commands::Init => {
            info!("Initializing...");
            initialize(&config)
        }

        Commands::Stats { format } => show_stats(&config, &format),

        Commands::ClearLogs { yes } => clear_logs(&config, yes),
    };

    if let Err(e) = result {
        error!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

async fn serve(mut config: Config, port: Option<u16>) -> error::Result<()> {
    if let Some(p) = port {
        config.server.port = p;
    }
    server::serve(config).await
}

async fn run_single_action(config: &Config, raw_action: &str) -> error::Result<()> {
    let action = dispatch::Action::parse(raw_action);
    println!("{}", format!("Running action: {}", action.name()).cyan());

    let store = SqliteTableStore::new(&config.database.path)?;
    let outcome = dispatch::run_action(&store, config, &action, Local::now().date_naive());

    if let Some(notifier) = notify::Notifier::new(config) {
        for digest in &outcome.digests {
            notifier.send_digest(digest).await;
        }
    } else if !outcome.digests.is_empty() {
        println!(
            "{}",
            "Telegram notifications disabled; rendered digests:".yellow()
        );
        for digest in &outcome.digests {
            println!("\n--- {} ---\n{}", digest.subject, digest.body);
        }
    }

    if outcome.is_success() {
        println!("{}", outcome.response.green());
        Ok(())
    } else {
        println!("{}", outcome.response.red());
        std::process::exit(1);
    }
}

fn initialize(config: &Config) -> error::Result<()> {
    println!("{}", "Initializing CRM workflow bot...".green());
    let store = SqliteTableStore::new(&config.database.path)?;

    seed_header(
        &store,
        &config.tables.tracked_leads,
        &[
            "First Name",
            "Last Name",
            "Contact Number",
            "Notes",
            "Renewal Date",
            "Follow Up Date",
            "Notified",
        ],
    )?;
    seed_header(
        &store,
        &config.tables.working_leads,
        &["Lead Name", "Company", "Lead ID", "Email", "Status"],
    )?;
    seed_header(
        &store,
        &config.tables.lead_stage,
        &["Lead ID", "Lead Name", "Company", "Email"],
    )?;
    seed_header(&store, &config.tables.logs, &["Timestamp", "Message"])?;

    if store.get_all_rows(&config.tables.setup).is_err() {
        // attribute rows in columns A/B; import key pair and mapping pairs
        // in columns C/D, key pair on the second data row
        let rows = [
            Record::from_texts(&["Attribute", "Value", "Import Destination", "Import Source"]),
            Record::from_texts(&["LogLevel", "Minimal", "", ""]),
            Record::from_texts(&["LeadImportStatusColumn", "H", "C", "A"]),
            Record::from_texts(&["RenewalRecipients", "", "C", "A"]),
            Record::from_texts(&["MonthlyLeadsRecipients", "", "A", "B"]),
            Record::from_texts(&["", "", "B", "C"]),
            Record::from_texts(&["", "", "D", "D"]),
        ];
        for row in rows {
            store.append_row(&config.tables.setup, row)?;
        }
        println!("  {} {}", "✓ Seeded".green(), config.tables.setup);
    } else {
        println!("  {} {}", "· Exists".dimmed(), config.tables.setup);
    }

    println!("\n{}", "Configuration:".cyan());
    println!("  Database:       {}", config.database.path);
    println!(
        "  Server:         {}:{}",
        config.server.host, config.server.port
    );
    println!(
        "  Notifications:  {}",
        if config.telegram.is_some() {
            "telegram"
        } else {
            "disabled"
        }
    );

    println!("\n{}", "Ready to use! Try running:".cyan());
    println!(
        "  {} to start the HTTP dispatcher",
        "crm-bot serve".yellow()
    );
    println!(
        "  {} to run one action",
        "crm-bot run updateRenewalReminderDates".yellow()
    );
    Ok(())
}

fn seed_header(store: &SqliteTableStore, table: &str, header: &[&str]) -> error::Result<()> {
    if store.get_all_rows(table).is_err() {
        store.append_row(table, Record::from_texts(header))?;
        println!("  {} {}", "✓ Seeded".green(), table);
    } else {
        println!("  {} {}", "· Exists".dimmed(), table);
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct TableStats {
    table: String,
    data_rows: usize,
}

fn show_stats(config: &Config, format: &str) -> error::Result<()> {
    let store = SqliteTableStore::new(&config.database.path)?;

    let names = [
        &config.tables.tracked_leads,
        &config.tables.working_leads,
        &config.tables.lead_stage,
        &config.tables.setup,
        &config.tables.logs,
    ];

    let stats: Vec<TableStats> = names
        .iter()
        .map(|name| TableStats {
            table: name.to_string(),
            data_rows: store
                .get_all_rows(name)
                .map(|t| t.data_row_count())
                .unwrap_or(0),
        })
        .collect();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "=== CRM Workflow Bot Statistics ===".cyan().bold());
    utils::print_table_border(40);
    utils::print_table_row(&["Table", "Data Rows"], &[24, 12]);
    utils::print_table_border(40);
    for stat in &stats {
        utils::print_table_row(&[&stat.table, &stat.data_rows.to_string()], &[24, 12]);
    }
    utils::print_table_border(40);

    Ok(())
}

fn clear_logs(config: &Config, yes: bool) -> error::Result<()> {
    if !yes && !utils::confirm_action("Clear all persisted log entries?") {
        println!("Cancelled");
        return Ok(());
    }

    let store = SqliteTableStore::new(&config.database.path)?;
    let log = audit::AuditLog::new(&store, &config.tables.logs, settings::LogLevel::Minimal);
    log.clear()?;
    println!("{}", "✓ Log entries cleared (header kept)".green());
    Ok(())
}
