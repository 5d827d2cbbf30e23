use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "crm-bot")]
#[command(about = "CRM workflow automation over tabular lead records")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP action dispatcher
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run a single action by its wire name
    Run {
        /// Action name, e.g. checkAndNotifyRenewals
        action: String,
    },

    /// Initialize the database and seed the workbook tables
    Init,

    /// Show row counts per table
    Stats {
        /// Output format: table or json
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Clear the persisted log table (header stays)
    ClearLogs {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
