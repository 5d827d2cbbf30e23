use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub tables: TableNames,
    pub lead_schema: LeadSchemaConfig,
    pub telegram: Option<TelegramConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

/// Names of the backing tables. Defaults mirror the production workbook.
#[derive(Debug, Deserialize, Clone)]
pub struct TableNames {
    pub tracked_leads: String,
    pub working_leads: String,
    pub lead_stage: String,
    pub setup: String,
    pub logs: String,
}

/// Column letters for the tracked-lead table fields.
#[derive(Debug, Deserialize, Clone)]
pub struct LeadSchemaConfig {
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub renewal_date: String,
    pub follow_up_date: String,
    pub notified: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub notifications_enabled: bool,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::Environment::with_prefix("CRMBOT"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
