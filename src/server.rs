use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::{
    config::Config,
    dispatch::{self, Action},
    error::{CrmBotError, Result},
    notify::Notifier,
    storage::SqliteTableStore,
};

struct AppState {
    store: Mutex<SqliteTableStore>,
    config: Config,
    notifier: Option<Notifier>,
}

#[derive(Debug, Deserialize)]
struct ActionRequest {
    action: String,
}

/// Run the HTTP dispatcher until shutdown. One endpoint, one verb: a JSON
/// body names the action, the plain-text reply is "Success" or
/// "Error: <message>". Action handling is serialized behind the store
/// mutex; the host contract assumes invocations do not overlap.
pub async fn serve(config: Config) -> Result<()> {
    let store = SqliteTableStore::new(&config.database.path)?;
    let notifier = Notifier::new(&config);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = Arc::new(AppState {
        store: Mutex::new(store),
        config,
        notifier,
    });

    let app = Router::new()
        .route("/", post(handle_action))
        .route("/health", get(health_check))
        .with_state(state);

    info!("CRM workflow bot listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CrmBotError::Transport(e.to_string()))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| CrmBotError::Transport(e.to_string()))?;

    Ok(())
}

async fn health_check() -> &'static str {
    "ok"
}

async fn handle_action(State(state): State<Arc<AppState>>, body: String) -> String {
    info!("Incoming request: {}", body);

    let request: ActionRequest = match serde_json::from_str(&body) {
        Ok(req) => req,
        Err(e) => return format!("Error: {}", e),
    };

    let action = Action::parse(&request.action);
    let today = Local::now().date_naive();

    // digests are rendered under the lock, delivered after it is released
    let outcome = {
        let store = state.store.lock().await;
        dispatch::run_action(&*store, &state.config, &action, today)
    };

    if let Some(notifier) = &state.notifier {
        for digest in &outcome.digests {
            notifier.send_digest(digest).await;
        }
    }

    outcome.response
}
