use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "alcancia={level},server={level},ledger={level},assistant={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;
    let ledger = ledger::Ledger::builder().database(db).build();

    let assistant = match &settings.assistant {
        Some(cfg) => {
            let mut config = assistant::AssistantConfig {
                api_key: cfg.api_key.clone(),
                ..Default::default()
            };
            if let Some(api_url) = &cfg.api_url {
                config.api_url = api_url.clone();
            }
            if let Some(model) = &cfg.model {
                config.model = model.clone();
            }
            match assistant::CompletionClient::new(config) {
                Ok(client) => Some(Arc::new(client)),
                Err(err) => {
                    tracing::error!("failed to initialize assistant client: {err}");
                    None
                }
            }
        }
        None => {
            tracing::info!("no assistant settings; chat endpoint disabled");
            None
        }
    };

    let state = server::ServerState {
        ledger: Arc::new(ledger),
        keys: server::AuthKeys::new(
            settings.server.jwt_secret.clone(),
            settings.server.jwt_admin_secret.clone(),
        ),
        assistant,
        mailer: server::Mailer::new(settings.server.frontend_url.clone()),
    };

    let bind = settings.server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(state, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
