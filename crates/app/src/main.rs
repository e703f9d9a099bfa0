use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use server::{Mailer, MailerConfig};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() {
    let settings = settings::Settings::new().unwrap();
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "splitledger={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    if let Some(server) = settings.server {
        let mailer_config = settings.mailer.map(|mailer| MailerConfig {
            api_url: mailer.api_url,
            api_key: mailer.api_key,
            sender: mailer.sender,
        });
        let report = settings.report;

        tasks.spawn(async move {
            tracing::info!("Found server settings...");
            let db = parse_database(&server.database).await;
            let mailer = Arc::new(Mailer::new(mailer_config));

            if let Some(report) = report {
                match report.timezone.parse::<chrono_tz::Tz>() {
                    Ok(tz) => {
                        server::spawn_weekly_report(db.clone(), Arc::clone(&mailer), tz);
                    }
                    Err(err) => tracing::error!("Invalid report timezone: {err}"),
                }
            }

            let bind = server.bind.unwrap_or_else(|| String::from("127.0.0.1"));
            let listener = tokio::net::TcpListener::bind(format!("{bind}:{}", server.port))
                .await
                .expect("Failed to bind the server address");
            server::run_with_listener(db, mailer, listener)
                .await
                .expect("Server failed");
        });
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }
}

async fn parse_database(config: &settings::Database) -> sea_orm::DatabaseConnection {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url)
        .await
        .expect("Failed to connect to the database");

    Migrator::up(&database, None).await.unwrap();

    database
}
