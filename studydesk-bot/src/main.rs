//! Studydesk Assistant Service
//!
//! Runs the assistant against a console transport: inbound messages are
//! read from stdin, outbound messages are printed. The status HTTP server
//! runs alongside on its own task.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studydesk_bot::{engine, routes, AppState, Config, ConsoleChannel, SqliteStore, UserId};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studydesk_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!(?config, "Loaded configuration");

    let store = SqliteStore::open(&config.db_path)?;
    tracing::info!(path = %config.db_path, "Opened database");

    let state = Arc::new(AppState::new(store, ConsoleChannel::new(), config.clone()));

    // Status server for uptime monitors
    let app = routes::create_router(Arc::clone(&state));
    let listener = TcpListener::bind(&config.http_addr).await?;
    tracing::info!("Status server listening on http://{}", config.http_addr);
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!(error = %err, "Status server stopped");
        }
    });

    // Console transport: one line per inbound event
    println!("Studydesk console transport");
    println!("  <user-id> <message>    deliver a text message");
    println!("  <user-id> < <file>     deliver a document upload");
    println!("Admin user id: {}", config.admin_id);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (id_part, rest) = match line.split_once(char::is_whitespace) {
            Some(parts) => parts,
            None => {
                eprintln!("usage: <user-id> <message>");
                continue;
            }
        };
        let user = match id_part.parse::<u64>() {
            Ok(id) => UserId(id),
            Err(_) => {
                eprintln!("user id must be a number, got {:?}", id_part);
                continue;
            }
        };

        let rest = rest.trim();
        match rest.strip_prefix('<') {
            Some(path) => {
                let path = path.trim();
                match tokio::fs::read(path).await {
                    Ok(content) => engine::handle_document(&state, user, path, &content),
                    Err(err) => eprintln!("cannot read {}: {}", path, err),
                }
            }
            None => engine::handle_message(&state, user, rest).await,
        }
    }

    Ok(())
}
