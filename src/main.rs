/// Friend Chat Server - demo friend list and chat backend
///
/// Main server entry point. Handles:
/// - Command-line argument parsing
/// - Session slot and store initialization
/// - HTTP and WebSocket server startup
use actix_web::web;
use anyhow::Context;
use friend_chat_server::chat_view::ChatRuntime;
use friend_chat_server::config::Config;
use friend_chat_server::scheduler::{SystemClock, TokioScheduler};
use friend_chat_server::server;
use friend_chat_server::session::SessionStore;
use friend_chat_server::ChatStore;
use std::fs;
use std::process;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let config = Config::from_args();

    log::info!("Starting Friend Chat Server");
    log::info!("Session slot: {:?}", config.session_db);
    log::info!("Port: {}", config.port);
    log::info!(
        "Simulated latency: {}",
        if config.no_latency { "off" } else { "on" }
    );

    // Write PID file if specified
    if let Some(pidfile) = &config.pidfile {
        let pid = process::id().to_string();
        fs::write(pidfile, pid)
            .with_context(|| format!("Failed to write PID file {:?}", pidfile))?;
        log::info!("PID file written to: {:?}", pidfile);
    }

    let session = SessionStore::new(&config.session_db)
        .with_context(|| format!("Failed to open session slot {:?}", config.session_db))?;
    let store = web::Data::new(ChatStore::new(
        session,
        config.latency(),
        Arc::new(SystemClock),
    ));

    log::info!("Store initialized");

    let runtime = web::Data::new(ChatRuntime::new(
        Arc::new(TokioScheduler),
        config.chat_settings(),
    ));

    // Start HTTP server
    let bind_addr = format!("127.0.0.1:{}", config.port);
    log::info!("Starting HTTP server on {}", bind_addr);

    let http_server = server::create_http_server(store, runtime, &bind_addr)
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    http_server.await?;
    Ok(())
}
