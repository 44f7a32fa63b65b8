//! The `pressbox` binary.

use anyhow::Context as _;
use pressbox::cli::{Args, USAGE};
use pressbox::{routes, spawn_session_cleanup, AppContext, SESSION_CLEANUP_INTERVAL};
use pressbox_middleware::session::MemorySessionStore;
use pressbox_server::Server;
use pressbox_telemetry::init_logging;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = args.load_config().context("failed to load configuration")?;
    init_logging(&config.logging.to_log_config(&config.server.server_name))?;
    tracing::info!(
        http_addr = %config.server.http_addr,
        templates = %config.templates.dir.display(),
        assets = %config.assets.dir.display(),
        "starting pressbox"
    );

    let sessions = Arc::new(MemorySessionStore::new());
    let cleanup = spawn_session_cleanup(Arc::clone(&sessions), SESSION_CLEANUP_INTERVAL);

    let app = Arc::new(
        AppContext::from_config(config.clone(), sessions).context("failed to build templates")?,
    );
    let site = routes(&app).context("failed to register routes")?;

    let server = Server::builder()
        .http_addr(config.socket_addr()?)
        .max_body_bytes(config.server.max_body_bytes)
        .shutdown_timeout(config.server.shutdown_timeout())
        .build(site);
    let result = server.run().await;

    cleanup.abort();
    result?;
    Ok(())
}
