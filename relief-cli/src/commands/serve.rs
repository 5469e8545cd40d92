//! Serve command - run the REST server until Ctrl-C.

use std::sync::Arc;

use console::style;
use tracing::{error, info};

use relief_core::config::ConfigHandle;
use relief_core::error::{ReliefError, ReliefResult};
use relief_services::registry::ServiceRegistry;

pub async fn run(config: ConfigHandle, host: Option<String>, port: Option<u16>) -> ReliefResult<()> {
    let mut cfg = config.snapshot().await;
    if let Some(h) = host {
        cfg.server.host = h;
    }
    if let Some(p) = port {
        cfg.server.port = p;
    }
    cfg.validate()?;
    let addr = cfg.bind_address();

    let registry = Arc::new(ServiceRegistry::from_config(cfg)?);
    registry.init_all().await?;
    let events = registry.spawn_event_logger();

    let handle = match relief_server::start(registry.clone(), &addr).await {
        Ok(h) => h,
        Err(e) => {
            error!("server failed to start: {e}");
            events.stop().await;
            registry.shutdown_all().await?;
            return Err(e);
        }
    };

    println!(
        "{} relief server listening on {}",
        style("OK").green().bold(),
        style(handle.base_url()).cyan()
    );
    println!("  Press Ctrl-C to stop.");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| ReliefError::Internal(format!("failed to listen for Ctrl-C: {e}")))?;

    info!("shutdown requested");
    println!("\nShutting down...");
    handle.shutdown().await?;
    let tally = events.stop().await;
    info!("logged {} events: {tally:?}", tally.values().sum::<u64>());
    registry.shutdown_all().await?;
    println!("{} server stopped", style("OK").green().bold());
    Ok(())
}
