use anyhow::Context;
use riskhub_server::telemetry::init_tracing;
use riskhub_server::{build_state, routes, ServerConfig, VERSION};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("reading configuration")?;
    init_tracing(config.log_format);

    let bind = config.bind;
    let backend = config.backend;
    let state = build_state(config).context("building collaborators")?;

    let (addr, server) = warp::serve(routes::routes(state))
        .try_bind_with_graceful_shutdown(bind, wait_for_shutdown_signal())
        .with_context(|| format!("binding {bind}"))?;
    info!(%addr, ?backend, version = VERSION, "riskhub server listening");
    server.await;
    info!("riskhub server stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "signal handlers unavailable, waiting for ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutdown signal received");
}
