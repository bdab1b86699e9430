use anyhow::Context as _;
use sea_orm::Database;
use tokio::signal;
use tracing::{info, warn};

use havenz_core::config::Config as _;
use havenz_core::tasks::BackgroundTasks;
use havenz_core::tracing::init_tracing;

use havenz_dashboard::config::DashboardConfig;
use havenz_dashboard::infra::email::AppEmailSender;
use havenz_dashboard::infra::identity::{HttpIdentityDirectory, JwtTokenVerifier};
use havenz_dashboard::router::build_router;
use havenz_dashboard::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = DashboardConfig::from_env().context("load dashboard config")?;

    let db = Database::connect(&config.database_url)
        .await
        .context("connect to database")?;

    let verifier = JwtTokenVerifier::open(&config)?;
    let directory = HttpIdentityDirectory::open(&config)?;
    let tasks = BackgroundTasks::new();

    let state = AppState {
        db,
        verifier: verifier.clone(),
        directory: directory.clone(),
        email: AppEmailSender::open(&config),
        tasks: tasks.clone(),
    };

    let router = build_router(state, &config)?;
    let addr = format!("0.0.0.0:{}", config.dashboard_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    info!("dashboard service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    // Setup mails and sign-in bookkeeping may still be in flight.
    let in_flight = tasks.in_flight();
    if !tasks.drain(config.shutdown_grace()).await {
        warn!(
            in_flight = tasks.in_flight(),
            started_with = in_flight,
            "background tasks still running at shutdown"
        );
    }

    verifier.close();
    directory.close();
    info!("dashboard service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
