// src/main.rs

use quiz_results::config::Config;
use quiz_results::db::{pool::DbPool, schema::SchemaScript};
use quiz_results::routes;
use quiz_results::services::notification::Notifier;
use quiz_results::state::AppState;
use quiz_results::validation::SubmissionPolicy;
use std::net::SocketAddr;
use tokio::signal;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from .env (if present) and the environment
    let config = Config::from_env()?;

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool, then apply the schema with retry
    let pool = DbPool::new(&config.database)?;
    if let Err(e) = pool
        .initialize(
            &SchemaScript::bundled(),
            config.database.init_retries,
            config.database.init_retry_delay,
        )
        .await
    {
        tracing::error!("Failed to start server: {}", e);
        return Err(e.into());
    }

    if !config.mail.enabled {
        tracing::info!("Result emails are disabled");
    }

    // Create AppState
    let state = AppState {
        pool: pool.clone(),
        notifier: Notifier::new(config.mail.clone()),
        policy: SubmissionPolicy {
            strict_scores: config.strict_score_check,
        },
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Quiz results service listening on {}", addr);

    // Start the server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.shutdown().await;
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("SIGINT received, closing server..."),
        _ = terminate => tracing::info!("SIGTERM received, closing server..."),
    }
}
