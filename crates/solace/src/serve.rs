// SPDX-FileCopyrightText: 2026 Solace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `solace serve` command implementation.
//!
//! Opens SQLite storage, connects the HTTP classifier and the token verifier,
//! optionally installs the Prometheus recorder, and runs the gateway until
//! SIGINT or SIGTERM.

use std::sync::Arc;

use solace_auth::HmacTokenAuth;
use solace_classifier::HttpClassifier;
use solace_config::model::SolaceConfig;
use solace_core::{SolaceError, StorageAdapter};
use solace_escalation::{StaffDesk, SupportService};
use solace_gateway::{GatewayState, HealthState, ServerConfig, start_server};
use solace_prometheus::PrometheusAdapter;
use solace_storage::SqliteStorage;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs the `solace serve` command.
pub async fn run_serve(config: SolaceConfig) -> Result<(), SolaceError> {
    init_tracing(&config.service.log_level);

    info!(name = %config.service.name, "starting solace serve");

    if !config.gateway.enabled {
        return Err(SolaceError::Config(
            "gateway.enabled is false; nothing to serve".into(),
        ));
    }

    let render = if config.prometheus.enabled {
        let adapter = PrometheusAdapter::new()?;
        let render: Arc<dyn Fn() -> String + Send + Sync> = Arc::new(move || adapter.render());
        Some(render)
    } else {
        None
    };

    let storage = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage)
    };
    info!(path = %config.storage.database_path, "storage initialized");

    let classifier = Arc::new(HttpClassifier::new(&config.classifier)?);
    let auth = Arc::new(HmacTokenAuth::from_config(&config.auth)?);

    let support = SupportService::from_config(storage.clone(), classifier, &config.escalation)?;
    let staff = StaffDesk::new(storage.clone());
    info!(
        threshold = %support.policy().threshold(),
        history_window = config.escalation.history_window,
        "escalation pipeline ready"
    );

    let state = GatewayState {
        support,
        staff,
        auth,
        storage: storage.clone(),
        health: HealthState::new(render),
    };

    let shutdown = install_signal_handler();
    let served = start_server(&ServerConfig::from(&config.gateway), state, shutdown).await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "storage close failed");
    }
    info!("solace serve stopped");
    served
}

/// Returns a token cancelled on SIGINT or SIGTERM.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => info!("received SIGINT, shutting down"),
                        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler, waiting on SIGINT only");
                    let _ = tokio::signal::ctrl_c().await;
                    info!("received SIGINT, shutting down");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            info!("received Ctrl+C, shutting down");
        }

        trigger.cancel();
    });

    token
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("solace={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
