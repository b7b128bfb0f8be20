// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use ledger_auth_server::{
    api::router,
    config::AppConfig,
    logging::{init_logging, LogFormat},
    state::AppState,
    tls::load_rustls_config,
};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging(LogFormat::from_env());

    // Missing secrets fail startup; there is no fallback.
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialise application state");
            return ExitCode::FAILURE;
        }
    };
    let app = router(state);
    let addr = config.bind_addr;

    let served = match &config.tls {
        Some(tls) => {
            let rustls = match load_rustls_config(tls).await {
                Ok(rustls) => rustls,
                Err(e) => {
                    tracing::error!(error = %e, "failed to load TLS credentials");
                    return ExitCode::FAILURE;
                }
            };
            tracing::info!(%addr, "ledger auth server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, rustls)
                .serve(app.into_make_service())
                .await
        }
        None => {
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::error!(error = %e, %addr, "failed to bind listener");
                    return ExitCode::FAILURE;
                }
            };
            tracing::info!(%addr, "ledger auth server listening on http (docs at /docs)");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
        }
    };

    match served {
        Ok(()) => {
            tracing::info!("server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
