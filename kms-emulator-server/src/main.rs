//! KMS emulator binary
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use anyhow::Result;
use kms_emulator_config::{EmulatorConfig, IamMode, LogFormat};
use kms_emulator_core::{InMemoryKeyStore, StoreOptions, TransitionPolicy};
use kms_emulator_logging::{init_console_logging, init_logging};
use kms_emulator_server::{
    router, AccessControl, HttpIamAuthorizer, KmsGrpcService, KmsService, SERVICE_NAME,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = EmulatorConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    match config.log_format {
        LogFormat::Json => init_logging(SERVICE_NAME, config.log_level())?,
        LogFormat::Console => init_console_logging(SERVICE_NAME, config.log_level())?,
    }

    info!(
        bind_addr = %config.bind_addr(),
        grpc_addr = %config.grpc_addr(),
        iam_mode = ?config.iam_mode,
        strict_transitions = config.strict_transitions,
        "Starting KMS emulator"
    );

    let transition_policy = if config.strict_transitions {
        TransitionPolicy::Strict
    } else {
        warn!("State transition validation disabled");
        TransitionPolicy::Permissive
    };
    let store = InMemoryKeyStore::with_options(StoreOptions { transition_policy });

    let access = match (config.iam_mode, config.iam_host.as_deref()) {
        (IamMode::Off, _) => AccessControl::disabled(),
        (mode, Some(host)) => {
            info!(iam_host = host, iam_mode = ?mode, "IAM authorization enabled");
            AccessControl::new(mode, Arc::new(HttpIamAuthorizer::new(host)?))
        }
        (mode, None) => {
            return Err(anyhow::anyhow!(
                "IAM mode {:?} requires KMS_EMULATOR_IAM_HOST",
                mode
            ))
        }
    };

    let service = Arc::new(KmsService::new(Arc::new(store), access));

    let http_listener = TcpListener::bind(config.bind_addr())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind_addr(), e))?;
    let grpc_listener = TcpListener::bind(config.grpc_addr())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.grpc_addr(), e))?;

    info!(
        http_addr = %http_listener.local_addr()?,
        grpc_addr = %grpc_listener.local_addr()?,
        "KMS emulator listening"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let http = axum::serve(http_listener, router(Arc::clone(&service)))
        .with_graceful_shutdown(stopped(shutdown_rx.clone()));
    let grpc = Server::builder()
        .add_service(KmsGrpcService::new(service).into_server())
        .serve_with_incoming_shutdown(TcpListenerStream::new(grpc_listener), stopped(shutdown_rx));

    tokio::try_join!(
        async {
            http.await
                .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))
        },
        async {
            grpc.await
                .map_err(|e| anyhow::anyhow!("gRPC server error: {}", e))
        },
    )?;

    info!("KMS emulator stopped");
    Ok(())
}

/// Resolves once shutdown has been requested
async fn stopped(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal (Ctrl+C) received");
        },
        _ = terminate => {
            info!("Shutdown signal (SIGTERM) received");
        },
    }
}
