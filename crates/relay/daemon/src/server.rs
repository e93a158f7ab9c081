//! Server setup and lifecycle management

use std::sync::Arc;
use std::time::Duration;

use relay_service::RelayService;
use relay_vault::{HttpVault, InMemoryVault, VaultAuthority};
use tokio::net::TcpListener;

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::config::{DaemonConfig, VaultConfig};
use crate::error::{DaemonError, DaemonResult};

/// relayd server
pub struct Server {
    config: DaemonConfig,
    service: Arc<RelayService>,
    vault_name: String,
}

impl Server {
    /// Build the vault backend and relay service from configuration
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let vault = build_vault(&config)?;
        let vault_name = vault.name().to_string();
        let service = RelayService::build(
            &config.policy,
            vault,
            config.relay.to_relay_config(),
        )?;

        Ok(Self {
            config,
            service: Arc::new(service),
            vault_name,
        })
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;
        let state = AppState::new(self.service.clone(), self.vault_name.clone());
        let app = create_router(state, self.config.server.enable_cors);

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("relayd listening on {}", addr);
        tracing::info!(vault = %self.vault_name, module = %self.config.relay.module, "relay ready");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("relayd shutting down");
        Ok(())
    }
}

fn build_vault(config: &DaemonConfig) -> DaemonResult<Arc<dyn VaultAuthority>> {
    match &config.vault {
        VaultConfig::Memory { call_log_capacity } => {
            tracing::warn!("using in-memory vault; executions are not persisted");
            let vault = InMemoryVault::with_module(config.relay.module)
                .with_call_log_capacity(*call_log_capacity);
            Ok(Arc::new(vault))
        }
        VaultConfig::Http { url, timeout_ms } => {
            let vault = HttpVault::new(url.clone(), Duration::from_millis(*timeout_ms))
                .map_err(|e| DaemonError::Vault(e.to_string()))?;
            Ok(Arc::new(vault))
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
