use std::sync::Arc;

use lc_chaincode::CreditContract;
use lc_store::Ledger;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// Credit gateway server.
pub struct LcServer<L: Ledger> {
    config: ServerConfig,
    contract: Arc<CreditContract<L>>,
}

impl<L: Ledger + 'static> LcServer<L> {
    pub fn new(config: ServerConfig, contract: CreditContract<L>) -> Self {
        Self {
            config,
            contract: Arc::new(contract),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(Arc::clone(&self.contract), &self.config)
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("LC gateway listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
