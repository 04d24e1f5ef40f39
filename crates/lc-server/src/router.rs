use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use lc_chaincode::CreditContract;
use lc_store::Ledger;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handler::{self, AppState};

/// Build the axum router with all gateway endpoints.
pub fn build_router<L: Ledger + 'static>(
    contract: Arc<CreditContract<L>>,
    config: &ServerConfig,
) -> Router {
    let router = Router::new()
        .route(
            "/lc",
            post(handler::register_credit::<L>).get(handler::read_credit::<L>),
        )
        .route("/lc/tx", post(handler::transfer_credit::<L>))
        .route("/lc/verify", post(handler::verify_credit::<L>))
        .route("/lc/execute", post(handler::execute_credit::<L>))
        .route("/lc/history", get(handler::credit_history::<L>))
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .with_state(AppState::new(contract))
        .layer(TraceLayer::new_for_http());

    if config.allow_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
