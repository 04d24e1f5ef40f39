use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequest, Query, Request, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use axum::Form;
use lc_chaincode::{CreditContract, Function};
use lc_store::Ledger;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{ServerError, ServerResult};

/// Shared handle to the contract, cloned into every handler.
pub struct AppState<L: Ledger> {
    contract: Arc<CreditContract<L>>,
}

impl<L: Ledger> AppState<L> {
    pub fn new(contract: Arc<CreditContract<L>>) -> Self {
        Self { contract }
    }

    pub fn contract(&self) -> &CreditContract<L> {
        &self.contract
    }
}

impl<L: Ledger> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            contract: Arc::clone(&self.contract),
        }
    }
}

impl<L: Ledger + 'static> AppState<L> {
    /// Run one operation on the blocking pool; ledger access is synchronous.
    async fn run(&self, function: Function, args: Vec<String>) -> ServerResult<Vec<u8>> {
        let contract = Arc::clone(&self.contract);
        let payload = tokio::task::spawn_blocking(move || contract.invoke(function.name(), &args))
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))??;
        Ok(payload)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Fail,
}

/// Body of every gateway response; failures are reported here, not in the status code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub result: Outcome,
    pub message: Value,
}

impl GatewayResponse {
    pub fn success(message: impl Into<Value>) -> Json<Self> {
        Json(Self {
            result: Outcome::Success,
            message: message.into(),
        })
    }

    pub fn fail(message: impl Into<Value>) -> Json<Self> {
        Json(Self {
            result: Outcome::Fail,
            message: message.into(),
        })
    }
}

/// Request body accepted either URL-encoded or as JSON, chosen by content type.
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(value))
        }
    }
}

/// Form fields arrive as strings and JSON fields may be numbers; the contract
/// takes both as text.
fn text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub creditid: Value,
    pub owner: Value,
    pub flightid: Value,
    pub weight: Value,
    pub price: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransferRequest {
    pub creditid: Value,
    pub owner: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreditRequest {
    pub creditid: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreditQuery {
    pub creditid: String,
}

async fn submit<L: Ledger + 'static>(
    state: &AppState<L>,
    function: Function,
    args: Vec<String>,
) -> Json<GatewayResponse> {
    match state.run(function, args).await {
        Ok(_) => GatewayResponse::success("tx has submitted"),
        Err(e) => {
            warn!(%function, error = %e, "submission failed");
            GatewayResponse::fail("tx has NOT submitted")
        }
    }
}

async fn evaluate<L: Ledger + 'static>(
    state: &AppState<L>,
    function: Function,
    args: Vec<String>,
) -> Json<GatewayResponse> {
    let result = match state.run(function, args).await {
        Ok(payload) => serde_json::from_slice::<Value>(&payload).map_err(ServerError::from),
        Err(e) => Err(e),
    };
    match result {
        Ok(message) => GatewayResponse::success(message),
        Err(e) => {
            warn!(%function, error = %e, "evaluation failed");
            GatewayResponse::fail(format!("{function} has a error"))
        }
    }
}

/// `POST /lc`
pub async fn register_credit<L: Ledger + 'static>(
    State(state): State<AppState<L>>,
    Payload(req): Payload<RegisterRequest>,
) -> Json<GatewayResponse> {
    let args = vec![
        text(req.creditid),
        text(req.owner),
        text(req.flightid),
        text(req.weight),
        text(req.price),
    ];
    info!(credit_id = %args[0], "register credit request");
    submit(&state, Function::RegisterCredit, args).await
}

/// `GET /lc?creditid=`
pub async fn read_credit<L: Ledger + 'static>(
    State(state): State<AppState<L>>,
    Query(query): Query<CreditQuery>,
) -> Json<GatewayResponse> {
    evaluate(&state, Function::ReadCredit, vec![query.creditid]).await
}

/// `POST /lc/tx`
pub async fn transfer_credit<L: Ledger + 'static>(
    State(state): State<AppState<L>>,
    Payload(req): Payload<TransferRequest>,
) -> Json<GatewayResponse> {
    let args = vec![text(req.creditid), text(req.owner)];
    info!(credit_id = %args[0], "transfer credit request");
    submit(&state, Function::TransferCredit, args).await
}

/// `POST /lc/verify`
pub async fn verify_credit<L: Ledger + 'static>(
    State(state): State<AppState<L>>,
    Payload(req): Payload<CreditRequest>,
) -> Json<GatewayResponse> {
    submit(&state, Function::VerifyCredit, vec![text(req.creditid)]).await
}

/// `POST /lc/execute`
pub async fn execute_credit<L: Ledger + 'static>(
    State(state): State<AppState<L>>,
    Payload(req): Payload<CreditRequest>,
) -> Json<GatewayResponse> {
    submit(&state, Function::ExecuteCredit, vec![text(req.creditid)]).await
}

/// `GET /lc/history?creditid=`
pub async fn credit_history<L: Ledger + 'static>(
    State(state): State<AppState<L>>,
    Query(query): Query<CreditQuery>,
) -> Json<GatewayResponse> {
    evaluate(&state, Function::GetCreditHistory, vec![query.creditid]).await
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Info handler.
pub async fn info_handler() -> Json<Value> {
    let functions: Vec<&str> = Function::ALL.iter().map(|f| f.name()).collect();
    Json(json!({
        "name": "lc-server",
        "version": env!("CARGO_PKG_VERSION"),
        "functions": functions,
    }))
}
