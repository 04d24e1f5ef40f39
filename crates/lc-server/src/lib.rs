//! HTTP gateway for the luggage credit ledger.
//!
//! Exposes the credit operations as the `/lc` REST routes. Every response is
//! HTTP 200 with a `{"result": "success" | "fail", "message": ...}` body.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{GatewayResponse, Outcome};
pub use server::LcServer;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use axum::Router;
    use lc_chaincode::{CreditContract, LifecyclePolicy};
    use lc_store::InMemoryLedger;
    use serde_json::Value;
    use tower::util::ServiceExt;

    use super::*;

    fn app() -> Router {
        let contract = CreditContract::new(InMemoryLedger::new(), LifecyclePolicy::default());
        router::build_router(Arc::new(contract), &ServerConfig::default())
    }

    async fn send(app: &Router, request: Request<Body>) -> GatewayResponse {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), 200);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn register(app: &Router) {
        let res = send(
            app,
            form(
                "/lc",
                "creditid=C1&owner=alice&flightid=FL100&weight=20&price=500",
            ),
        )
        .await;
        assert_eq!(res.result, Outcome::Success);
        assert_eq!(res.message, "tx has submitted");
    }

    #[tokio::test]
    async fn health_endpoint() {
        let response = app().oneshot(get("/v1/health")).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn info_endpoint() {
        let response = app().oneshot(get("/v1/info")).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn register_then_read() {
        let app = app();
        register(&app).await;

        let res = send(&app, get("/lc?creditid=C1")).await;
        assert_eq!(res.result, Outcome::Success);
        assert_eq!(res.message["owner"], "alice");
        assert_eq!(res.message["Status"], "registered");
        assert_eq!(res.message["weight"], 20);
    }

    #[tokio::test]
    async fn json_bodies_are_accepted() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/lc")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"creditid":"C2","owner":"bob","flightid":"KE017","weight":15,"price":"300"}"#,
            ))
            .unwrap();
        let res = send(&app, request).await;
        assert_eq!(res.result, Outcome::Success);

        let res = send(&app, get("/lc?creditid=C2")).await;
        assert_eq!(res.message["price"], 300);
    }

    #[tokio::test]
    async fn duplicate_registration_fails() {
        let app = app();
        register(&app).await;
        let res = send(
            &app,
            form("/lc", "creditid=C1&owner=eve&flightid=X&weight=1&price=1"),
        )
        .await;
        assert_eq!(res.result, Outcome::Fail);
        assert_eq!(res.message, "tx has NOT submitted");
    }

    #[tokio::test]
    async fn bad_weight_fails_submission() {
        let res = send(
            &app(),
            form("/lc", "creditid=C1&owner=a&flightid=F&weight=heavy&price=1"),
        )
        .await;
        assert_eq!(res.result, Outcome::Fail);
    }

    #[tokio::test]
    async fn unknown_credit_read_fails() {
        let res = send(&app(), get("/lc?creditid=ghost")).await;
        assert_eq!(res.result, Outcome::Fail);
        assert_eq!(res.message, "ReadCredit has a error");
    }

    #[tokio::test]
    async fn full_lifecycle_history() {
        let app = app();
        register(&app).await;
        for (uri, body) in [
            ("/lc/tx", "creditid=C1&owner=bob"),
            ("/lc/verify", "creditid=C1"),
            ("/lc/execute", "creditid=C1"),
        ] {
            let res = send(&app, form(uri, body)).await;
            assert_eq!(res.result, Outcome::Success, "{uri}");
        }

        let res = send(&app, get("/lc/history?creditid=C1")).await;
        assert_eq!(res.result, Outcome::Success);
        let history = res.message.as_array().unwrap();
        let statuses: Vec<&Value> = history.iter().map(|e| &e["record"]["Status"]).collect();
        assert_eq!(statuses, ["registered", "transfered", "verified", "excuted"]);
        assert_eq!(history[3]["record"]["owner"], "bob");
    }

    #[tokio::test]
    async fn history_of_unknown_credit_is_empty() {
        let res = send(&app(), get("/lc/history?creditid=nobody")).await;
        assert_eq!(res.result, Outcome::Success);
        assert_eq!(res.message, Value::Array(vec![]));
    }
}
