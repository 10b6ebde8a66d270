// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! HTTP routing. Every endpoint is a `POST` taking and returning JSON; failures answer `500`
//! with a Rosetta error object.

use std::{future::Future, net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, Uri},
    routing::post,
};
use serde::de::DeserializeOwned;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{
    ApiError, ErrorKind, RosettaService,
    types::{
        AccountBalanceResponse, BlockResponse, ConstructionMetadataResponse, MempoolResponse,
        NetworkListResponse, NetworkOptionsResponse, NetworkStatusResponse,
        TransactionIdentifierResponse, TransactionResponse,
    },
};

type Service = State<Arc<RosettaService>>;

/// The request body as `T`. Bodies are parsed by hand so that malformed ones get a Rosetta
/// error instead of axum's plain text rejection.
fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ErrorKind::MalformedValue.with(e, true))
}

async fn network_list(
    State(service): Service,
    body: Bytes,
) -> Result<Json<NetworkListResponse>, ApiError> {
    Ok(Json(service.network_list(parse(&body)?).await?))
}

async fn network_status(
    State(service): Service,
    body: Bytes,
) -> Result<Json<NetworkStatusResponse>, ApiError> {
    Ok(Json(service.network_status(parse(&body)?).await?))
}

async fn network_options(
    State(service): Service,
    body: Bytes,
) -> Result<Json<NetworkOptionsResponse>, ApiError> {
    Ok(Json(service.network_options(parse(&body)?).await?))
}

async fn account_balance(
    State(service): Service,
    body: Bytes,
) -> Result<Json<AccountBalanceResponse>, ApiError> {
    Ok(Json(service.account_balance(parse(&body)?).await?))
}

async fn block(State(service): Service, body: Bytes) -> Result<Json<BlockResponse>, ApiError> {
    Ok(Json(service.block(parse(&body)?).await?))
}

async fn block_transaction(
    State(service): Service,
    body: Bytes,
) -> Result<Json<TransactionResponse>, ApiError> {
    Ok(Json(service.block_transaction(parse(&body)?).await?))
}

async fn mempool(State(service): Service, body: Bytes) -> Result<Json<MempoolResponse>, ApiError> {
    Ok(Json(service.mempool(parse(&body)?).await?))
}

async fn mempool_transaction(
    State(service): Service,
    body: Bytes,
) -> Result<Json<TransactionResponse>, ApiError> {
    Ok(Json(service.mempool_transaction(parse(&body)?).await?))
}

async fn construction_metadata(
    State(service): Service,
    body: Bytes,
) -> Result<Json<ConstructionMetadataResponse>, ApiError> {
    Ok(Json(service.construction_metadata(parse(&body)?).await?))
}

async fn construction_submit(
    State(service): Service,
    body: Bytes,
) -> Result<Json<TransactionIdentifierResponse>, ApiError> {
    Ok(Json(service.construction_submit(parse(&body)?).await?))
}

async fn construction_not_implemented(
    State(service): Service,
    uri: Uri,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    service
        .construction_not_implemented(uri.path(), parse(&body)?)
        .await?;
    Ok(StatusCode::OK)
}

pub fn router(service: Arc<RosettaService>, cors: bool) -> Router {
    let router = Router::new()
        .route("/network/list", post(network_list))
        .route("/network/status", post(network_status))
        .route("/network/options", post(network_options))
        .route("/account/balance", post(account_balance))
        .route("/block", post(block))
        .route("/block/transaction", post(block_transaction))
        .route("/mempool", post(mempool))
        .route("/mempool/transaction", post(mempool_transaction))
        .route("/construction/metadata", post(construction_metadata))
        .route("/construction/submit", post(construction_submit))
        .route("/construction/derive", post(construction_not_implemented))
        .route("/construction/preprocess", post(construction_not_implemented))
        .route("/construction/payloads", post(construction_not_implemented))
        .route("/construction/combine", post(construction_not_implemented))
        .route("/construction/parse", post(construction_not_implemented))
        .route("/construction/hash", post(construction_not_implemented))
        .layer(TraceLayer::new_for_http())
        .with_state(service);
    match cors {
        true => router.layer(CorsLayer::permissive()),
        false => router,
    }
}

/// Serves the Rosetta API on `listen` until `shutdown` completes.
pub async fn serve(
    service: Arc<RosettaService>,
    listen: SocketAddr,
    cors: bool,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("couldn't bind {listen}"))?;
    tracing::info!("Rosetta API listening on {}", listener.local_addr()?);
    axum::serve(listener, router(service, cors))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Rosetta API server failed")
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, header},
    };
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tower::ServiceExt as _;

    use super::*;
    use crate::{
        rosetta::{ServiceOptions, tests::service},
        test_utils::MockNode,
    };

    async fn call(router: Router, path: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn app(cors: bool) -> Router {
        let node = Arc::new(MockNode::with_chain(&[0, 1]));
        router(Arc::new(service(node, ServiceOptions::default())), cors)
    }

    #[tokio::test]
    async fn lists_the_network() {
        let (status, body) = call(app(false), "/network/list", "{}").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "network_identifiers": [{"blockchain": "Filecoin", "network": "calibrationnet"}]
            })
        );
    }

    #[tokio::test]
    async fn errors_are_rosetta_objects() {
        let (status, body) = call(app(false), "/network/status", "not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], 17);
        assert_eq!(body["retriable"], false);

        let (status, body) = call(app(false), "/network/status", "{}").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], 5);
    }

    #[tokio::test]
    async fn signing_endpoints_answer_not_implemented() {
        let request = json!({
            "network_identifier": {"blockchain": "Filecoin", "network": "calibrationnet"},
            "public_key": {"hex_bytes": "00", "curve_type": "secp256k1"}
        });
        let (status, body) = call(app(false), "/construction/derive", &request.to_string()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], 13);
        assert_eq!(body["details"]["error"], "/construction/derive");
    }

    #[tokio::test]
    async fn cors_is_optional() {
        let request = || {
            Request::post("/network/list")
                .header(header::ORIGIN, "https://example.com")
                .body(Body::from("{}"))
                .unwrap()
        };
        let response = app(true).oneshot(request()).await.unwrap();
        assert!(
            response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
        let response = app(false).oneshot(request()).await.unwrap();
        assert!(
            !response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }
}
