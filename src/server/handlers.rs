//! Secrets and vault lifecycle handlers

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::errors::{error_response, INVALID_REQUEST, MISSING_ID};
use super::AppState;
use crate::observability::metrics::{increment_vault_operations, set_vault_sealed};
use crate::vault::VaultError;

#[derive(Debug, Deserialize)]
pub struct CreateSecretRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSecretRequest {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnsealRequest {
    #[serde(default)]
    pub shares: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SecretResponse {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InitResponse {
    pub shares: Vec<String>,
    pub threshold: u8,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub initialized: bool,
}

/// Count the outcome of a vault operation
fn record<T>(operation: &str, result: &Result<T, VaultError>) {
    let outcome = if result.is_ok() { "ok" } else { "error" };
    increment_vault_operations(operation, outcome);
}

async fn refresh_seal_gauge(state: &AppState) {
    set_vault_sealed(state.store.status().await.sealed);
}

/// `POST /secrets` - key from the body, falling back to `?id=`
pub async fn create_secret(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
    payload: Result<Json<CreateSecretRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, INVALID_REQUEST);
    };
    if req.value.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, INVALID_REQUEST);
    }
    let Some(key) = req
        .key
        .filter(|k| !k.is_empty())
        .or(query.id.filter(|k| !k.is_empty()))
    else {
        return error_response(StatusCode::BAD_REQUEST, MISSING_ID);
    };

    let result = state.store.set(&key, &req.value).await;
    record("set", &result);
    match result {
        Ok(()) => {
            debug!("Stored secret {}", key);
            (
                StatusCode::CREATED,
                Json(SecretResponse {
                    key,
                    value: req.value,
                }),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// `GET /secrets`
pub async fn list_secrets(State(state): State<AppState>) -> Response {
    let result = state.store.list().await;
    record("list", &result);
    match result {
        Ok(keys) => Json(KeysResponse { keys }).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `GET /secrets/{id}`
pub async fn get_secret(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let result = state.store.get(&id).await;
    record("get", &result);
    match result {
        Ok(value) => Json(SecretResponse { key: id, value }).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `PUT /secrets/{id}`
pub async fn update_secret(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSecretRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, INVALID_REQUEST);
    };
    if req.value.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, INVALID_REQUEST);
    }

    let result = state.store.set(&id, &req.value).await;
    record("set", &result);
    match result {
        Ok(()) => Json(SecretResponse {
            key: id,
            value: req.value,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// `DELETE /secrets/{id}`
pub async fn delete_secret(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let result = state.store.delete(&id).await;
    record("delete", &result);
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// `POST /sys/init`
pub async fn init_vault(State(state): State<AppState>) -> Response {
    let result = state.store.init().await;
    record("init", &result);
    refresh_seal_gauge(&state).await;
    match result {
        Ok(shares) => {
            info!(
                "Vault initialized with {} shares; distribute them securely",
                shares.len()
            );
            Json(InitResponse {
                shares,
                threshold: state.store.threshold(),
            })
            .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// `POST /sys/seal`
pub async fn seal_vault(State(state): State<AppState>) -> Response {
    let result = state.store.seal().await;
    record("seal", &result);
    refresh_seal_gauge(&state).await;
    match result {
        Ok(()) => {
            info!("Vault sealed");
            Json(serde_json::json!({ "status": "sealed" })).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// `POST /sys/unseal`
pub async fn unseal_vault(
    State(state): State<AppState>,
    payload: Result<Json<UnsealRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, INVALID_REQUEST);
    };

    let result = state.store.unseal(&req.shares).await;
    record("unseal", &result);
    refresh_seal_gauge(&state).await;
    match result {
        Ok(()) => {
            info!("Vault unsealed");
            Json(serde_json::json!({ "status": "unsealed" })).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// `GET /sys/status`
pub async fn vault_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let status = state.store.status().await;
    Json(StatusResponse {
        status: status.as_str(),
        initialized: status.initialized,
    })
}
