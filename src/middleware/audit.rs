// src/middleware/audit.rs

use axum::{
    body::{self, Body},
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::bearer_token,
    services::activity_service::{action_for, infer_activity, Actor},
};

// Mesmo teto do extrator Json do axum
const MAX_AUDITED_BODY: usize = 2 * 1024 * 1024;

/// Registra create/update/delete bem-sucedidos em `activity_log`.
/// A gravação roda em outra task: falha só aparece no log, nunca na resposta.
pub async fn audit_layer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(_) = action_for(request.method()) else {
        return next.run(request).await;
    };

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let actor = bearer_token(request.headers())
        .and_then(|token| state.auth_service.tokens().verify(token).ok())
        .map(|claims| Actor {
            user_id: Some(claims.sub),
            user_name: claims.actor_name(),
        })
        .unwrap_or_else(Actor::anonymous);

    let (parts, body) = request.into_parts();
    let bytes = match body::to_bytes(body, MAX_AUDITED_BODY).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return AppError::Validation("Corpo da requisição inválido ou grande demais".to_string())
                .into_response();
        }
    };

    let response = next
        .run(Request::from_parts(parts, Body::from(bytes.clone())))
        .await;

    if !response.status().is_success() {
        return response;
    }

    let snapshot: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    if let Some(entry) = infer_activity(&method, &path, &snapshot, &actor) {
        let activity = state.activity_service.clone();
        tokio::spawn(async move {
            if let Err(e) = activity.record(&entry).await {
                tracing::error!("Falha ao registrar auditoria ({}): {}", entry.description, e);
            }
        });
    }

    response
}
