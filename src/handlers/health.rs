// src/handlers/health.rs

use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

// GET /health
#[utoipa::path(
    get,
    path = "/health",
    tag = "Infra",
    responses((status = 200, description = "Servidor no ar"))
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "CRM API rodando",
        "timestamp": Utc::now(),
    }))
}

// Qualquer rota não mapeada
pub async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Rota não encontrada" })),
    )
}
