//! Testes HTTP do router. Nenhum caminho aqui chega ao banco:
//! o pool é preguiçoso e as requisições param antes (auth, validação, roteamento).

mod common;

use axum::http::StatusCode;
use crm_backend::models::auth::UserRole;
use serde_json::json;
use tower::ServiceExt;

use common::{body_json, get_request, json_request, lazy_state, token_for};

#[tokio::test]
async fn test_health_check() {
    let app = crm_backend::app(lazy_state());

    let response = app.oneshot(get_request("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let app = crm_backend::app(lazy_state());

    let response = app.oneshot(get_request("/api/nada", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Rota não encontrada");
}

#[tokio::test]
async fn test_protected_route_without_token_is_unauthorized() {
    let app = crm_backend::app(lazy_state());

    let response = app.oneshot(get_request("/api/leads", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Token de autenticação não fornecido");
}

#[tokio::test]
async fn test_protected_route_with_bad_token_is_unauthorized() {
    let app = crm_backend::app(lazy_state());

    let response = app
        .oneshot(get_request("/api/dashboard/stats", Some("nao.e.jwt")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Token inválido ou expirado");
}

#[tokio::test]
async fn test_activity_log_is_admin_only() {
    let app = crm_backend::app(lazy_state());
    let token = token_for(UserRole::User);

    let response = app
        .oneshot(get_request("/api/activity", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_lead_intake_requires_fields() {
    let app = crm_backend::app(lazy_state());

    let response = app
        .oneshot(json_request("POST", "/api/leads", None, json!({ "name": "Ana" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        "Campos obrigatórios: name, email, phone, score, classification"
    );
}

#[tokio::test]
async fn test_lead_intake_rejects_bad_email_and_score() {
    let app = crm_backend::app(lazy_state());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/leads",
            None,
            json!({
                "name": "Ana",
                "email": "ana-sem-arroba",
                "phone": "11999990000",
                "score": 90,
                "classification": "Quente"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["details"]["email"][0], "O e-mail fornecido é inválido.");
    assert_eq!(body["details"]["score"][0], "O score deve estar entre 0 e 70.");
}

#[tokio::test]
async fn test_lead_intake_rejects_unknown_classification() {
    let app = crm_backend::app(lazy_state());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/leads",
            None,
            json!({ "name": "Ana", "classification": "Fervendo" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_lead_update_without_known_fields_is_rejected() {
    let app = crm_backend::app(lazy_state());
    let token = token_for(UserRole::User);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/leads/1",
            Some(&token),
            json!({ "bogusField": 1 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Nenhum campo válido para atualizar");
}

#[tokio::test]
async fn test_non_numeric_id_is_a_bad_request() {
    let app = crm_backend::app(lazy_state());
    let token = token_for(UserRole::User);

    let response = app
        .oneshot(get_request("/api/leads/abc", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_export_type_is_rejected() {
    let app = crm_backend::app(lazy_state());
    let token = token_for(UserRole::User);

    let response = app
        .oneshot(get_request("/api/leads/export/cpfs", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Tipo de exportação inválido");
}

#[tokio::test]
async fn test_contract_requires_lead_and_start_date() {
    let app = crm_backend::app(lazy_state());
    let token = token_for(UserRole::User);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/contracts",
            Some(&token),
            json!({ "leadId": 1, "contractValue": 150000 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Campos obrigatórios: leadId, startDate");
}

#[tokio::test]
async fn test_renewal_window_must_not_be_negative() {
    let app = crm_backend::app(lazy_state());
    let token = token_for(UserRole::User);

    let response = app
        .oneshot(get_request("/api/contracts/renewals?days=-5", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_validates_password_length() {
    let app = crm_backend::app(lazy_state());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "name": "Ana", "email": "ana@x.com", "password": "123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["details"]["password"].is_array());
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = crm_backend::app(lazy_state());

    let response = app
        .oneshot(get_request("/api-docs/openapi.json", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/api/contracts/renewals"].is_object());
}
