//! Testes contra PostgreSQL real. Cada teste recebe um banco novo com as migrações aplicadas.
//! Rodar com: DATABASE_URL=postgres://... cargo test -- --ignored

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use chrono::{NaiveDate, TimeDelta, Utc};
use crm_backend::{
    config::AppState,
    models::{
        activity::{ActivityAction, ActivityEntity},
        auth::UserRole,
        contract::{ContractDetail, CreateContractPayload, RenewalQuery, UpdateContractPayload},
        lead::{CreateLeadPayload, ExportKind, Lead, LeadClassification, LeadStatus, UpdateLeadPayload},
    },
};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

use common::{
    body_json, json_request, state_with_failing_integrations, state_with_pool, token_for,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn lead_payload(name: &str, instagram: Option<&str>, ip: Option<&str>) -> CreateLeadPayload {
    CreateLeadPayload {
        name: Some(name.to_string()),
        email: Some(format!("{}@teste.com", name.to_lowercase())),
        phone: Some("11999990000".to_string()),
        instagram: instagram.map(str::to_string),
        score: Some(42),
        classification: Some(LeadClassification::Morno),
        ip_address: ip.map(str::to_string),
        ..Default::default()
    }
}

async fn seed_lead(state: &AppState, name: &str) -> Lead {
    state
        .lead_service
        .create(lead_payload(name, None, None), Some("Seed".to_string()))
        .await
        .unwrap()
}

async fn seed_contract(state: &AppState, lead_id: i64, start: NaiveDate, months: i32) -> ContractDetail {
    let payload = CreateContractPayload {
        lead_id: Some(lead_id),
        contract_value: Some(100_000),
        contract_duration: Some(months),
        start_date: Some(start),
        ..Default::default()
    };
    state.contract_service.create(payload, "Seed").await.unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn lead_without_ip_has_no_location(pool: PgPool) {
    let state = state_with_pool(pool);

    let anonymous = state
        .lead_service
        .create(lead_payload("Ana", None, None), None)
        .await
        .unwrap();
    assert_eq!(anonymous.location_city, None);
    assert_eq!(anonymous.status, LeadStatus::Novo);
    assert_eq!(anonymous.created_by, None);

    let located = state
        .lead_service
        .create(lead_payload("Bia", None, Some("177.10.20.30")), None)
        .await
        .unwrap();
    assert_eq!(located.location_city.as_deref(), Some("Campinas"));
    assert_eq!(located.location_country.as_deref(), Some("Brasil"));

    let garbage_ip = state
        .lead_service
        .create(lead_payload("Caio", None, Some("não-é-ip")), None)
        .await
        .unwrap();
    assert_eq!(garbage_ip.location_city, None);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn geolocation_failure_keeps_the_lead(pool: PgPool) {
    let state = state_with_failing_integrations(pool);

    let lead = state
        .lead_service
        .create(lead_payload("Ana", None, Some("177.10.20.30")), None)
        .await
        .unwrap();

    assert_eq!(lead.ip_address.as_deref(), Some("177.10.20.30"));
    assert_eq!(lead.location_city, None);
    assert_eq!(lead.location_state, None);
    assert_eq!(lead.location_latitude, None);
    assert_eq!(state.lead_service.get(lead.id).await.unwrap().location_city, None);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn extraction_failure_falls_back_to_explicit_terms(pool: PgPool) {
    let state = state_with_failing_integrations(pool);
    let lead = seed_lead(&state, "Ana").await;

    let payload = CreateContractPayload {
        lead_id: Some(lead.id),
        contract_value: Some(90_000),
        contract_duration: Some(6),
        start_date: Some(date(2024, 2, 1)),
        notes: Some("Gestão de tráfego por seis meses".to_string()),
        ..Default::default()
    };
    let detail = state.contract_service.create(payload, "Maria").await.unwrap();

    assert_eq!(detail.contract.contract_value, 90_000);
    assert_eq!(detail.contract.contract_duration, 6);
    assert!(!detail.contract.processed_by_ai);
    assert_eq!(detail.contract.ai_extracted_services, None);
    assert!(detail.extracted_services.is_empty());
    assert!(state.contract_service.service_stats().await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn extraction_failure_without_terms_is_rejected(pool: PgPool) {
    let state = state_with_failing_integrations(pool);
    let lead = seed_lead(&state, "Ana").await;

    let payload = CreateContractPayload {
        lead_id: Some(lead.id),
        start_date: Some(date(2024, 2, 1)),
        notes: Some("Pacote completo, valor a combinar".to_string()),
        ..Default::default()
    };
    let err = state.contract_service.create(payload, "Maria").await.unwrap_err();

    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert!(state.contract_service.list(None).await.unwrap().is_empty());
    assert_eq!(state.lead_service.get(lead.id).await.unwrap().status, LeadStatus::Novo);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn explicit_terms_are_kept_when_ai_runs(pool: PgPool) {
    let state = state_with_pool(pool);
    let lead = seed_lead(&state, "Ana").await;

    let payload = CreateContractPayload {
        lead_id: Some(lead.id),
        contract_value: Some(100_000),
        contract_duration: Some(12),
        start_date: Some(date(2024, 3, 1)),
        notes: Some("Tráfego pago e mídias sociais por 3 meses, R$ 750/mês".to_string()),
        ..Default::default()
    };
    let detail = state.contract_service.create(payload, "Maria").await.unwrap();

    assert_eq!(detail.contract.contract_value, 100_000);
    assert_eq!(detail.contract.contract_duration, 12);
    assert_eq!(detail.contract.end_date, date(2025, 3, 1));
    assert!(detail.contract.processed_by_ai);
    assert!(detail.contract.ai_extracted_services.is_some());
    assert_eq!(detail.extracted_services.len(), 2);
    assert_eq!(detail.contract.lead_name.as_deref(), Some("Ana"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn ai_fills_missing_terms(pool: PgPool) {
    let state = state_with_pool(pool);
    let lead = seed_lead(&state, "Ana").await;

    let payload = CreateContractPayload {
        lead_id: Some(lead.id),
        start_date: Some(date(2024, 1, 10)),
        notes: Some("Pacote trimestral".to_string()),
        ..Default::default()
    };
    let detail = state.contract_service.create(payload, "Maria").await.unwrap();

    assert_eq!(detail.contract.contract_value, 75_000);
    assert_eq!(detail.contract.contract_duration, 3);
    assert_eq!(detail.contract.end_date, date(2024, 4, 10));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn missing_terms_without_notes_are_rejected(pool: PgPool) {
    let state = state_with_pool(pool);
    let lead = seed_lead(&state, "Ana").await;

    let payload = CreateContractPayload {
        lead_id: Some(lead.id),
        start_date: Some(date(2024, 1, 10)),
        ..Default::default()
    };
    let err = state.contract_service.create(payload, "Maria").await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    // Nada foi gravado e o lead continua aberto
    assert!(state.contract_service.list(None).await.unwrap().is_empty());
    assert_eq!(state.lead_service.get(lead.id).await.unwrap().status, LeadStatus::Novo);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn contract_for_unknown_lead_is_not_found(pool: PgPool) {
    let state = state_with_pool(pool);

    let payload = CreateContractPayload {
        lead_id: Some(999),
        contract_value: Some(100_000),
        contract_duration: Some(1),
        start_date: Some(date(2024, 1, 10)),
        ..Default::default()
    };
    let err = state.contract_service.create(payload, "Maria").await.unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn contract_closes_lead_and_clamps_end_date(pool: PgPool) {
    let state = state_with_pool(pool);
    let lead = seed_lead(&state, "Ana").await;

    let detail = seed_contract(&state, lead.id, date(2024, 1, 31), 1).await;
    assert_eq!(detail.contract.end_date, date(2024, 2, 29));
    assert!(detail.contract.is_active);
    assert!(!detail.contract.processed_by_ai);

    let lead = state.lead_service.get(lead.id).await.unwrap();
    assert_eq!(lead.status, LeadStatus::Fechado);
    assert_eq!(lead.last_modified_by.as_deref(), Some("Seed"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn deleting_contract_removes_its_services(pool: PgPool) {
    let state = state_with_pool(pool);
    let lead = seed_lead(&state, "Ana").await;

    let payload = CreateContractPayload {
        lead_id: Some(lead.id),
        start_date: Some(date(2024, 1, 10)),
        notes: Some("Pacote trimestral".to_string()),
        ..Default::default()
    };
    let detail = state.contract_service.create(payload, "Maria").await.unwrap();

    let stats = state.contract_service.service_stats().await.unwrap();
    assert_eq!(stats.len(), 2);
    assert!(stats.iter().all(|s| s.total_revenue == 37_500 && s.contract_count == 1));

    state.contract_service.delete(detail.contract.id).await.unwrap();
    assert!(state.contract_service.service_stats().await.unwrap().is_empty());

    let err = state.contract_service.get(detail.contract.id).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn contract_survives_lead_deletion(pool: PgPool) {
    let state = state_with_pool(pool);
    let lead = seed_lead(&state, "Ana").await;
    let detail = seed_contract(&state, lead.id, date(2024, 5, 1), 6).await;

    state.lead_service.delete(lead.id).await.unwrap();

    let orphan = state.contract_service.get(detail.contract.id).await.unwrap();
    assert_eq!(orphan.contract.lead_id, lead.id);
    assert_eq!(orphan.contract.lead_name, None);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn dashboard_on_empty_database(pool: PgPool) {
    let state = state_with_pool(pool);

    let stats = state.dashboard_service.stats().await.unwrap();

    assert_eq!(stats.total_leads, 0);
    assert_eq!(stats.active_contracts, 0);
    assert_eq!(stats.total_value, 0);
    assert_eq!(stats.conversion_rate, 0.0);
    assert!(stats.leads_by_classification.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn dashboard_counts_conversions(pool: PgPool) {
    let state = state_with_pool(pool);
    let closed = seed_lead(&state, "Ana").await;
    seed_lead(&state, "Bia").await;
    seed_lead(&state, "Caio").await;
    seed_contract(&state, closed.id, date(2024, 1, 1), 12).await;

    let stats = state.dashboard_service.stats().await.unwrap();

    assert_eq!(stats.total_leads, 3);
    assert_eq!(stats.recent_leads, 3);
    assert_eq!(stats.active_contracts, 1);
    assert_eq!(stats.total_value, 100_000);
    assert_eq!(stats.conversion_rate, 33.33);
    assert!(stats.leads_by_status.iter().any(|e| e.name == "fechado" && e.value == 1));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn renewals_window_filters_and_orders(pool: PgPool) {
    let state = state_with_pool(pool);
    let lead = seed_lead(&state, "Ana").await;
    let today = Utc::now().date_naive();

    // (dias até o fim, ativo, já notificado)
    let setups = [
        (10, true, false),
        (3, true, false),
        (60, true, false),
        (5, false, false),
        (2, true, true),
        (-3, true, false),
    ];
    let mut ids = Vec::new();
    for (days, is_active, renewal_notified) in setups {
        let detail = seed_contract(&state, lead.id, date(2024, 1, 1), 12).await;
        let changes = UpdateContractPayload {
            end_date: Some(today + TimeDelta::days(days)),
            is_active: Some(is_active),
            renewal_notified: Some(renewal_notified),
            ..Default::default()
        };
        state
            .contract_service
            .update(detail.contract.id, changes, "Maria")
            .await
            .unwrap();
        ids.push(detail.contract.id);
    }

    let due = state
        .contract_service
        .renewals(&RenewalQuery { days: Some(30) })
        .await
        .unwrap();
    let due_ids: Vec<i64> = due.iter().map(|d| d.contract.id).collect();
    assert_eq!(due_ids, vec![ids[1], ids[0]]);

    // Vencido há 3 dias não entra
    assert!(!due_ids.contains(&ids[5]));

    let wide = state.contract_service.renewals(&RenewalQuery::default()).await.unwrap();
    assert_eq!(wide.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn dashboard_counts_only_upcoming_renewals(pool: PgPool) {
    let state = state_with_pool(pool);
    let lead = seed_lead(&state, "Ana").await;
    let today = Utc::now().date_naive();

    for days in [10, -3, 45] {
        let detail = seed_contract(&state, lead.id, date(2024, 1, 1), 12).await;
        let changes = UpdateContractPayload {
            end_date: Some(today + TimeDelta::days(days)),
            ..Default::default()
        };
        state
            .contract_service
            .update(detail.contract.id, changes, "Maria")
            .await
            .unwrap();
    }

    let stats = state.dashboard_service.stats().await.unwrap();

    assert_eq!(stats.active_contracts, 3);
    assert_eq!(stats.renewal_count, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn lead_update_stamps_audit_fields(pool: PgPool) {
    let state = state_with_pool(pool);
    let lead = seed_lead(&state, "Ana").await;
    assert_eq!(lead.last_modified_at, None);

    // Só campos desconhecidos: 400 e nenhuma escrita
    let bogus: UpdateLeadPayload = serde_json::from_value(json!({ "bogusField": 1 })).unwrap();
    let err = state.lead_service.update(lead.id, bogus, "Maria").await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(state.lead_service.get(lead.id).await.unwrap().last_modified_at, None);

    let changes: UpdateLeadPayload =
        serde_json::from_value(json!({ "status": "contatado", "observations": null })).unwrap();
    let updated = state.lead_service.update(lead.id, changes, "Maria").await.unwrap();

    assert_eq!(updated.status, LeadStatus::Contatado);
    assert_eq!(updated.observations, None);
    assert_eq!(updated.last_modified_by.as_deref(), Some("Maria"));
    assert!(updated.last_modified_at.is_some());

    let missing: UpdateLeadPayload = serde_json::from_value(json!({ "score": 10 })).unwrap();
    let err = state.lead_service.update(9_999, missing, "Maria").await.unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn instagram_export_skips_missing_handles(pool: PgPool) {
    let state = state_with_pool(pool);
    for (name, handle) in [("Ana", Some("@ana")), ("Bia", None), ("Caio", Some("@caio")), ("Duda", Some("  "))] {
        state
            .lead_service
            .create(lead_payload(name, handle, None), None)
            .await
            .unwrap();
    }

    let file = state.lead_service.export(ExportKind::Instagram).await.unwrap();

    assert_eq!(file.content, "@caio\n@ana");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn successful_mutations_are_audited(pool: PgPool) {
    let state = state_with_pool(pool);
    let lead = seed_lead(&state, "Ana").await;
    let app = crm_backend::app(state.clone());
    let token = token_for(UserRole::Admin);

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/leads/{}", lead.id),
            Some(&token),
            json!({ "name": "Ana Souza" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A gravação roda em outra task
    let mut entries = Vec::new();
    for _ in 0..50 {
        entries = state
            .activity_service
            .by_entity(ActivityEntity::Lead, lead.id)
            .await
            .unwrap();
        if !entries.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.action, ActivityAction::Update);
    assert_eq!(entry.user_name, "Maria Teste");
    assert_eq!(entry.entity_name.as_deref(), Some("Ana Souza"));
    assert!(entry.description.contains("modificou"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer PostgreSQL (DATABASE_URL)"]
async fn login_accepts_the_email_as_registered(pool: PgPool) {
    let app = crm_backend::app(state_with_pool(pool));

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "name": "Ana", "email": " Ana@Agencia.com ", "password": "segredo123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["user"]["email"], "ana@agencia.com");

    for email in [" Ana@Agencia.com ", "ana@agencia.com"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                None,
                json!({ "email": email, "password": "segredo123" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "login com {:?}", email);
    }
}
