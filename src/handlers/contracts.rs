// src/handlers/contracts.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppPath, AppQuery},
        response::ApiResponse,
    },
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::contract::{
        ContractDetail, ContractFilter, CreateContractPayload, RenewalQuery, ServiceRevenue,
        UpdateContractPayload,
    },
};

// GET /api/contracts
#[utoipa::path(
    get,
    path = "/api/contracts",
    tag = "Contratos",
    params(ContractFilter),
    responses(
        (status = 200, description = "Contratos com dados do lead e serviços", body = [ContractDetail]),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_contracts(
    State(app_state): State<AppState>,
    AppQuery(filter): AppQuery<ContractFilter>,
) -> Result<impl IntoResponse, AppError> {
    let contracts = app_state.contract_service.list(filter.is_active).await?;
    Ok(Json(ApiResponse::list(contracts)))
}

// GET /api/contracts/{id}
#[utoipa::path(
    get,
    path = "/api/contracts/{id}",
    tag = "Contratos",
    params(("id" = i64, Path, description = "ID do contrato")),
    responses(
        (status = 200, description = "Contrato encontrado", body = ContractDetail),
        (status = 404, description = "Contrato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_contract(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let contract = app_state.contract_service.get(id).await?;
    Ok(Json(ApiResponse::success(contract)))
}

// POST /api/contracts
#[utoipa::path(
    post,
    path = "/api/contracts",
    tag = "Contratos",
    request_body = CreateContractPayload,
    responses(
        (status = 201, description = "Contrato criado e lead marcado como fechado", body = ContractDetail),
        (status = 400, description = "Campos obrigatórios ausentes ou valor/duração indefinidos"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contract(
    State(app_state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppJson(payload): AppJson<CreateContractPayload>,
) -> Result<impl IntoResponse, AppError> {
    let contract = app_state
        .contract_service
        .create(payload, &claims.actor_name())
        .await?;

    let message = if contract.contract.processed_by_ai {
        "Contrato criado com sucesso (processado pela IA)"
    } else {
        "Contrato criado com sucesso"
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(contract).with_message(message)),
    ))
}

// PUT /api/contracts/{id}
#[utoipa::path(
    put,
    path = "/api/contracts/{id}",
    tag = "Contratos",
    params(("id" = i64, Path, description = "ID do contrato")),
    request_body = UpdateContractPayload,
    responses(
        (status = 200, description = "Contrato atualizado", body = ContractDetail),
        (status = 400, description = "Nenhum campo válido para atualizar"),
        (status = 404, description = "Contrato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_contract(
    State(app_state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateContractPayload>,
) -> Result<impl IntoResponse, AppError> {
    let contract = app_state
        .contract_service
        .update(id, payload, &claims.actor_name())
        .await?;
    Ok(Json(ApiResponse::success(contract).with_message("Contrato atualizado com sucesso")))
}

// DELETE /api/contracts/{id}
#[utoipa::path(
    delete,
    path = "/api/contracts/{id}",
    tag = "Contratos",
    params(("id" = i64, Path, description = "ID do contrato")),
    responses(
        (status = 200, description = "Contrato e serviços removidos"),
        (status = 404, description = "Contrato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_contract(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.contract_service.delete(id).await?;
    Ok(Json(ApiResponse::message("Contrato deletado com sucesso")))
}

// GET /api/contracts/renewals
#[utoipa::path(
    get,
    path = "/api/contracts/renewals",
    tag = "Contratos",
    params(RenewalQuery),
    responses(
        (status = 200, description = "Contratos a renovar, vencimento mais próximo primeiro", body = [ContractDetail]),
        (status = 400, description = "Janela inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_renewals(
    State(app_state): State<AppState>,
    AppQuery(query): AppQuery<RenewalQuery>,
) -> Result<impl IntoResponse, AppError> {
    let contracts = app_state.contract_service.renewals(&query).await?;
    Ok(Json(ApiResponse::list(contracts)))
}

// GET /api/contracts/services/stats
#[utoipa::path(
    get,
    path = "/api/contracts/services/stats",
    tag = "Contratos",
    responses(
        (status = 200, description = "Faturamento por serviço, maior soma primeiro", body = [ServiceRevenue])
    ),
    security(("api_jwt" = []))
)]
pub async fn service_stats(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.contract_service.service_stats().await?;
    Ok(Json(ApiResponse::list(stats)))
}
