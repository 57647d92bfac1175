// src/handlers/leads.rs

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppPath, AppQuery},
        response::ApiResponse,
    },
    config::AppState,
    middleware::auth::{AuthenticatedUser, OptionalUser},
    models::lead::{CreateLeadPayload, ExportKind, Lead, LeadFilter, UpdateLeadPayload},
};

// POST /api/leads (público: formulário do quiz)
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado", body = Lead),
        (status = 400, description = "Campos obrigatórios ausentes ou inválidos")
    )
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    OptionalUser(user): OptionalUser,
    AppJson(payload): AppJson<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    let created_by = user.map(|claims| claims.actor_name());
    let lead = app_state.lead_service.create(payload, created_by).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(lead).with_message("Lead criado com sucesso")),
    ))
}

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(LeadFilter),
    responses(
        (status = 200, description = "Leads do mais recente para o mais antigo", body = [Lead]),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    AppQuery(filter): AppQuery<LeadFilter>,
) -> Result<impl IntoResponse, AppError> {
    let leads = app_state.lead_service.list(&filter).await?;
    Ok(Json(ApiResponse::list(leads)))
}

// GET /api/leads/{id}
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = i64, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead encontrado", body = Lead),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.lead_service.get(id).await?;
    Ok(Json(ApiResponse::success(lead)))
}

// PUT /api/leads/{id}
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = i64, Path, description = "ID do lead")),
    request_body = UpdateLeadPayload,
    responses(
        (status = 200, description = "Lead atualizado", body = Lead),
        (status = 400, description = "Nenhum campo válido para atualizar"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state
        .lead_service
        .update(id, payload, &claims.actor_name())
        .await?;
    Ok(Json(ApiResponse::success(lead).with_message("Lead atualizado com sucesso")))
}

// DELETE /api/leads/{id}
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = i64, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead deletado"),
        (status = 404, description = "Lead não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.lead_service.delete(id).await?;
    Ok(Json(ApiResponse::message("Lead deletado com sucesso")))
}

// GET /api/leads/export/{type}
#[utoipa::path(
    get,
    path = "/api/leads/export/{type}",
    tag = "Leads",
    params(("type" = String, Path, description = "emails | phones | instagram | locations")),
    responses(
        (status = 200, description = "Arquivo texto, uma linha por lead", content_type = "text/plain"),
        (status = 400, description = "Tipo de exportação inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_leads(
    State(app_state): State<AppState>,
    AppPath(kind): AppPath<String>,
) -> Result<impl IntoResponse, AppError> {
    let kind: ExportKind = kind.parse()?;
    let file = app_state.lead_service.export(kind).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.content,
    ))
}
