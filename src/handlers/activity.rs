// src/handlers/activity.rs
//
// Consulta do log de auditoria. Somente administradores.

use axum::{extract::State, response::IntoResponse, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppPath, AppQuery},
        response::ApiResponse,
    },
    config::AppState,
    middleware::rbac::{AdminRole, RequireRole},
    models::activity::{ActivityEntity, ActivityLogEntry, ActivityPage},
};

// GET /api/activity
#[utoipa::path(
    get,
    path = "/api/activity",
    tag = "Auditoria",
    params(ActivityPage),
    responses(
        (status = 200, description = "Atividades mais recentes", body = [ActivityLogEntry]),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_activity(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminRole>,
    AppQuery(page): AppQuery<ActivityPage>,
) -> Result<impl IntoResponse, AppError> {
    page.validate()?;
    let entries = app_state.activity_service.recent(&page).await?;
    Ok(Json(ApiResponse::list(entries)))
}

// GET /api/activity/users/{user_id}
#[utoipa::path(
    get,
    path = "/api/activity/users/{user_id}",
    tag = "Auditoria",
    params(
        ("user_id" = Uuid, Path, description = "ID do usuário"),
        ActivityPage
    ),
    responses(
        (status = 200, description = "Atividades do usuário", body = [ActivityLogEntry]),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_user_activity(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminRole>,
    AppPath(user_id): AppPath<Uuid>,
    AppQuery(page): AppQuery<ActivityPage>,
) -> Result<impl IntoResponse, AppError> {
    page.validate()?;
    let entries = app_state.activity_service.by_user(user_id, &page).await?;
    Ok(Json(ApiResponse::list(entries)))
}

// GET /api/activity/{entity_type}/{entity_id}
#[utoipa::path(
    get,
    path = "/api/activity/{entity_type}/{entity_id}",
    tag = "Auditoria",
    params(
        ("entity_type" = ActivityEntity, Path, description = "lead | contract | service"),
        ("entity_id" = i64, Path, description = "ID da entidade")
    ),
    responses(
        (status = 200, description = "Histórico da entidade", body = [ActivityLogEntry]),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_entity_activity(
    State(app_state): State<AppState>,
    _admin: RequireRole<AdminRole>,
    AppPath((entity_type, entity_id)): AppPath<(ActivityEntity, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let entries = app_state
        .activity_service
        .by_entity(entity_type, entity_id)
        .await?;
    Ok(Json(ApiResponse::list(entries)))
}
