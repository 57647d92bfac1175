// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{error::AppError, extract::AppJson, response::ApiResponse},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{normalize_email, AuthResponse, LoginUserPayload, RegisterUserPayload, User},
};

// Handler de registro
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuário criado; `data` traz usuário e token", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    AppJson(mut payload): AppJson<RegisterUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    // Espaços nas pontas não invalidam o e-mail
    payload.email = normalize_email(&payload.email);
    payload.validate()?;

    let auth = app_state.auth_service.register(payload).await?;
    tracing::info!("Novo usuário registrado: {}", auth.user.email);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(auth).with_message("Usuário registrado com sucesso")),
    ))
}

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login efetuado; `data` traz usuário e token", body = AuthResponse),
        (status = 401, description = "Email ou senha incorretos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<LoginUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let auth = app_state.auth_service.login(payload).await?;
    Ok(Json(ApiResponse::success(auth).with_message("Login realizado com sucesso")))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Perfil do usuário logado", body = User),
        (status = 401, description = "Não autorizado"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.auth_service.me(&claims).await?;
    Ok(Json(ApiResponse::success(user)))
}
