// src/lib.rs

use axum::{
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::{
    config::AppState,
    docs::ApiDoc,
    middleware::{audit::audit_layer, auth::auth_guard, error_details::expose_error_details},
};

/// Monta o router completo da API sobre um estado já construído.
pub fn app(app_state: AppState) -> Router {
    // Rotas públicas (quiz, login, registro, healthcheck)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/leads", post(handlers::leads::create_lead));

    // Todo o resto exige token
    let protected_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::get_me))
        .route("/api/leads", get(handlers::leads::list_leads))
        .route("/api/leads/export/{type}", get(handlers::leads::export_leads))
        .route(
            "/api/leads/{id}",
            get(handlers::leads::get_lead)
                .put(handlers::leads::update_lead)
                .delete(handlers::leads::delete_lead),
        )
        .route(
            "/api/contracts",
            get(handlers::contracts::list_contracts).post(handlers::contracts::create_contract),
        )
        .route("/api/contracts/renewals", get(handlers::contracts::list_renewals))
        .route("/api/contracts/services/stats", get(handlers::contracts::service_stats))
        .route(
            "/api/contracts/{id}",
            get(handlers::contracts::get_contract)
                .put(handlers::contracts::update_contract)
                .delete(handlers::contracts::delete_contract),
        )
        .route("/api/dashboard/stats", get(handlers::dashboard::get_stats))
        .route("/api/activity", get(handlers::activity::list_activity))
        .route(
            "/api/activity/users/{user_id}",
            get(handlers::activity::list_user_activity),
        )
        .route(
            "/api/activity/{entity_type}/{entity_id}",
            get(handlers::activity::list_entity_activity),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let cors = cors_layer(app_state.config.frontend_url.as_deref());

    // Combina tudo no router principal
    let router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(handlers::health::route_not_found);

    // Fora de produção o corpo do 500 leva a causa
    let router = if app_state.config.is_production() {
        router
    } else {
        router.layer(axum_middleware::from_fn(expose_error_details))
    };

    router
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            audit_layer,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

// Sem FRONTEND_URL (ou com valor inválido) libera qualquer origem
fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match frontend_url.map(HeaderValue::from_str) {
        Some(Ok(origin)) => base.allow_origin(origin),
        Some(Err(_)) => {
            tracing::warn!("FRONTEND_URL inválida; CORS liberado para qualquer origem");
            base.allow_origin(Any)
        }
        None => base.allow_origin(Any),
    }
}
