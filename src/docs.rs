// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CRM API",
        description = "Leads, contratos, renovações e indicadores. Respostas no envelope `{ success, message?, data?, count? }`; valores monetários em centavos."
    ),
    paths(
        // --- Infra ---
        handlers::health::health_check,

        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Leads ---
        handlers::leads::create_lead,
        handlers::leads::list_leads,
        handlers::leads::get_lead,
        handlers::leads::update_lead,
        handlers::leads::delete_lead,
        handlers::leads::export_leads,

        // --- Contratos ---
        handlers::contracts::list_contracts,
        handlers::contracts::get_contract,
        handlers::contracts::create_contract,
        handlers::contracts::update_contract,
        handlers::contracts::delete_contract,
        handlers::contracts::list_renewals,
        handlers::contracts::service_stats,

        // --- Dashboard ---
        handlers::dashboard::get_stats,

        // --- Auditoria ---
        handlers::activity::list_activity,
        handlers::activity::list_user_activity,
        handlers::activity::list_entity_activity,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Leads ---
            models::lead::LeadClassification,
            models::lead::LeadStatus,
            models::lead::Lead,
            models::lead::CreateLeadPayload,
            models::lead::UpdateLeadPayload,

            // --- Contratos ---
            models::contract::Contract,
            models::contract::ServiceItem,
            models::contract::ContractDetail,
            models::contract::CreateContractPayload,
            models::contract::UpdateContractPayload,
            models::contract::ServiceRevenue,

            // --- Dashboard ---
            models::dashboard::ChartEntry,
            models::dashboard::DashboardStats,

            // --- Auditoria ---
            models::activity::ActivityAction,
            models::activity::ActivityEntity,
            models::activity::ActivityLogEntry,
        )
    ),
    tags(
        (name = "Infra", description = "Saúde do serviço"),
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Leads", description = "Captação e funil de leads"),
        (name = "Contratos", description = "Contratos, serviços e renovações"),
        (name = "Dashboard", description = "Indicadores e Gráficos Gerenciais"),
        (name = "Auditoria", description = "Histórico de alterações (administradores)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
