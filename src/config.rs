// src/config.rs

use std::{env, fmt::Display, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{ActivityRepository, ContractRepository, DashboardRepository, LeadRepository, UserRepository},
    services::{
        activity_service::ActivityService,
        auth::{AuthService, TokenIssuer},
        contract_extractor::{ContractExtractor, OpenAiExtractor},
        contract_service::ContractService,
        dashboard_service::DashboardService,
        geolocation::{Geolocator, IpApiGeolocator},
        lead_service::LeadService,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(anyhow::anyhow!("APP_ENV desconhecido: {}", other)),
        }
    }
}

/// Configuração do processo, lida das variáveis de ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expires_in_days: i64,
    pub port: u16,
    pub environment: Environment,
    /// Origem liberada no CORS. `None` libera qualquer origem.
    pub frontend_url: Option<String>,
    /// Sem chave, a extração de contratos por IA fica desligada.
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub geolocation_base_url: String,
    pub http_timeout_secs: u64,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_name: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            jwt_expires_in_days: parse_var("JWT_EXPIRES_IN_DAYS", 7)?,
            port: parse_var("PORT", 5000)?,
            environment: parse_var("APP_ENV", Environment::Development)?,
            frontend_url: optional_var("FRONTEND_URL"),
            openai_api_key: optional_var("OPENAI_API_KEY"),
            openai_model: optional_var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            openai_base_url: optional_var("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            geolocation_base_url: optional_var("GEOLOCATION_BASE_URL")
                .unwrap_or_else(|| "http://ip-api.com/json".to_string()),
            http_timeout_secs: parse_var("HTTP_TIMEOUT_SECS", 10)?,
            admin_email: optional_var("ADMIN_EMAIL"),
            admin_password: optional_var("ADMIN_PASSWORD"),
            admin_name: optional_var("ADMIN_NAME").unwrap_or_else(|| "Administrador".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

// Variável vazia conta como ausente.
fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match optional_var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("Valor inválido para {}: {}", key, e)),
        None => Ok(default),
    }
}

// Cliente HTTP único para geolocalização e IA, reaproveitando conexões.
fn build_http_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent("crm-backend/0.1")
        .build()
        .context("Falha ao criar o cliente HTTP")
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub lead_service: LeadService,
    pub contract_service: ContractService,
    pub dashboard_service: DashboardService,
    pub activity_service: ActivityService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let http = build_http_client(config.http_timeout_secs)?;

        let geolocator: Arc<dyn Geolocator> =
            Arc::new(IpApiGeolocator::new(http.clone(), &config.geolocation_base_url));

        let extractor = config.openai_api_key.as_ref().map(|api_key| {
            Arc::new(OpenAiExtractor::new(
                http.clone(),
                &config.openai_base_url,
                api_key,
                &config.openai_model,
            )) as Arc<dyn ContractExtractor>
        });

        if extractor.is_some() {
            tracing::info!("🤖 Extração de contratos por IA habilitada ({})", config.openai_model);
        } else {
            tracing::info!("Extração de contratos por IA desabilitada (OPENAI_API_KEY ausente)");
        }

        Ok(Self::assemble(db_pool, config, geolocator, extractor))
    }

    // --- Monta o gráfico de dependências ---
    pub fn assemble(
        db_pool: PgPool,
        config: Config,
        geolocator: Arc<dyn Geolocator>,
        extractor: Option<Arc<dyn ContractExtractor>>,
    ) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let lead_repo = LeadRepository::new(db_pool.clone());
        let contract_repo = ContractRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());
        let activity_repo = ActivityRepository::new(db_pool.clone());

        let tokens = TokenIssuer::new(&config.jwt_secret, config.jwt_expires_in_days);

        Self {
            auth_service: AuthService::new(user_repo, tokens, db_pool.clone()),
            lead_service: LeadService::new(lead_repo.clone(), geolocator),
            contract_service: ContractService::new(contract_repo, lead_repo, extractor, db_pool.clone()),
            dashboard_service: DashboardService::new(dashboard_repo),
            activity_service: ActivityService::new(activity_repo),
            config: Arc::new(config),
            db_pool,
        }
    }
}
