// src/models/dashboard.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// Fatia dos gráficos de pizza/barras (classificação, status)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct ChartEntry {
    #[schema(example = "Quente")]
    pub name: String,
    pub value: i64,
}

// Cards do topo + gráficos
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_leads: i64,
    pub active_contracts: i64,
    /// Soma dos contratos ativos, em centavos
    pub total_value: i64,
    /// Contratos ativos que vencem nos próximos 30 dias
    pub renewal_count: i64,
    /// Leads dos últimos 7 dias
    pub recent_leads: i64,
    /// Percentual de leads fechados, duas casas
    #[schema(example = 12.5)]
    pub conversion_rate: f64,
    pub leads_by_classification: Vec<ChartEntry>,
    pub leads_by_status: Vec<ChartEntry>,
}
