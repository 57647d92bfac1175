// src/models/contract.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::nullable;

// --- CONTRATO ---

// Linha de `contracts` com os dados do lead vindos do LEFT JOIN.
// Se o lead foi apagado, os campos lead_* chegam nulos.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: i64,
    pub lead_id: i64,
    /// Valor em centavos
    #[schema(example = 150000)]
    pub contract_value: i64,
    /// Duração em meses
    #[schema(example = 12)]
    pub contract_duration: i32,
    pub services: Option<Value>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub renewal_notified: bool,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    #[serde(rename = "processedByAI")]
    pub processed_by_ai: bool,
    #[serde(rename = "aiExtractedServices")]
    pub ai_extracted_services: Option<Value>,
    pub last_modified_by: Option<String>,
    pub last_modified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,

    pub lead_name: Option<String>,
    pub lead_email: Option<String>,
    pub lead_phone: Option<String>,
}

// Linha de contract_services
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    pub id: i64,
    pub contract_id: i64,
    #[schema(example = "Gestão de tráfego")]
    pub service_name: String,
    /// Valor em centavos
    pub service_value: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractDetail {
    #[serde(flatten)]
    pub contract: Contract,
    pub extracted_services: Vec<ServiceItem>,
}

// --- PAYLOADS ---

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractPayload {
    pub lead_id: Option<i64>,
    /// Centavos. Se ausente, pode vir da extração por IA.
    #[validate(range(min = 1, message = "O valor do contrato deve ser positivo."))]
    pub contract_value: Option<i64>,
    /// Meses. Se ausente, pode vir da extração por IA.
    #[validate(range(min = 1, message = "A duração deve ser de pelo menos 1 mês."))]
    pub contract_duration: Option<i32>,
    pub services: Option<Value>,
    #[schema(value_type = Option<String>, format = Date, example = "2024-01-31")]
    pub start_date: Option<NaiveDate>,
    /// Descrição livre. Alimenta a extração por IA quando habilitada.
    pub notes: Option<String>,
}

/// Contrato pronto para o INSERT, com valor, duração e término já resolvidos.
#[derive(Debug, Clone)]
pub struct NewContract {
    pub lead_id: i64,
    pub contract_value: i64,
    pub contract_duration: i32,
    pub services: Option<Value>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
    pub created_by: String,
    pub processed_by_ai: bool,
    pub ai_extracted_services: Option<Value>,
}

/// Serviço a gravar em contract_services (valor em centavos).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewServiceItem {
    pub service_name: String,
    pub service_value: i64,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContractPayload {
    #[validate(range(min = 1, message = "O valor do contrato deve ser positivo."))]
    pub contract_value: Option<i64>,
    #[validate(range(min = 1, message = "A duração deve ser de pelo menos 1 mês."))]
    pub contract_duration: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Object>)]
    pub services: Option<Option<Value>>,
    #[schema(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
    pub renewal_notified: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

impl UpdateContractPayload {
    pub fn is_empty(&self) -> bool {
        self.contract_value.is_none()
            && self.contract_duration.is_none()
            && self.services.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.is_active.is_none()
            && self.renewal_notified.is_none()
            && self.notes.is_none()
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ContractFilter {
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RenewalQuery {
    /// Janela em dias a partir de hoje (padrão 30)
    #[validate(range(min = 0, max = 3650, message = "days deve estar entre 0 e 3650."))]
    pub days: Option<i32>,
}

impl RenewalQuery {
    pub const DEFAULT_DAYS: i32 = 30;

    pub fn days(&self) -> i32 {
        self.days.unwrap_or(Self::DEFAULT_DAYS)
    }
}

// Faturamento agregado por nome de serviço
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRevenue {
    pub service_name: String,
    pub contract_count: i64,
    /// Soma em centavos
    pub total_revenue: i64,
    /// Média em centavos, duas casas
    #[schema(value_type = f64)]
    pub avg_revenue: Decimal,
}
