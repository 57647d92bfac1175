// src/models/lead.rs

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{common::error::AppError, models::nullable};

// --- ENUMS ---

// Temperatura do lead. Independente do score numérico.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_classification")]
pub enum LeadClassification {
    Quente,
    Morno,
    Frio,
}

// Etapa do funil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    Novo,
    Contatado,
    Negociacao,
    Fechado,
    Perdido,
    Renovacao,
}

// --- LEAD (linha da tabela) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: i64,
    #[schema(example = "João Pereira")]
    pub name: String,
    pub email: String,
    pub phone: String,
    #[schema(example = "@joaopereira")]
    pub instagram: Option<String>,
    #[schema(example = 55)]
    pub score: i32,
    pub classification: LeadClassification,
    pub status: LeadStatus,

    // Respostas do quiz
    pub question1: Option<String>,
    pub question2: Option<String>,
    pub question3: Option<String>,
    pub question4: Option<String>,
    pub question5: Option<String>,
    pub question6: Option<String>,
    pub question7: Option<String>,

    pub ip_address: Option<String>,
    pub location_city: Option<String>,
    pub location_state: Option<String>,
    pub location_country: Option<String>,
    pub location_latitude: Option<f64>,
    pub location_longitude: Option<f64>,

    pub observations: Option<String>,
    pub created_by: Option<String>,
    pub last_modified_by: Option<String>,
    pub last_modified_at: Option<DateTime<Utc>>,

    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Resultado de uma geolocalização por IP bem-sucedida.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoLocation {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// --- PAYLOADS ---

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "João Pereira")]
    pub name: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "joao@email.com")]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "O telefone é obrigatório."))]
    #[schema(example = "(11) 98888-7777")]
    pub phone: Option<String>,

    pub instagram: Option<String>,

    #[validate(range(min = 0, max = 70, message = "O score deve estar entre 0 e 70."))]
    #[schema(example = 55)]
    pub score: Option<i32>,

    pub classification: Option<LeadClassification>,

    pub question1: Option<String>,
    pub question2: Option<String>,
    pub question3: Option<String>,
    pub question4: Option<String>,
    pub question5: Option<String>,
    pub question6: Option<String>,
    pub question7: Option<String>,

    #[schema(example = "177.10.20.30")]
    pub ip_address: Option<String>,

    pub observations: Option<String>,
}

/// Lead pronto para o INSERT, já com os obrigatórios conferidos.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub instagram: Option<String>,
    pub score: i32,
    pub classification: LeadClassification,
    pub questions: [Option<String>; 7],
    pub ip_address: Option<String>,
    pub observations: Option<String>,
    pub location: Option<GeoLocation>,
    pub created_by: Option<String>,
}

impl CreateLeadPayload {
    pub fn into_new_lead(self, created_by: Option<String>) -> Result<NewLead, AppError> {
        let (Some(name), Some(email), Some(phone), Some(score), Some(classification)) =
            (self.name, self.email, self.phone, self.score, self.classification)
        else {
            return Err(AppError::Validation(
                "Campos obrigatórios: name, email, phone, score, classification".to_string(),
            ));
        };

        Ok(NewLead {
            name,
            email,
            phone,
            instagram: non_blank(self.instagram),
            score,
            classification,
            questions: [
                self.question1,
                self.question2,
                self.question3,
                self.question4,
                self.question5,
                self.question6,
                self.question7,
            ],
            ip_address: non_blank(self.ip_address),
            observations: self.observations,
            location: None,
            created_by,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Campos permitidos no PUT. Campos desconhecidos são ignorados pelo serde.
/// Colunas anuláveis aceitam `null` explícito para limpar o valor.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "O telefone é obrigatório."))]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub instagram: Option<Option<String>>,
    #[validate(range(min = 0, max = 70, message = "O score deve estar entre 0 e 70."))]
    pub score: Option<i32>,
    pub classification: Option<LeadClassification>,
    pub status: Option<LeadStatus>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub observations: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub question1: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub question2: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub question3: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub question4: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub question5: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub question6: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub question7: Option<Option<String>>,
}

impl UpdateLeadPayload {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.instagram.is_none()
            && self.score.is_none()
            && self.classification.is_none()
            && self.status.is_none()
            && self.observations.is_none()
            && self.questions().iter().all(|q| q.is_none())
    }

    pub fn questions(&self) -> [&Option<Option<String>>; 7] {
        [
            &self.question1,
            &self.question2,
            &self.question3,
            &self.question4,
            &self.question5,
            &self.question6,
            &self.question7,
        ]
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeadFilter {
    pub classification: Option<LeadClassification>,
    pub status: Option<LeadStatus>,
    /// Busca por trecho de nome, e-mail ou telefone
    pub search: Option<String>,
}

// --- EXPORTAÇÃO ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Emails,
    Phones,
    Instagram,
    Locations,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Emails => "emails",
            ExportKind::Phones => "phones",
            ExportKind::Instagram => "instagram",
            ExportKind::Locations => "locations",
        }
    }

    pub fn filename(&self) -> String {
        format!("{}.txt", self.as_str())
    }
}

impl FromStr for ExportKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "emails" => Ok(ExportKind::Emails),
            "phones" => Ok(ExportKind::Phones),
            "instagram" => Ok(ExportKind::Instagram),
            "locations" => Ok(ExportKind::Locations),
            _ => Err(AppError::Validation("Tipo de exportação inválido".to_string())),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct LocationRow {
    pub name: String,
    pub location_city: String,
    pub location_state: Option<String>,
    pub location_country: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub content: String,
}
