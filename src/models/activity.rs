// src/models/activity.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "activity_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
}

impl ActivityAction {
    // Verbo usado na descrição legível
    pub fn verb(&self) -> &'static str {
        match self {
            ActivityAction::Create => "criou",
            ActivityAction::Update => "modificou",
            ActivityAction::Delete => "deletou",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "activity_entity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActivityEntity {
    Lead,
    Contract,
    Service,
}

impl fmt::Display for ActivityEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivityEntity::Lead => "lead",
            ActivityEntity::Contract => "contract",
            ActivityEntity::Service => "service",
        };
        f.write_str(name)
    }
}

// Linha de activity_log (somente inserção)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: i64,
    pub user_id: Option<Uuid>,
    pub user_name: String,
    pub action: ActivityAction,
    pub entity_type: ActivityEntity,
    pub entity_id: Option<i64>,
    pub entity_name: Option<String>,
    pub changes: Option<Value>,
    #[schema(example = "Maria criou lead \"João\"")]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub user_id: Option<Uuid>,
    pub user_name: String,
    pub action: ActivityAction,
    pub entity_type: ActivityEntity,
    pub entity_id: Option<i64>,
    pub entity_name: String,
    pub changes: Value,
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityPage {
    #[validate(range(min = 1, max = 200, message = "limit deve estar entre 1 e 200."))]
    pub limit: Option<i64>,
    #[validate(range(min = 0, message = "offset não pode ser negativo."))]
    pub offset: Option<i64>,
}

impl ActivityPage {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(50)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }
}
