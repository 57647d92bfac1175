// src/services/activity_service.rs

use axum::http::Method;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ActivityRepository,
    models::activity::{ActivityAction, ActivityEntity, ActivityLogEntry, ActivityPage, NewActivity},
};

#[derive(Clone)]
pub struct ActivityService {
    repo: ActivityRepository,
}

impl ActivityService {
    pub fn new(repo: ActivityRepository) -> Self {
        Self { repo }
    }

    pub async fn record(&self, entry: &NewActivity) -> Result<i64, AppError> {
        self.repo.insert(entry).await
    }

    pub async fn recent(&self, page: &ActivityPage) -> Result<Vec<ActivityLogEntry>, AppError> {
        self.repo.list_recent(page.limit(), page.offset()).await
    }

    pub async fn by_user(&self, user_id: Uuid, page: &ActivityPage) -> Result<Vec<ActivityLogEntry>, AppError> {
        self.repo.list_by_user(user_id, page.limit()).await
    }

    pub async fn by_entity(&self, entity: ActivityEntity, id: i64) -> Result<Vec<ActivityLogEntry>, AppError> {
        self.repo.list_by_entity(entity, id).await
    }
}

/// Quem fez a requisição, para a auditoria.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub user_id: Option<Uuid>,
    pub user_name: String,
}

impl Actor {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            user_name: "Desconhecido".to_string(),
        }
    }
}

pub fn action_for(method: &Method) -> Option<ActivityAction> {
    match *method {
        Method::POST => Some(ActivityAction::Create),
        Method::PUT | Method::PATCH => Some(ActivityAction::Update),
        Method::DELETE => Some(ActivityAction::Delete),
        _ => None,
    }
}

/// Deduz o registro de auditoria a partir do método, caminho e corpo da requisição.
/// `None` quando não dá para saber a entidade: a requisição segue sem log.
pub fn infer_activity(method: &Method, path: &str, body: &Value, actor: &Actor) -> Option<NewActivity> {
    let action = action_for(method)?;
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let (entity_type, position) = [
        ("leads", ActivityEntity::Lead),
        ("contracts", ActivityEntity::Contract),
        ("services", ActivityEntity::Service),
    ]
    .into_iter()
    .find_map(|(segment, entity)| {
        segments
            .iter()
            .position(|s| *s == segment)
            .map(|pos| (entity, pos))
    })?;

    let entity_id = segments
        .get(position + 1)
        .and_then(|s| s.parse::<i64>().ok())
        .or_else(|| body.get("id").and_then(Value::as_i64));

    let entity_name = display_name(entity_type, body);
    let description = format!(
        "{} {} {} \"{}\"",
        actor.user_name,
        action.verb(),
        entity_type,
        entity_name
    );

    Some(NewActivity {
        user_id: actor.user_id,
        user_name: actor.user_name.clone(),
        action,
        entity_type,
        entity_id,
        entity_name,
        changes: json!({
            "before": body.get("before").cloned().unwrap_or(Value::Null),
            "after": body,
        }),
        description,
    })
}

fn display_name(entity: ActivityEntity, body: &Value) -> String {
    let text = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    match entity {
        ActivityEntity::Lead => text("name").unwrap_or_else(|| "Lead".to_string()),
        ActivityEntity::Contract => body
            .get("contractValue")
            .and_then(Value::as_i64)
            .map(|cents| format!("Contrato {}", format_brl(cents)))
            .unwrap_or_else(|| "Contrato".to_string()),
        ActivityEntity::Service => text("serviceName").unwrap_or_else(|| "Serviço".to_string()),
    }
}

/// Centavos no formato brasileiro: 150000 → "R$ 1.500,00".
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let reais = (cents / 100).to_string();

    let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
    for (i, digit) in reais.chars().enumerate() {
        if i > 0 && (reais.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("{}R$ {},{:02}", sign, grouped, cents % 100)
}
