// src/services/lead_service.rs

use std::{net::IpAddr, sync::Arc};

use validator::Validate;

use crate::{
    common::error::AppError,
    db::LeadRepository,
    models::lead::{
        CreateLeadPayload, ExportFile, ExportKind, Lead, LeadFilter, LocationRow, UpdateLeadPayload,
    },
    services::geolocation::Geolocator,
};

#[derive(Clone)]
pub struct LeadService {
    repo: LeadRepository,
    geolocator: Arc<dyn Geolocator>,
}

impl LeadService {
    pub fn new(repo: LeadRepository, geolocator: Arc<dyn Geolocator>) -> Self {
        Self { repo, geolocator }
    }

    pub async fn list(&self, filter: &LeadFilter) -> Result<Vec<Lead>, AppError> {
        self.repo.list(filter).await
    }

    pub async fn get(&self, id: i64) -> Result<Lead, AppError> {
        self.repo
            .find_by_id(self.repo.pool(), id)
            .await?
            .ok_or_else(|| AppError::not_found("Lead"))
    }

    /// Cadastro público (quiz) ou manual. `created_by` vem do token, se houver.
    pub async fn create(
        &self,
        payload: CreateLeadPayload,
        created_by: Option<String>,
    ) -> Result<Lead, AppError> {
        payload.validate()?;
        let mut lead = payload.into_new_lead(created_by)?;

        // Só tenta geolocalizar um IP válido. Falha deixa a localização nula.
        if let Some(ip) = lead.ip_address.as_deref().and_then(|raw| raw.trim().parse::<IpAddr>().ok()) {
            match self.geolocator.locate(ip).await {
                Ok(location) => lead.location = Some(location),
                Err(e) => tracing::warn!("Geolocalização falhou para {}: {:#}", ip, e),
            }
        }

        let created = self.repo.create(&lead).await?;
        tracing::info!("Lead {} cadastrado ({:?})", created.id, created.classification);
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i64,
        changes: UpdateLeadPayload,
        modified_by: &str,
    ) -> Result<Lead, AppError> {
        // Nada para gravar: responde antes de tocar no banco
        if changes.is_empty() {
            return Err(AppError::Validation("Nenhum campo válido para atualizar".to_string()));
        }
        changes.validate()?;

        self.repo
            .update(id, &changes, modified_by)
            .await?
            .ok_or_else(|| AppError::not_found("Lead"))
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Lead"))
        }
    }

    pub async fn export(&self, kind: ExportKind) -> Result<ExportFile, AppError> {
        let lines = match kind {
            ExportKind::Emails => self.repo.export_emails().await?,
            ExportKind::Phones => self.repo.export_phones().await?,
            ExportKind::Instagram => self.repo.export_instagrams().await?,
            ExportKind::Locations => self
                .repo
                .export_locations()
                .await?
                .iter()
                .map(render_location)
                .collect(),
        };

        Ok(ExportFile {
            filename: kind.filename(),
            content: lines.join("\n"),
        })
    }
}

// "Nome — Cidade, Estado, País"
fn render_location(row: &LocationRow) -> String {
    format!(
        "{} — {}, {}, {}",
        row.name,
        row.location_city,
        row.location_state.as_deref().unwrap_or_default(),
        row.location_country.as_deref().unwrap_or_default()
    )
}
