// src/services/contract_service.rs

use std::sync::Arc;

use chrono::{Months, NaiveDate};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{ContractRepository, LeadRepository},
    models::contract::{
        ContractDetail, CreateContractPayload, NewContract, NewServiceItem, RenewalQuery,
        ServiceRevenue, UpdateContractPayload,
    },
    services::contract_extractor::{ContractExtraction, ContractExtractor},
};

const MISSING_TERMS: &str =
    "Informe o valor e duração do contrato, ou escreva uma descrição completa para a IA processar";

#[derive(Clone)]
pub struct ContractService {
    contracts: ContractRepository,
    leads: LeadRepository,
    extractor: Option<Arc<dyn ContractExtractor>>,
    pool: PgPool,
}

impl ContractService {
    pub fn new(
        contracts: ContractRepository,
        leads: LeadRepository,
        extractor: Option<Arc<dyn ContractExtractor>>,
        pool: PgPool,
    ) -> Self {
        Self {
            contracts,
            leads,
            extractor,
            pool,
        }
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn list(&self, is_active: Option<bool>) -> Result<Vec<ContractDetail>, AppError> {
        self.contracts.list(is_active).await
    }

    pub async fn get(&self, id: i64) -> Result<ContractDetail, AppError> {
        let mut conn = self.pool.acquire().await?;
        self.contracts
            .find_detail(&mut conn, id)
            .await?
            .ok_or_else(|| AppError::not_found("Contrato"))
    }

    pub async fn renewals(&self, query: &RenewalQuery) -> Result<Vec<ContractDetail>, AppError> {
        query.validate()?;
        self.contracts.list_renewals(query.days()).await
    }

    pub async fn service_stats(&self) -> Result<Vec<ServiceRevenue>, AppError> {
        self.contracts.service_stats().await
    }

    // =========================================================================
    //  CRIAÇÃO
    // =========================================================================

    /// Cria o contrato, grava os serviços extraídos e fecha o lead, tudo na mesma transação.
    pub async fn create(
        &self,
        payload: CreateContractPayload,
        actor: &str,
    ) -> Result<ContractDetail, AppError> {
        let (Some(lead_id), Some(start_date)) = (payload.lead_id, payload.start_date) else {
            return Err(AppError::Validation(
                "Campos obrigatórios: leadId, startDate".to_string(),
            ));
        };
        payload.validate()?;

        // Lead inexistente: nem chama a IA
        if self.leads.find_by_id(&self.pool, lead_id).await?.is_none() {
            return Err(AppError::not_found("Lead"));
        }

        let extraction = self.extract(payload.notes.as_deref()).await;

        let (contract_value, contract_duration) = resolve_terms(
            payload.contract_value,
            payload.contract_duration,
            extraction.as_ref(),
        );
        let (Some(contract_value), Some(contract_duration)) = (contract_value, contract_duration)
        else {
            return Err(AppError::Validation(MISSING_TERMS.to_string()));
        };

        let end_date = compute_end_date(start_date, contract_duration)?;

        let service_items = extraction.as_ref().map(service_rows).unwrap_or_default();
        let ai_extracted_services = extraction
            .as_ref()
            .map(|e| serde_json::to_value(&e.services))
            .transpose()
            .map_err(anyhow::Error::from)?;

        let new_contract = NewContract {
            lead_id,
            contract_value,
            contract_duration,
            services: payload.services,
            start_date,
            end_date,
            notes: payload.notes,
            created_by: actor.to_string(),
            processed_by_ai: extraction.is_some(),
            ai_extracted_services,
        };

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        let contract_id = self.contracts.insert(&mut *tx, &new_contract).await?;
        self.contracts
            .insert_services(&mut *tx, contract_id, &service_items)
            .await?;

        // Lead apagado no meio do caminho: desfaz tudo
        if self.leads.mark_closed(&mut *tx, lead_id, actor).await? == 0 {
            return Err(AppError::not_found("Lead"));
        }

        let detail = self
            .contracts
            .find_detail(&mut tx, contract_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Contrato {} sumiu dentro da transação", contract_id))?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!(
            "Contrato {} criado para o lead {} ({} serviços, IA: {})",
            contract_id,
            lead_id,
            service_items.len(),
            new_contract.processed_by_ai
        );

        Ok(detail)
    }

    // Extração best-effort. Sem extrator ou sem notas, segue sem IA.
    async fn extract(&self, notes: Option<&str>) -> Option<ContractExtraction> {
        let extractor = self.extractor.as_ref()?;
        let notes = notes.map(str::trim).filter(|n| !n.is_empty())?;

        match extractor.extract(notes).await {
            Ok(extraction) => Some(extraction),
            Err(e) => {
                tracing::warn!("Extração de contrato por IA falhou: {:#}", e);
                None
            }
        }
    }

    // =========================================================================
    //  ALTERAÇÃO
    // =========================================================================

    pub async fn update(
        &self,
        id: i64,
        changes: UpdateContractPayload,
        actor: &str,
    ) -> Result<ContractDetail, AppError> {
        if changes.is_empty() {
            return Err(AppError::Validation("Nenhum campo válido para atualizar".to_string()));
        }
        changes.validate()?;

        self.contracts
            .update(id, &changes, actor)
            .await?
            .ok_or_else(|| AppError::not_found("Contrato"))?;

        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if self.contracts.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Contrato"))
        }
    }
}

/// Valores explícitos do chamador sempre vencem. A IA só preenche lacunas.
pub fn resolve_terms(
    explicit_value: Option<i64>,
    explicit_duration: Option<i32>,
    extraction: Option<&ContractExtraction>,
) -> (Option<i64>, Option<i32>) {
    let value = explicit_value.or_else(|| extraction.and_then(|e| e.total_value).and_then(reais_to_cents));
    let duration = explicit_duration.or_else(|| extraction.and_then(ContractExtraction::duration_months));

    (
        value.filter(|v| *v > 0),
        duration.filter(|d| *d >= 1),
    )
}

/// Soma meses de calendário. Dia inexistente no mês de destino vai para o último dia
/// (31/01 + 1 mês = 29/02 em ano bissexto).
pub fn compute_end_date(start: NaiveDate, months: i32) -> Result<NaiveDate, AppError> {
    u32::try_from(months)
        .ok()
        .and_then(|m| start.checked_add_months(Months::new(m)))
        .ok_or_else(|| AppError::Validation("Data de término fora do intervalo suportado".to_string()))
}

pub fn reais_to_cents(reais: f64) -> Option<i64> {
    if !reais.is_finite() || reais <= 0.0 {
        return None;
    }
    Some((reais * 100.0).round() as i64)
}

// Serviços sem valor não viram linha em contract_services
fn service_rows(extraction: &ContractExtraction) -> Vec<NewServiceItem> {
    extraction
        .services
        .iter()
        .filter_map(|service| {
            let cents = service.value.and_then(reais_to_cents)?;
            let name = service.name.trim();
            (!name.is_empty()).then(|| NewServiceItem {
                service_name: name.to_string(),
                service_value: cents,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::contract_extractor::ExtractedService;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn extraction(total: Option<f64>, duration: Option<f64>) -> ContractExtraction {
        ContractExtraction {
            services: vec![
                ExtractedService { name: "Tráfego Pago".into(), value: Some(250.0) },
                ExtractedService { name: "Mídias Sociais".into(), value: Some(250.5) },
                ExtractedService { name: "Consultoria".into(), value: None },
            ],
            total_value: total,
            duration,
            total_contract: None,
        }
    }

    #[test]
    fn month_overflow_clamps_to_last_day() {
        assert_eq!(compute_end_date(date(2024, 1, 31), 1).unwrap(), date(2024, 2, 29));
        assert_eq!(compute_end_date(date(2023, 1, 31), 1).unwrap(), date(2023, 2, 28));
        assert_eq!(compute_end_date(date(2024, 3, 15), 12).unwrap(), date(2025, 3, 15));
    }

    #[test]
    fn negative_duration_has_no_end_date() {
        assert!(compute_end_date(date(2024, 1, 1), -1).is_err());
    }

    #[test]
    fn explicit_terms_beat_extraction() {
        let ai = extraction(Some(750.0), Some(3.0));
        assert_eq!(resolve_terms(Some(100_000), Some(12), Some(&ai)), (Some(100_000), Some(12)));
    }

    #[test]
    fn extraction_fills_only_the_gaps() {
        let ai = extraction(Some(750.0), Some(3.0));
        assert_eq!(resolve_terms(None, Some(12), Some(&ai)), (Some(75_000), Some(12)));
        assert_eq!(resolve_terms(Some(50_000), None, Some(&ai)), (Some(50_000), Some(3)));
    }

    #[test]
    fn unusable_terms_stay_missing() {
        let ai = extraction(None, None);
        assert_eq!(resolve_terms(None, None, Some(&ai)), (None, None));
        assert_eq!(resolve_terms(None, None, None), (None, None));
        assert_eq!(resolve_terms(Some(0), Some(0), None), (None, None));
    }

    #[test]
    fn reais_become_rounded_cents() {
        assert_eq!(reais_to_cents(1500.0), Some(150_000));
        assert_eq!(reais_to_cents(19.99), Some(1_999));
        assert_eq!(reais_to_cents(0.0), None);
        assert_eq!(reais_to_cents(f64::NAN), None);
    }

    #[test]
    fn only_priced_services_become_rows() {
        let rows = service_rows(&extraction(None, None));
        assert_eq!(
            rows,
            vec![
                NewServiceItem { service_name: "Tráfego Pago".into(), service_value: 25_000 },
                NewServiceItem { service_name: "Mídias Sociais".into(), service_value: 25_050 },
            ]
        );
    }
}
