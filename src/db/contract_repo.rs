// src/db/contract_repo.rs

use std::collections::HashMap;

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::contract::{
        Contract, ContractDetail, NewContract, NewServiceItem, ServiceItem, ServiceRevenue,
        UpdateContractPayload,
    },
};

// Contrato + dados do lead. LEFT JOIN porque o lead pode ter sido apagado.
const CONTRACT_SELECT: &str = r#"
    SELECT c.*, l.name AS lead_name, l.email AS lead_email, l.phone AS lead_phone
    FROM contracts c
    LEFT JOIN leads l ON l.id = c.lead_id
"#;

#[derive(Clone)]
pub struct ContractRepository {
    pool: PgPool,
}

impl ContractRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn list(&self, is_active: Option<bool>) -> Result<Vec<ContractDetail>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(CONTRACT_SELECT);
        if let Some(active) = is_active {
            builder.push(" WHERE c.is_active = ").push_bind(active);
        }
        builder.push(" ORDER BY c.created_at DESC, c.id DESC");

        let contracts = builder
            .build_query_as::<Contract>()
            .fetch_all(&self.pool)
            .await?;

        self.attach_services(&self.pool, contracts).await
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: i64,
    ) -> Result<Option<Contract>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut builder = QueryBuilder::<Postgres>::new(CONTRACT_SELECT);
        builder.push(" WHERE c.id = ").push_bind(id);

        let contract = builder
            .build_query_as::<Contract>()
            .fetch_optional(executor)
            .await?;
        Ok(contract)
    }

    /// Contrato com os seus serviços. Use dentro de transação para ler o que acabou de gravar.
    pub async fn find_detail(
        &self,
        conn: &mut sqlx::PgConnection,
        id: i64,
    ) -> Result<Option<ContractDetail>, AppError> {
        let Some(contract) = self.find_by_id(&mut *conn, id).await? else {
            return Ok(None);
        };
        let extracted_services = self.services_of(&mut *conn, &[id]).await?;
        Ok(Some(ContractDetail {
            contract,
            extracted_services,
        }))
    }

    /// Ativos, ainda não notificados, vencendo entre hoje e hoje + `days`.
    pub async fn list_renewals(&self, days: i32) -> Result<Vec<ContractDetail>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(CONTRACT_SELECT);
        builder
            .push(
                " WHERE c.is_active AND NOT c.renewal_notified \
                  AND c.end_date BETWEEN CURRENT_DATE AND CURRENT_DATE + ",
            )
            .push_bind(days)
            .push(" ORDER BY c.end_date ASC, c.id ASC");

        let contracts = builder
            .build_query_as::<Contract>()
            .fetch_all(&self.pool)
            .await?;

        self.attach_services(&self.pool, contracts).await
    }

    pub async fn service_stats(&self) -> Result<Vec<ServiceRevenue>, AppError> {
        let stats = sqlx::query_as::<_, ServiceRevenue>(
            r#"
            SELECT
                service_name,
                COUNT(*) AS contract_count,
                COALESCE(SUM(service_value), 0)::BIGINT AS total_revenue,
                ROUND(AVG(service_value), 2) AS avg_revenue
            FROM contract_services
            GROUP BY service_name
            ORDER BY total_revenue DESC, service_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn services_of<'e, E>(
        &self,
        executor: E,
        contract_ids: &[i64],
    ) -> Result<Vec<ServiceItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, ServiceItem>(
            r#"
            SELECT id, contract_id, service_name, service_value, created_at
            FROM contract_services
            WHERE contract_id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(contract_ids)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    // Uma consulta para os serviços de todos os contratos da página
    async fn attach_services<'e, E>(
        &self,
        executor: E,
        contracts: Vec<Contract>,
    ) -> Result<Vec<ContractDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if contracts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = contracts.iter().map(|c| c.id).collect();
        let mut by_contract: HashMap<i64, Vec<ServiceItem>> = HashMap::new();
        for item in self.services_of(executor, &ids).await? {
            by_contract.entry(item.contract_id).or_default().push(item);
        }

        Ok(contracts
            .into_iter()
            .map(|contract| ContractDetail {
                extracted_services: by_contract.remove(&contract.id).unwrap_or_default(),
                contract,
            })
            .collect())
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub async fn insert<'e, E>(&self, executor: E, contract: &NewContract) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO contracts (
                lead_id, contract_value, contract_duration, services,
                start_date, end_date, notes, created_by,
                processed_by_ai, ai_extracted_services
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(contract.lead_id)
        .bind(contract.contract_value)
        .bind(contract.contract_duration)
        .bind(&contract.services)
        .bind(contract.start_date)
        .bind(contract.end_date)
        .bind(&contract.notes)
        .bind(&contract.created_by)
        .bind(contract.processed_by_ai)
        .bind(&contract.ai_extracted_services)
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    pub async fn insert_services<'e, E>(
        &self,
        executor: E,
        contract_id: i64,
        items: &[NewServiceItem],
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if items.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO contract_services (contract_id, service_name, service_value) ",
        );
        builder.push_values(items, |mut row, item| {
            row.push_bind(contract_id)
                .push_bind(item.service_name.clone())
                .push_bind(item.service_value);
        });

        let result = builder.build().execute(executor).await?;
        Ok(result.rows_affected())
    }

    /// Atualiza os campos presentes e devolve o id, ou `None` se não existe.
    pub async fn update(
        &self,
        id: i64,
        changes: &UpdateContractPayload,
        modified_by: &str,
    ) -> Result<Option<i64>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE contracts SET ");
        let mut set = builder.separated(", ");

        if let Some(value) = changes.contract_value {
            set.push("contract_value = ").push_bind_unseparated(value);
        }
        if let Some(duration) = changes.contract_duration {
            set.push("contract_duration = ").push_bind_unseparated(duration);
        }
        if let Some(services) = &changes.services {
            set.push("services = ").push_bind_unseparated(services.clone());
        }
        if let Some(start_date) = changes.start_date {
            set.push("start_date = ").push_bind_unseparated(start_date);
        }
        if let Some(end_date) = changes.end_date {
            set.push("end_date = ").push_bind_unseparated(end_date);
        }
        if let Some(is_active) = changes.is_active {
            set.push("is_active = ").push_bind_unseparated(is_active);
        }
        if let Some(notified) = changes.renewal_notified {
            set.push("renewal_notified = ").push_bind_unseparated(notified);
        }
        if let Some(notes) = &changes.notes {
            set.push("notes = ").push_bind_unseparated(notes.clone());
        }

        set.push("last_modified_by = ").push_bind_unseparated(modified_by.to_string());
        set.push("last_modified_at = NOW()");

        builder.push(" WHERE id = ").push_bind(id).push(" RETURNING id");

        let updated = builder
            .build_query_scalar::<i64>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    /// Apaga o contrato. O banco remove os contract_services em cascata.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
