// src/db/dashboard_repo.rs

use sqlx::PgPool;

use crate::{common::error::AppError, models::dashboard::ChartEntry};

/// Números brutos do painel, todos lidos do mesmo snapshot.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub total_leads: i64,
    pub closed_leads: i64,
    pub recent_leads: i64,
    pub active_contracts: i64,
    pub total_value: i64,
    pub renewal_count: i64,
    pub leads_by_classification: Vec<ChartEntry>,
    pub leads_by_status: Vec<ChartEntry>,
}

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn snapshot(&self) -> Result<DashboardSnapshot, AppError> {
        // Iniciamos uma transação (Snapshot consistente dos dados)
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        // A. Funil de leads
        let (total_leads, closed_leads, recent_leads) = sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE status = 'fechado'),
                COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '7 days')
            FROM leads
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // B. Contratos ativos e receita
        let (active_contracts, total_value) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(contract_value), 0)::BIGINT
            FROM contracts
            WHERE is_active
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // C. Renovações nos próximos 30 dias (vencidos ficam de fora)
        let renewal_count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM contracts
            WHERE is_active
              AND end_date BETWEEN CURRENT_DATE AND CURRENT_DATE + 30
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        // D. Gráficos
        let leads_by_classification = sqlx::query_as::<_, ChartEntry>(
            r#"
            SELECT classification::TEXT AS name, COUNT(*) AS value
            FROM leads
            GROUP BY classification
            ORDER BY classification
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let leads_by_status = sqlx::query_as::<_, ChartEntry>(
            r#"
            SELECT status::TEXT AS name, COUNT(*) AS value
            FROM leads
            GROUP BY status
            ORDER BY status
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSnapshot {
            total_leads,
            closed_leads,
            recent_leads,
            active_contracts,
            total_value,
            renewal_count,
            leads_by_classification,
            leads_by_status,
        })
    }
}
