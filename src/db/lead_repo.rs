// src/db/lead_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::lead::{Lead, LeadFilter, LocationRow, NewLead, UpdateLeadPayload},
};

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    /// Lista leads do mais novo para o mais antigo, com filtros opcionais.
    pub async fn list(&self, filter: &LeadFilter) -> Result<Vec<Lead>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM leads WHERE 1 = 1");

        if let Some(classification) = filter.classification {
            builder.push(" AND classification = ").push_bind(classification);
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search);
            builder
                .push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR phone ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        builder.push(" ORDER BY created_at DESC, id DESC");

        let leads = builder.build_query_as::<Lead>().fetch_all(&self.pool).await?;
        Ok(leads)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(lead)
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub async fn create(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let location = lead.location.clone().unwrap_or_default();
        let [q1, q2, q3, q4, q5, q6, q7] = &lead.questions;

        let created = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                name, email, phone, instagram, score, classification,
                question1, question2, question3, question4, question5, question6, question7,
                ip_address, location_city, location_state, location_country,
                location_latitude, location_longitude,
                observations, created_by
            )
            VALUES (
                $1, $2, $3, $4, $5, $6,
                $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17,
                $18, $19,
                $20, $21
            )
            RETURNING *
            "#,
        )
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.instagram)
        .bind(lead.score)
        .bind(lead.classification)
        .bind(q1)
        .bind(q2)
        .bind(q3)
        .bind(q4)
        .bind(q5)
        .bind(q6)
        .bind(q7)
        .bind(&lead.ip_address)
        .bind(location.city)
        .bind(location.state)
        .bind(location.country)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(&lead.observations)
        .bind(&lead.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Atualiza só os campos presentes no payload e carimba a auditoria.
    /// `None` quando o id não existe. O chamador garante que o payload não está vazio.
    pub async fn update(
        &self,
        id: i64,
        changes: &UpdateLeadPayload,
        modified_by: &str,
    ) -> Result<Option<Lead>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE leads SET ");
        let mut set = builder.separated(", ");

        if let Some(name) = &changes.name {
            set.push("name = ").push_bind_unseparated(name.clone());
        }
        if let Some(email) = &changes.email {
            set.push("email = ").push_bind_unseparated(email.clone());
        }
        if let Some(phone) = &changes.phone {
            set.push("phone = ").push_bind_unseparated(phone.clone());
        }
        if let Some(instagram) = &changes.instagram {
            set.push("instagram = ").push_bind_unseparated(instagram.clone());
        }
        if let Some(score) = changes.score {
            set.push("score = ").push_bind_unseparated(score);
        }
        if let Some(classification) = changes.classification {
            set.push("classification = ").push_bind_unseparated(classification);
        }
        if let Some(status) = changes.status {
            set.push("status = ").push_bind_unseparated(status);
        }
        if let Some(observations) = &changes.observations {
            set.push("observations = ").push_bind_unseparated(observations.clone());
        }
        for (index, answer) in changes.questions().into_iter().enumerate() {
            if let Some(answer) = answer {
                set.push(format!("question{} = ", index + 1))
                    .push_bind_unseparated(answer.clone());
            }
        }

        set.push("last_modified_by = ").push_bind_unseparated(modified_by.to_string());
        set.push("last_modified_at = NOW()");

        builder.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        let lead = builder
            .build_query_as::<Lead>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(lead)
    }

    /// Fecha o lead (status `fechado`) dentro da transação de criação de contrato.
    pub async fn mark_closed<'e, E>(
        &self,
        executor: E,
        id: i64,
        modified_by: &str,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE leads
            SET status = 'fechado', last_modified_by = $2, last_modified_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(modified_by)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Apaga o lead. Contratos ficam com o lead_id órfão.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  EXPORTAÇÃO (mesma ordem da listagem)
    // =========================================================================

    pub async fn export_emails(&self) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT email FROM leads ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn export_phones(&self) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT phone FROM leads ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn export_instagrams(&self) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query_scalar::<_, String>(
            r#"
            SELECT instagram FROM leads
            WHERE instagram IS NOT NULL
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn export_locations(&self) -> Result<Vec<LocationRow>, AppError> {
        let rows = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT name, location_city, location_state, location_country
            FROM leads
            WHERE location_city IS NOT NULL
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
