// src/db/deal_repo.rs

use sqlx::{types::Json, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::deals::{Deal, DealPayload, DealStage, Interaction},
};

#[derive(Clone, Default)]
pub struct DealRepository;

impl DealRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Deal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deals = sqlx::query_as::<_, Deal>(
            "SELECT * FROM deals WHERE tenant_id = $1 ORDER BY created_at ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(deals)
    }

    pub async fn find<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<Deal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Deal>("SELECT * FROM deals WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NotFound("Negócio"))
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &DealPayload,
        stage: &DealStage,
    ) -> Result<Deal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deal = sqlx::query_as::<_, Deal>(
            r#"
            INSERT INTO deals (
                id, tenant_id, title, value, outcome, stage, company_id,
                probability, temperature, revenue_type_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(input.id.unwrap_or_else(Uuid::new_v4))
        .bind(tenant_id)
        .bind(&input.title)
        .bind(input.value)
        .bind(stage.outcome())
        .bind(stage.stage_name())
        .bind(input.company_id)
        .bind(input.probability)
        .bind(input.temperature)
        .bind(input.revenue_type_id)
        .fetch_one(executor)
        .await?;

        Ok(deal)
    }

    // Atualização pelo formulário: o histórico de interações é preservado
    pub async fn update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        input: &DealPayload,
        stage: &DealStage,
    ) -> Result<Deal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Deal>(
            r#"
            UPDATE deals SET
                title = $3, value = $4, outcome = $5, stage = $6, company_id = $7,
                probability = $8, temperature = $9, revenue_type_id = $10,
                won_at = CASE WHEN $5 = 'WON' THEN COALESCE(won_at, NOW()) END
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(&input.title)
        .bind(input.value)
        .bind(stage.outcome())
        .bind(stage.stage_name())
        .bind(input.company_id)
        .bind(input.probability)
        .bind(input.temperature)
        .bind(input.revenue_type_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Negócio"))
    }

    pub async fn delete<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM deals WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Negócio"));
        }
        Ok(())
    }

    /// Troca a etapa e registra a interação correspondente.
    pub async fn set_stage<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        stage: &DealStage,
        interaction: &Interaction,
    ) -> Result<Deal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Deal>(
            r#"
            UPDATE deals SET
                outcome = $3, stage = $4,
                interactions = interactions || $5::jsonb,
                last_activity = $6,
                won_at = CASE WHEN $3 = 'WON' THEN COALESCE(won_at, $6) END
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(stage.outcome())
        .bind(stage.stage_name())
        .bind(Json([interaction]))
        .bind(interaction.date)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Negócio"))
    }

    pub async fn append_interaction<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        interaction: &Interaction,
    ) -> Result<Deal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Deal>(
            r#"
            UPDATE deals SET interactions = interactions || $3::jsonb, last_activity = $4
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(Json([interaction]))
        .bind(interaction.date)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Negócio"))
    }

    // Renomear uma etapa arrasta junto os negócios abertos que a usam
    pub async fn rename_stage<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        old_name: &str,
        new_name: &str,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE deals SET stage = $3 WHERE tenant_id = $1 AND outcome = 'OPEN' AND stage = $2",
        )
        .bind(tenant_id)
        .bind(old_name)
        .bind(new_name)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
