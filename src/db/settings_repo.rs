// src/db/settings_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::settings::{
        LookupItem, LookupKind, OrganizationSettings, StageConfig, StageScope,
        UpdateOrganizationRequest,
    },
};

#[derive(Clone, Default)]
pub struct SettingsRepository;

impl SettingsRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  PERFIL DA ORGANIZAÇÃO
    // =========================================================================

    pub async fn get_settings<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<OrganizationSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, OrganizationSettings>(
            "SELECT * FROM organization_settings WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        // Organização sem perfil salvo: devolve tudo vazio
        Ok(settings.unwrap_or(OrganizationSettings {
            tenant_id,
            company_name: None,
            tax_id: None,
            address: None,
            phone: None,
            email: None,
            logo_url: None,
            updated_at: None,
        }))
    }

    // UPSERT (Insert or Update)
    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &UpdateOrganizationRequest,
    ) -> Result<OrganizationSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, OrganizationSettings>(
            r#"
            INSERT INTO organization_settings (tenant_id, company_name, tax_id, address, phone, email, logo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (tenant_id)
            DO UPDATE SET
                company_name = EXCLUDED.company_name,
                tax_id = EXCLUDED.tax_id,
                address = EXCLUDED.address,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                logo_url = EXCLUDED.logo_url,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(&input.company_name)
        .bind(&input.tax_id)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.logo_url)
        .fetch_one(executor)
        .await?;

        Ok(settings)
    }

    // =========================================================================
    //  ETAPAS
    // =========================================================================

    pub async fn list_stages<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        scope: StageScope,
    ) -> Result<Vec<StageConfig>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT * FROM {} WHERE tenant_id = $1 ORDER BY position ASC",
            scope.table()
        );
        let stages = sqlx::query_as::<_, StageConfig>(&sql)
            .bind(tenant_id)
            .fetch_all(executor)
            .await?;

        Ok(stages)
    }

    pub async fn insert_stage<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        scope: StageScope,
        stage: &StageConfig,
    ) -> Result<StageConfig, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO {} (id, tenant_id, name, position, is_fixed, is_visible, is_won)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
            scope.table()
        );
        sqlx::query_as::<_, StageConfig>(&sql)
            .bind(stage.id)
            .bind(tenant_id)
            .bind(&stage.name)
            .bind(stage.order)
            .bind(stage.is_fixed)
            .bind(stage.is_visible)
            .bind(stage.is_won)
            .fetch_one(executor)
            .await
            .map_err(|e| map_unique_violation(e, &stage.name))
    }

    pub async fn update_stage<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        scope: StageScope,
        id: Uuid,
        name: &str,
        is_visible: bool,
    ) -> Result<StageConfig, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE {} SET name = $3, is_visible = $4 WHERE tenant_id = $1 AND id = $2 RETURNING *",
            scope.table()
        );
        sqlx::query_as::<_, StageConfig>(&sql)
            .bind(tenant_id)
            .bind(id)
            .bind(name)
            .bind(is_visible)
            .fetch_optional(executor)
            .await
            .map_err(|e| map_unique_violation(e, name))?
            .ok_or(AppError::NotFound("Etapa"))
    }

    pub async fn set_stage_position<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        scope: StageScope,
        id: Uuid,
        position: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE {} SET position = $3 WHERE tenant_id = $1 AND id = $2",
            scope.table()
        );
        sqlx::query(&sql)
            .bind(tenant_id)
            .bind(id)
            .bind(position)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn delete_stage<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        scope: StageScope,
        id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("DELETE FROM {} WHERE tenant_id = $1 AND id = $2", scope.table());
        let result = sqlx::query(&sql)
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Etapa"));
        }
        Ok(())
    }

    // =========================================================================
    //  LISTAS (Segmentos, Tipos de Receita, Tags)
    // =========================================================================

    pub async fn list_lookups<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        kind: LookupKind,
    ) -> Result<Vec<LookupItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT * FROM {} WHERE tenant_id = $1 ORDER BY name ASC",
            kind.table()
        );
        let items = sqlx::query_as::<_, LookupItem>(&sql)
            .bind(tenant_id)
            .fetch_all(executor)
            .await?;

        Ok(items)
    }

    pub async fn insert_lookup<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        kind: LookupKind,
        id: Option<Uuid>,
        name: &str,
        color: Option<&str>,
    ) -> Result<LookupItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO {} (id, tenant_id, name, color) VALUES ($1, $2, $3, $4) RETURNING *",
            kind.table()
        );
        let item = sqlx::query_as::<_, LookupItem>(&sql)
            .bind(id.unwrap_or_else(Uuid::new_v4))
            .bind(tenant_id)
            .bind(name)
            .bind(color)
            .fetch_one(executor)
            .await?;

        Ok(item)
    }

    pub async fn update_lookup<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        kind: LookupKind,
        id: Uuid,
        name: &str,
        color: Option<&str>,
    ) -> Result<LookupItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE {} SET name = $3, color = $4 WHERE tenant_id = $1 AND id = $2 RETURNING *",
            kind.table()
        );
        sqlx::query_as::<_, LookupItem>(&sql)
            .bind(tenant_id)
            .bind(id)
            .bind(name)
            .bind(color)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NotFound("Item"))
    }

    pub async fn delete_lookup<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        kind: LookupKind,
        id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("DELETE FROM {} WHERE tenant_id = $1 AND id = $2", kind.table());
        let result = sqlx::query(&sql)
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item"));
        }
        Ok(())
    }
}
