// src/db/tenancy_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::tenancy::Tenant};

#[derive(Clone, Default)]
pub struct TenantRepository;

impl TenantRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_tenant<'e, E>(&self, executor: E, name: &str) -> Result<Tenant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenant = sqlx::query_as::<_, Tenant>(
            "INSERT INTO tenants (id, name) VALUES ($1, $2) RETURNING id, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(executor)
        .await?;

        Ok(tenant)
    }
}
