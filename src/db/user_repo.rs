// src/db/user_repo.rs

use sqlx::{types::Json, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{PermissionMap, User, UserRole},
};

// Perfis de usuário (tabela 'profiles')
#[derive(Clone, Default)]
pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self
    }

    // Busca um usuário pelo seu e-mail (login)
    pub async fn find_by_email<'e, E>(&self, executor: E, email: &str) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM profiles WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    pub async fn list<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM profiles WHERE tenant_id = $1 ORDER BY name ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;
        Ok(users)
    }

    // Cria um novo perfil; e-mail duplicado vira um erro amigável
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
        email: &str,
        password_hash: &str,
        role: UserRole,
        permissions: &PermissionMap,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO profiles (id, tenant_id, name, email, password_hash, role, permissions)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(name)
        .bind(email.trim().to_lowercase())
        .bind(password_hash)
        .bind(role)
        .bind(Json(permissions))
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    pub async fn update_user<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        name: &str,
        role: UserRole,
        permissions: &PermissionMap,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE profiles SET name = $3, role = $4, permissions = $5
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(name)
        .bind(role)
        .bind(Json(permissions))
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::UserNotFound)
    }

    pub async fn delete_user<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM profiles WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }
}
