// src/db/task_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tasks::{Task, TaskPayload},
};

#[derive(Clone, Default)]
pub struct TaskRepository;

impl TaskRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE tenant_id = $1 ORDER BY due_date ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(tasks)
    }

    pub async fn insert<'e, E>(&self, executor: E, tenant_id: Uuid, input: &TaskPayload) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, tenant_id, title, kind, due_date, priority, status, company_id, related_to)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(input.id.unwrap_or_else(Uuid::new_v4))
        .bind(tenant_id)
        .bind(&input.title)
        .bind(input.kind)
        .bind(input.due_date)
        .bind(input.priority)
        .bind(input.status)
        .bind(input.company_id)
        .bind(&input.related_to)
        .fetch_one(executor)
        .await?;

        Ok(task)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        input: &TaskPayload,
    ) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks SET
                title = $3, kind = $4, due_date = $5, priority = $6, status = $7,
                company_id = $8, related_to = $9
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(&input.title)
        .bind(input.kind)
        .bind(input.due_date)
        .bind(input.priority)
        .bind(input.status)
        .bind(input.company_id)
        .bind(&input.related_to)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Tarefa"))
    }

    pub async fn delete<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Tarefa"));
        }
        Ok(())
    }
}
