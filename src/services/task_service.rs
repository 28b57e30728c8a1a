// src/services/task_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TaskRepository,
    models::tasks::{Task, TaskPayload},
};

#[derive(Clone)]
pub struct TaskService {
    repo: TaskRepository,
}

impl TaskService {
    pub fn new(repo: TaskRepository) -> Self {
        Self { repo }
    }

    pub async fn list<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor, tenant_id).await
    }

    pub async fn create<'e, E>(&self, executor: E, tenant_id: Uuid, payload: &TaskPayload) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.insert(executor, tenant_id, payload).await
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &TaskPayload,
    ) -> Result<Task, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.update(executor, tenant_id, id, payload).await
    }

    pub async fn delete<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.delete(executor, tenant_id, id).await
    }
}
