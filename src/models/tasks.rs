// src/models/tasks.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum TaskKind {
    Task,
    Meeting,
    Call,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    Pending,
    Done,
}

// Tarefas e reuniões (diferenciadas por 'kind')
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Ligar para o financeiro")]
    pub title: String,
    pub kind: TaskKind,
    #[schema(value_type = String, format = Date)]
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub company_id: Option<Uuid>,
    #[schema(example = "Proposta ERP")]
    pub related_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    pub kind: TaskKind,
    #[schema(value_type = String, format = Date)]
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub company_id: Option<Uuid>,
    pub related_to: Option<String>,
}
