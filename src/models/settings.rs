// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::auth::{PermissionMap, UserRole};

// --- PERFIL DA ORGANIZAÇÃO ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSettings {
    #[schema(ignore)] // O contexto (token) já define a organização
    pub tenant_id: Uuid,

    #[schema(example = "Ancóra Consultoria Ltda")]
    pub company_name: Option<String>,

    #[schema(example = "12.345.678/0001-99")]
    pub tax_id: Option<String>,

    #[schema(example = "Rua das Flores, 123 - Centro")]
    pub address: Option<String>,

    #[schema(example = "(11) 99999-8888")]
    pub phone: Option<String>,

    #[schema(example = "contato@ancora.com.br")]
    pub email: Option<String>,

    #[schema(example = "https://ancora.com.br/logo.png")]
    pub logo_url: Option<String>,

    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationRequest {
    pub company_name: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub logo_url: Option<String>,
}

// --- ETAPAS (Negócios e Tarefas) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum StageScope {
    Deal,
    Task,
}

impl StageScope {
    pub fn table(&self) -> &'static str {
        match self {
            StageScope::Deal => "deal_stages",
            StageScope::Task => "task_stages",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageConfig {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Proposta")]
    pub name: String,
    // 'order' é palavra reservada no SQL
    #[sqlx(rename = "position")]
    #[schema(example = 2)]
    pub order: i32,
    pub is_fixed: bool,
    pub is_visible: bool,
    // Etapa final de ganho (somente no funil de negócios)
    pub is_won: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StagePayload {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderStagesPayload {
    // Todas as etapas, na nova ordem
    pub ids: Vec<Uuid>,
}

// --- LISTAS (Segmentos, Tipos de Receita, Tags) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum LookupKind {
    Segments,
    RevenueTypes,
    Tags,
}

impl LookupKind {
    pub fn table(&self) -> &'static str {
        match self {
            LookupKind::Segments => "segments",
            LookupKind::RevenueTypes => "revenue_types",
            LookupKind::Tags => "tags",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LookupItem {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Consultoria")]
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LookupPayload {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub color: Option<String>,
}

// --- USUÁRIOS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,

    #[validate(email(message = "invalid_email"))]
    pub email: String,

    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,

    pub role: UserRole,

    // Ausente: padrão do colaborador
    #[schema(value_type = Option<Object>)]
    pub permissions: Option<PermissionMap>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub role: UserRole,
    #[schema(value_type = Object)]
    pub permissions: PermissionMap,
}

// --- IMPORTAÇÃO (CSV) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    Banks,
    Segments,
    RevenueTypes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub inserted: usize,
    // Duplicados (no tenant ou no próprio arquivo) e linhas sem nome
    pub ignored: usize,
}
