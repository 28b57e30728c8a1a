// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "company_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum CompanyStatus {
    Prospect,
    Active,
    Churned,
}

// --- EMPRESAS (Clientes) ---

// Nota antiga embutida na empresa (antes de existir o bloco de notas geral)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyNote {
    pub id: Uuid,
    pub content: String,
    pub author: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    #[schema(example = "Padaria Pão Quente")]
    pub name: String,

    #[schema(example = "12.345.678/0001-99")]
    pub tax_id: Option<String>,

    #[schema(example = "Varejo")]
    pub segment: Option<String>,

    #[schema(example = "Curitiba - PR")]
    pub location: Option<String>,

    pub status: CompanyStatus,

    // Usuários responsáveis pela conta
    pub responsible_ids: Vec<Uuid>,

    #[sqlx(json)]
    pub notes: Vec<CompanyNote>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPayload {
    // Id gerado pelo cliente (atualização otimista)
    pub id: Option<Uuid>,

    #[validate(length(min = 1, message = "required"))]
    pub name: String,

    pub tax_id: Option<String>,
    pub segment: Option<String>,
    pub location: Option<String>,
    pub status: CompanyStatus,

    #[serde(default)]
    pub responsible_ids: Vec<Uuid>,

    #[serde(default)]
    pub notes: Vec<CompanyNote>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCompanyNotePayload {
    #[validate(length(min = 1, message = "required"))]
    pub content: String,
}

// --- EDIÇÃO EM MASSA ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum BulkEditField {
    Status(CompanyStatus),
    Segment(String),
    Location(String),
    Responsible(Vec<Uuid>),
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkEditPayload {
    pub ids: Vec<Uuid>,
    pub change: BulkEditField,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkEditResult {
    pub updated: usize,
}

// --- CONTATOS ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub company_id: Option<Uuid>,
    #[schema(example = "Carlos Lima")]
    pub name: String,
    #[schema(example = "Diretor Financeiro")]
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    pub id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub role: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

// --- BLOCO DE NOTAS ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneralNote {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub title: String,
    pub content: String,
    #[schema(example = "Reunião")]
    pub category: Option<String>,
    #[schema(example = "yellow")]
    pub color: Option<String>,
    pub author: String,
    pub date: DateTime<Utc>,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotePayload {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub category: Option<String>,
    pub color: Option<String>,
    pub company_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_payload_reads_tagged_field() {
        let payload: BulkEditPayload = serde_json::from_value(serde_json::json!({
            "ids": [Uuid::nil()],
            "change": { "field": "status", "value": "active" }
        }))
        .unwrap();

        assert_eq!(payload.change, BulkEditField::Status(CompanyStatus::Active));
        assert_eq!(payload.ids.len(), 1);
    }
}
