// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::validate_non_negative;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "record_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum RecordKind {
    Income,  // Entrada
    Expense, // Saída
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "record_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum RecordStatus {
    Pending,
    Paid,
    Overdue,
}

// --- Structs ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    #[schema(example = "Banco do Brasil")]
    pub name: String,

    #[schema(example = "1234-5")]
    pub agency: Option<String>,

    #[schema(example = "98765-0")]
    pub account: Option<String>,

    #[schema(example = "1500.50")]
    pub initial_balance: Decimal,

    pub created_at: DateTime<Utc>,
}

// Rubrica (plano de contas)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartAccount {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    #[schema(example = "3.1.01")]
    pub code: String,

    #[schema(example = "Receita de Serviços")]
    pub name: String,

    pub kind: RecordKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    #[schema(example = "Mensalidade Janeiro")]
    pub description: String,

    #[schema(example = "500.00")]
    pub amount: Decimal,

    pub kind: RecordKind,
    pub status: RecordStatus,

    // Datas
    #[schema(value_type = String, format = Date, example = "2025-01-31")]
    pub due_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub payment_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub competence_date: Option<NaiveDate>,

    #[schema(example = "Serviços")]
    pub category: Option<String>,

    // Vínculos
    pub company_id: Option<Uuid>,
    pub deal_id: Option<Uuid>,
    pub bank_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    pub revenue_type_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

impl FinancialRecord {
    /// Valor com sinal: positivo para entrada, negativo para saída.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            RecordKind::Income => self.amount,
            RecordKind::Expense => -self.amount,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == RecordStatus::Paid
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPayload {
    pub id: Option<Uuid>,

    #[validate(length(min = 1, message = "required"))]
    pub description: String,

    #[validate(custom(function = "validate_non_negative"))]
    pub amount: Decimal,

    pub kind: RecordKind,
    pub status: RecordStatus,

    #[schema(value_type = String, format = Date)]
    pub due_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub payment_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub competence_date: Option<NaiveDate>,

    pub category: Option<String>,
    pub company_id: Option<Uuid>,
    pub deal_id: Option<Uuid>,
    pub bank_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    pub revenue_type_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankPayload {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub agency: Option<String>,
    pub account: Option<String>,
    #[serde(default)]
    pub initial_balance: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartAccountPayload {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, message = "required"))]
    pub code: String,
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub kind: RecordKind,
}

// --- EXTRATO / FLUXO DE CAIXA ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[schema(example = "31/01")]
    pub label: String,
    pub realized: Decimal,
    pub projected: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatementRow {
    pub id: Uuid,
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub description: String,
    pub status: RecordStatus,
    pub entry: Option<Decimal>,
    pub exit: Option<Decimal>,
    pub balance: Decimal,
    // Futuro e ainda não pago: exibido em itálico
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowProjection {
    pub bank_id: Uuid,
    pub initial_balance: Decimal,
    pub projected_balance: Decimal,
    pub realized_balance: Decimal,
    pub chart: Vec<ChartPoint>,
    pub statement: Vec<StatementRow>,
}
