// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[schema(example = "125000.00")]
    pub open_pipeline_value: Decimal,
    pub open_deals: usize,
    // Negócios ganhos no mês corrente (data da última atividade = fechamento)
    pub won_this_month: Decimal,
    pub pending_receivables: Decimal,
    pub pending_payables: Decimal,
    pub overdue_records: usize,
    pub pending_tasks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum AlertKind {
    OverdueRecord,
    OverdueTask,
    StaleDeal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub kind: AlertKind,
    pub entity_id: Uuid,
    pub title: String,
    #[schema(value_type = String, format = Date)]
    pub reference_date: NaiveDate,
    // Dias de atraso (ou sem atividade)
    pub days: i64,
}
