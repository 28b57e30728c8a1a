// src/models/deals.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, types::Json, FromRow, Row};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::validate_non_negative;

use crate::models::finance::FinancialRecord;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "deal_temperature", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum Temperature {
    Hot,
    Warm,
    Cold,
}

// Coluna 'outcome' da tabela deals
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "deal_outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealOutcome {
    Open,
    Won,
    Lost,
}

/// Situação do negócio no funil. Ganho e perdido são estados próprios,
/// não nomes de etapa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DealStage {
    Open { stage: String },
    Won,
    Lost,
}

impl DealStage {
    pub fn open(stage: impl Into<String>) -> Self {
        DealStage::Open { stage: stage.into() }
    }

    pub fn outcome(&self) -> DealOutcome {
        match self {
            DealStage::Open { .. } => DealOutcome::Open,
            DealStage::Won => DealOutcome::Won,
            DealStage::Lost => DealOutcome::Lost,
        }
    }

    pub fn stage_name(&self) -> Option<&str> {
        match self {
            DealStage::Open { stage } => Some(stage),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, DealStage::Open { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum InteractionKind {
    Note,
    Call,
    Email,
    Meeting,
    StageChange,
}

// Item do histórico (somente acréscimo)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub kind: InteractionKind,
    pub description: String,
    pub date: DateTime<Utc>,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    #[schema(example = "Implantação ERP")]
    pub title: String,

    #[schema(example = "15000.00")]
    pub value: Decimal,

    pub stage: DealStage,

    pub company_id: Option<Uuid>,

    #[schema(example = 60)]
    pub probability: i32,

    pub temperature: Temperature,

    pub revenue_type_id: Option<Uuid>,

    pub interactions: Vec<Interaction>,

    pub last_activity: DateTime<Utc>,

    /// Momento da confirmação do ganho. Vazio enquanto não ganho.
    pub won_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

// A etapa vem de duas colunas (outcome + stage), então o FromRow é manual.
impl<'r> FromRow<'r, PgRow> for Deal {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let outcome: DealOutcome = row.try_get("outcome")?;
        let stage_name: Option<String> = row.try_get("stage")?;

        let stage = match (outcome, stage_name) {
            (DealOutcome::Won, _) => DealStage::Won,
            (DealOutcome::Lost, _) => DealStage::Lost,
            (DealOutcome::Open, Some(stage)) => DealStage::Open { stage },
            (DealOutcome::Open, None) => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "stage".into(),
                    source: "negócio aberto sem etapa".into(),
                });
            }
        };

        let Json(interactions): Json<Vec<Interaction>> = row.try_get("interactions")?;

        Ok(Deal {
            id: row.try_get("id")?,
            tenant_id: row.try_get("tenant_id")?,
            title: row.try_get("title")?,
            value: row.try_get("value")?,
            stage,
            company_id: row.try_get("company_id")?,
            probability: row.try_get("probability")?,
            temperature: row.try_get("temperature")?,
            revenue_type_id: row.try_get("revenue_type_id")?,
            interactions,
            last_activity: row.try_get("last_activity")?,
            won_at: row.try_get("won_at")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealPayload {
    pub id: Option<Uuid>,

    #[validate(length(min = 1, message = "required"))]
    pub title: String,

    #[validate(custom(function = "validate_non_negative"))]
    pub value: Decimal,

    pub stage: DealStage,

    pub company_id: Option<Uuid>,

    #[validate(range(min = 0, max = 100, message = "invalid_probability"))]
    pub probability: i32,

    pub temperature: Temperature,

    pub revenue_type_id: Option<Uuid>,
}

// --- FUNIL (Kanban) ---

/// Destino de um arrasto no quadro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", content = "stage", rename_all = "camelCase")]
pub enum MoveTarget {
    Stage(String),
    Won,
    Lost,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveDealPayload {
    pub target: MoveTarget,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum MoveOutcome {
    /// A mudança foi gravada.
    Moved { deal: Deal },
    /// Ganho precisa do formulário de faturamento; nada foi alterado.
    ConfirmationRequired { deal: Deal, draft: WonRecordDraft },
}

// Sugestão de lançamento apresentada no formulário de confirmação
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WonRecordDraft {
    pub description: String,
    pub amount: Decimal,
    #[schema(value_type = String, format = Date)]
    pub due_date: NaiveDate,
    pub revenue_type_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmWonPayload {
    #[validate(length(min = 1, message = "required"))]
    pub description: String,

    #[validate(custom(function = "validate_non_negative"))]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-01-31")]
    pub due_date: NaiveDate,

    pub category: Option<String>,
    pub bank_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    pub revenue_type_id: Option<Uuid>,

    // Já recebido no ato do fechamento?
    #[serde(default)]
    pub paid: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WonResult {
    pub deal: Deal,
    pub record: FinancialRecord,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddInteractionPayload {
    pub kind: InteractionKind,
    #[validate(length(min = 1, message = "required"))]
    pub description: String,
}

/// Filtros do quadro; todos combinados com E.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DealFilter {
    /// Trecho do título
    pub search: Option<String>,
    /// Usuário responsável pela empresa vinculada
    pub responsible_id: Option<Uuid>,
    pub revenue_type_id: Option<Uuid>,
    #[param(value_type = Option<String>, format = Date)]
    pub created_from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub created_to: Option<NaiveDate>,
    pub temperature: Option<Temperature>,
    /// Trecho do nome da empresa vinculada
    pub company: Option<String>,
    pub segment: Option<String>,
    pub min_value: Option<Decimal>,
    pub max_value: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ColumnKind {
    Stage,
    AdHoc,
    Won,
    Lost,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub name: String,
    pub kind: ColumnKind,
    pub order: i32,
    pub is_fixed: bool,
    pub total: Decimal,
    pub deals: Vec<Deal>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PipelineBoard {
    pub columns: Vec<BoardColumn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_is_tagged_by_status() {
        let open = serde_json::to_value(DealStage::open("Proposta")).unwrap();
        assert_eq!(open, serde_json::json!({ "status": "open", "stage": "Proposta" }));

        let won: DealStage = serde_json::from_value(serde_json::json!({ "status": "won" })).unwrap();
        assert_eq!(won, DealStage::Won);
    }

    #[test]
    fn move_target_reads_stage_name() {
        let t: MoveTarget =
            serde_json::from_value(serde_json::json!({ "kind": "stage", "stage": "Negociação" }))
                .unwrap();
        assert_eq!(t, MoveTarget::Stage("Negociação".into()));
    }
}
