// src/services/deal_service.rs

use chrono::Utc;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CrmRepository, DealRepository, FinanceRepository, SettingsRepository},
    models::{
        deals::{
            AddInteractionPayload, ConfirmWonPayload, Deal, DealFilter, DealPayload, DealStage,
            Interaction, InteractionKind, MoveOutcome, MoveTarget, PipelineBoard, WonResult,
        },
        finance::{RecordKind, RecordPayload, RecordStatus},
        settings::StageScope,
    },
    services::pipeline::{self, Resolved, LOST_COLUMN},
};

#[derive(Clone)]
pub struct DealService {
    repo: DealRepository,
    crm_repo: CrmRepository,
    settings_repo: SettingsRepository,
    finance_repo: FinanceRepository,
}

impl DealService {
    pub fn new(
        repo: DealRepository,
        crm_repo: CrmRepository,
        settings_repo: SettingsRepository,
        finance_repo: FinanceRepository,
    ) -> Self {
        Self { repo, crm_repo, settings_repo, finance_repo }
    }

    pub async fn list<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Deal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor, tenant_id).await
    }

    pub async fn create<'e, E>(&self, executor: E, tenant_id: Uuid, payload: &DealPayload) -> Result<Deal, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let stages = self.settings_repo.list_stages(&mut *conn, tenant_id, StageScope::Deal).await?;
        pipeline::check_form_stage(&stages, &payload.stage, None)?;

        self.repo.insert(&mut *conn, tenant_id, payload, &payload.stage).await
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &DealPayload,
    ) -> Result<Deal, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let current = self.repo.find(&mut *conn, tenant_id, id).await?;
        let stages = self.settings_repo.list_stages(&mut *conn, tenant_id, StageScope::Deal).await?;
        pipeline::check_form_stage(&stages, &payload.stage, Some(&current.stage))?;

        self.repo.update(&mut *conn, tenant_id, id, payload, &payload.stage).await
    }

    pub async fn delete<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.delete(executor, tenant_id, id).await
    }

    pub async fn board<'e, E>(&self, executor: E, tenant_id: Uuid, filter: &DealFilter) -> Result<PipelineBoard, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let stages = self.settings_repo.list_stages(&mut *conn, tenant_id, StageScope::Deal).await?;
        let deals = self.repo.list(&mut *conn, tenant_id).await?;
        let companies = self.crm_repo.list_companies(&mut *conn, tenant_id).await?;

        Ok(pipeline::build_board(&stages, &deals, &companies, filter))
    }

    /// Arrasto no quadro. Ganho não grava nada: devolve o rascunho do lançamento.
    pub async fn move_deal<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        target: &MoveTarget,
        author: &str,
    ) -> Result<MoveOutcome, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let deal = self.repo.find(&mut *conn, tenant_id, id).await?;
        let stages = self.settings_repo.list_stages(&mut *conn, tenant_id, StageScope::Deal).await?;

        let new_stage = match pipeline::resolve_target(&stages, target)? {
            Resolved::NeedsConfirmation => {
                if deal.stage == DealStage::Won {
                    return Err(AppError::DealAlreadyWon);
                }
                let draft = pipeline::won_draft(&deal, Utc::now().date_naive());
                return Ok(MoveOutcome::ConfirmationRequired { deal, draft });
            }
            Resolved::Stage(stage) => stage,
        };

        // Soltou na mesma coluna
        if new_stage == deal.stage {
            return Ok(MoveOutcome::Moved { deal });
        }

        let label = new_stage.stage_name().unwrap_or(LOST_COLUMN);
        let interaction = Interaction {
            kind: InteractionKind::StageChange,
            description: format!("Movido para {}", label),
            date: Utc::now(),
            author: author.to_string(),
        };

        let deal = self
            .repo
            .set_stage(&mut *conn, tenant_id, id, &new_stage, &interaction)
            .await?;

        Ok(MoveOutcome::Moved { deal })
    }

    /// Confirmação do ganho: etapa, histórico e lançamento na mesma transação.
    pub async fn confirm_won<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &ConfirmWonPayload,
        author: &str,
    ) -> Result<WonResult, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let deal = self.repo.find(&mut *tx, tenant_id, id).await?;
        if deal.stage == DealStage::Won {
            return Err(AppError::DealAlreadyWon);
        }

        let now = Utc::now();
        let record_input = RecordPayload {
            id: None,
            description: payload.description.clone(),
            amount: payload.amount,
            kind: RecordKind::Income,
            status: if payload.paid { RecordStatus::Paid } else { RecordStatus::Pending },
            due_date: payload.due_date,
            payment_date: payload.paid.then(|| now.date_naive()),
            competence_date: None,
            category: payload.category.clone(),
            company_id: deal.company_id,
            deal_id: Some(deal.id),
            bank_id: payload.bank_id,
            account_id: payload.account_id,
            revenue_type_id: payload.revenue_type_id.or(deal.revenue_type_id),
        };

        let interaction = Interaction {
            kind: InteractionKind::StageChange,
            description: format!("Negócio ganho: {}", payload.description),
            date: now,
            author: author.to_string(),
        };

        let deal = self
            .repo
            .set_stage(&mut *tx, tenant_id, id, &DealStage::Won, &interaction)
            .await?;
        let record = self.finance_repo.insert_record(&mut *tx, tenant_id, &record_input).await?;

        tx.commit().await?;

        tracing::info!("Negócio {} ganho; lançamento {} criado", deal.id, record.id);
        Ok(WonResult { deal, record })
    }

    pub async fn add_interaction<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &AddInteractionPayload,
        author: &str,
    ) -> Result<Deal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let interaction = Interaction {
            kind: payload.kind,
            description: payload.description.clone(),
            date: Utc::now(),
            author: author.to_string(),
        };

        self.repo.append_interaction(executor, tenant_id, id, &interaction).await
    }
}
