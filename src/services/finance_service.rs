// src/services/finance_service.rs

use chrono::Utc;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FinanceRepository,
    models::finance::{
        Bank, BankPayload, CashFlowProjection, ChartAccount, ChartAccountPayload, FinancialRecord,
        RecordPayload,
    },
    services::cashflow,
};

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  LANÇAMENTOS
    // =========================================================================

    pub async fn list_records<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<FinancialRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_records(executor, tenant_id).await
    }

    pub async fn create_record<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &RecordPayload,
    ) -> Result<FinancialRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.insert_record(executor, tenant_id, payload).await
    }

    pub async fn update_record<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &RecordPayload,
    ) -> Result<FinancialRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.update_record(executor, tenant_id, id, payload).await
    }

    pub async fn delete_record<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.delete_record(executor, tenant_id, id).await
    }

    // =========================================================================
    //  BANCOS
    // =========================================================================

    pub async fn list_banks<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Bank>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_banks(executor, tenant_id).await
    }

    pub async fn create_bank<'e, E>(&self, executor: E, tenant_id: Uuid, payload: &BankPayload) -> Result<Bank, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .insert_bank(
                executor,
                tenant_id,
                payload.id,
                payload.name.trim(),
                payload.agency.as_deref(),
                payload.account.as_deref(),
                payload.initial_balance,
            )
            .await
    }

    pub async fn update_bank<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &BankPayload,
    ) -> Result<Bank, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.update_bank(executor, tenant_id, id, payload).await
    }

    pub async fn delete_bank<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.delete_bank(executor, tenant_id, id).await
    }

    /// Extrato com saldo projetado e realizado até hoje.
    pub async fn statement<'e, E>(&self, executor: E, tenant_id: Uuid, bank_id: Uuid) -> Result<CashFlowProjection, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let bank = self.repo.find_bank(&mut *conn, tenant_id, bank_id).await?;
        let records = self.repo.list_records_by_bank(&mut *conn, tenant_id, bank_id).await?;

        Ok(cashflow::project(&bank, &records, Utc::now().date_naive()))
    }

    // =========================================================================
    //  PLANO DE CONTAS
    // =========================================================================

    pub async fn list_accounts<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<ChartAccount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_accounts(executor, tenant_id).await
    }

    pub async fn create_account<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &ChartAccountPayload,
    ) -> Result<ChartAccount, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.insert_account(executor, tenant_id, payload).await
    }

    pub async fn update_account<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &ChartAccountPayload,
    ) -> Result<ChartAccount, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.update_account(executor, tenant_id, id, payload).await
    }

    pub async fn delete_account<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.delete_account(executor, tenant_id, id).await
    }
}
