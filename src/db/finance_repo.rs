// src/db/finance_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{
        Bank, BankPayload, ChartAccount, ChartAccountPayload, FinancialRecord, RecordPayload,
    },
};

#[derive(Clone, Default)]
pub struct FinanceRepository;

impl FinanceRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  LANÇAMENTOS
    // =========================================================================

    pub async fn list_records<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<FinancialRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let records = sqlx::query_as::<_, FinancialRecord>(
            "SELECT * FROM financial_records WHERE tenant_id = $1 ORDER BY due_date ASC, created_at ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(records)
    }

    // Lançamentos de uma conta bancária (extrato)
    pub async fn list_records_by_bank<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        bank_id: Uuid,
    ) -> Result<Vec<FinancialRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let records = sqlx::query_as::<_, FinancialRecord>(
            r#"
            SELECT * FROM financial_records
            WHERE tenant_id = $1 AND bank_id = $2
            ORDER BY due_date ASC, created_at ASC
            "#,
        )
        .bind(tenant_id)
        .bind(bank_id)
        .fetch_all(executor)
        .await?;

        Ok(records)
    }

    pub async fn insert_record<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &RecordPayload,
    ) -> Result<FinancialRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, FinancialRecord>(
            r#"
            INSERT INTO financial_records (
                id, tenant_id, description, amount, kind, status,
                due_date, payment_date, competence_date, category,
                company_id, deal_id, bank_id, account_id, revenue_type_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(input.id.unwrap_or_else(Uuid::new_v4))
        .bind(tenant_id)
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.kind)
        .bind(input.status)
        .bind(input.due_date)
        .bind(input.payment_date)
        .bind(input.competence_date)
        .bind(&input.category)
        .bind(input.company_id)
        .bind(input.deal_id)
        .bind(input.bank_id)
        .bind(input.account_id)
        .bind(input.revenue_type_id)
        .fetch_one(executor)
        .await?;

        Ok(record)
    }

    pub async fn update_record<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        input: &RecordPayload,
    ) -> Result<FinancialRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, FinancialRecord>(
            r#"
            UPDATE financial_records SET
                description = $3, amount = $4, kind = $5, status = $6,
                due_date = $7, payment_date = $8, competence_date = $9, category = $10,
                company_id = $11, deal_id = $12, bank_id = $13, account_id = $14,
                revenue_type_id = $15
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.kind)
        .bind(input.status)
        .bind(input.due_date)
        .bind(input.payment_date)
        .bind(input.competence_date)
        .bind(&input.category)
        .bind(input.company_id)
        .bind(input.deal_id)
        .bind(input.bank_id)
        .bind(input.account_id)
        .bind(input.revenue_type_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Lançamento"))
    }

    pub async fn delete_record<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM financial_records WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Lançamento"));
        }
        Ok(())
    }

    // =========================================================================
    //  CONTAS BANCÁRIAS
    // =========================================================================

    pub async fn list_banks<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Bank>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let banks = sqlx::query_as::<_, Bank>("SELECT * FROM banks WHERE tenant_id = $1 ORDER BY name ASC")
            .bind(tenant_id)
            .fetch_all(executor)
            .await?;

        Ok(banks)
    }

    pub async fn find_bank<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<Bank, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Bank>("SELECT * FROM banks WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NotFound("Banco"))
    }

    pub async fn insert_bank<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Option<Uuid>,
        name: &str,
        agency: Option<&str>,
        account: Option<&str>,
        initial_balance: Decimal,
    ) -> Result<Bank, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bank = sqlx::query_as::<_, Bank>(
            r#"
            INSERT INTO banks (id, tenant_id, name, agency, account, initial_balance)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id.unwrap_or_else(Uuid::new_v4))
        .bind(tenant_id)
        .bind(name)
        .bind(agency)
        .bind(account)
        .bind(initial_balance)
        .fetch_one(executor)
        .await?;

        Ok(bank)
    }

    pub async fn update_bank<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        input: &BankPayload,
    ) -> Result<Bank, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Bank>(
            r#"
            UPDATE banks SET name = $3, agency = $4, account = $5, initial_balance = $6
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(&input.name)
        .bind(&input.agency)
        .bind(&input.account)
        .bind(input.initial_balance)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Banco"))
    }

    pub async fn delete_bank<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM banks WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Banco"));
        }
        Ok(())
    }

    // =========================================================================
    //  PLANO DE CONTAS (Rubricas)
    // =========================================================================

    pub async fn list_accounts<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<ChartAccount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let accounts = sqlx::query_as::<_, ChartAccount>(
            "SELECT * FROM chart_of_accounts WHERE tenant_id = $1 ORDER BY code ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(accounts)
    }

    pub async fn insert_account<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &ChartAccountPayload,
    ) -> Result<ChartAccount, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let account = sqlx::query_as::<_, ChartAccount>(
            r#"
            INSERT INTO chart_of_accounts (id, tenant_id, code, name, kind)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(input.id.unwrap_or_else(Uuid::new_v4))
        .bind(tenant_id)
        .bind(&input.code)
        .bind(&input.name)
        .bind(input.kind)
        .fetch_one(executor)
        .await?;

        Ok(account)
    }

    pub async fn update_account<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        input: &ChartAccountPayload,
    ) -> Result<ChartAccount, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ChartAccount>(
            r#"
            UPDATE chart_of_accounts SET code = $3, name = $4, kind = $5
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(&input.code)
        .bind(&input.name)
        .bind(input.kind)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Rubrica"))
    }

    pub async fn delete_account<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM chart_of_accounts WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Rubrica"));
        }
        Ok(())
    }
}
