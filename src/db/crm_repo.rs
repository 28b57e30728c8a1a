// src/db/crm_repo.rs

use sqlx::{types::Json, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::crm::{Company, CompanyNote, CompanyPayload, Contact, ContactPayload, GeneralNote, NotePayload},
};

#[derive(Clone, Default)]
pub struct CrmRepository;

impl CrmRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  EMPRESAS (Clientes)
    // =========================================================================

    pub async fn list_companies<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let companies = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE tenant_id = $1 ORDER BY name ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(companies)
    }

    pub async fn find_company<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NotFound("Empresa"))
    }

    /// Empresas selecionadas, travadas até o fim da transação.
    pub async fn find_companies_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let companies = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE tenant_id = $1 AND id = ANY($2) FOR UPDATE",
        )
        .bind(tenant_id)
        .bind(ids)
        .fetch_all(executor)
        .await?;

        Ok(companies)
    }

    pub async fn insert_company<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &CompanyPayload,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (
                id, tenant_id, name, tax_id, segment, location, status, responsible_ids, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(input.id.unwrap_or_else(Uuid::new_v4))
        .bind(tenant_id)
        .bind(&input.name)
        .bind(&input.tax_id)
        .bind(&input.segment)
        .bind(&input.location)
        .bind(input.status)
        .bind(&input.responsible_ids)
        .bind(Json(&input.notes))
        .fetch_one(executor)
        .await?;

        Ok(company)
    }

    /// Atualização completa (também usada pela edição em massa).
    pub async fn update_company<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        input: &CompanyPayload,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET
                name = $3, tax_id = $4, segment = $5, location = $6, status = $7,
                responsible_ids = $8, notes = $9, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(&input.name)
        .bind(&input.tax_id)
        .bind(&input.segment)
        .bind(&input.location)
        .bind(input.status)
        .bind(&input.responsible_ids)
        .bind(Json(&input.notes))
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Empresa"))
    }

    pub async fn delete_company<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM companies WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Empresa"));
        }
        Ok(())
    }

    // Acrescenta uma nota no final da lista embutida
    pub async fn append_company_note<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        note: &CompanyNote,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET notes = notes || $3::jsonb, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(Json([note]))
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Empresa"))
    }

    // =========================================================================
    //  CONTATOS
    // =========================================================================

    pub async fn list_contacts<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Contact>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contacts = sqlx::query_as::<_, Contact>(
            "SELECT * FROM contacts WHERE tenant_id = $1 ORDER BY name ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(contacts)
    }

    pub async fn insert_contact<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &ContactPayload,
    ) -> Result<Contact, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contacts (id, tenant_id, company_id, name, role, email, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.id.unwrap_or_else(Uuid::new_v4))
        .bind(tenant_id)
        .bind(input.company_id)
        .bind(&input.name)
        .bind(&input.role)
        .bind(&input.email)
        .bind(&input.phone)
        .fetch_one(executor)
        .await?;

        Ok(contact)
    }

    pub async fn update_contact<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        input: &ContactPayload,
    ) -> Result<Contact, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts SET company_id = $3, name = $4, role = $5, email = $6, phone = $7
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(input.company_id)
        .bind(&input.name)
        .bind(&input.role)
        .bind(&input.email)
        .bind(&input.phone)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Contato"))
    }

    pub async fn delete_contact<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM contacts WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Contato"));
        }
        Ok(())
    }

    // =========================================================================
    //  BLOCO DE NOTAS
    // =========================================================================

    pub async fn list_notes<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<GeneralNote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notes = sqlx::query_as::<_, GeneralNote>(
            "SELECT * FROM general_notes WHERE tenant_id = $1 ORDER BY date DESC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(notes)
    }

    pub async fn insert_note<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        author: &str,
        input: &NotePayload,
    ) -> Result<GeneralNote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let note = sqlx::query_as::<_, GeneralNote>(
            r#"
            INSERT INTO general_notes (id, tenant_id, title, content, category, color, author, company_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(input.id.unwrap_or_else(Uuid::new_v4))
        .bind(tenant_id)
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.category)
        .bind(&input.color)
        .bind(author)
        .bind(input.company_id)
        .fetch_one(executor)
        .await?;

        Ok(note)
    }

    pub async fn update_note<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        input: &NotePayload,
    ) -> Result<GeneralNote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, GeneralNote>(
            r#"
            UPDATE general_notes SET title = $3, content = $4, category = $5, color = $6, company_id = $7
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.category)
        .bind(&input.color)
        .bind(input.company_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Nota"))
    }

    pub async fn delete_note<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM general_notes WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Nota"));
        }
        Ok(())
    }
}
