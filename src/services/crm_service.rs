// src/services/crm_service.rs

use chrono::Utc;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CrmRepository,
    models::crm::{
        AddCompanyNotePayload, BulkEditField, BulkEditPayload, BulkEditResult, Company,
        CompanyNote, CompanyPayload, Contact, ContactPayload, GeneralNote, NotePayload,
    },
};

impl From<&Company> for CompanyPayload {
    fn from(c: &Company) -> Self {
        CompanyPayload {
            id: Some(c.id),
            name: c.name.clone(),
            tax_id: c.tax_id.clone(),
            segment: c.segment.clone(),
            location: c.location.clone(),
            status: c.status,
            responsible_ids: c.responsible_ids.clone(),
            notes: c.notes.clone(),
        }
    }
}

/// Cópia de uma empresa: novo id, nome marcado e sem as notas antigas.
pub fn duplicate_of(company: &Company) -> CompanyPayload {
    CompanyPayload {
        id: Some(Uuid::new_v4()),
        name: format!("{} (Cópia)", company.name),
        notes: Vec::new(),
        ..CompanyPayload::from(company)
    }
}

/// Seleção vazia ou valor em branco não aplicam nada.
pub fn validate_bulk_edit(payload: &BulkEditPayload) -> Result<(), AppError> {
    if payload.ids.is_empty() {
        return Err(AppError::InvalidBulkEdit("nenhuma empresa selecionada"));
    }

    let blank = match &payload.change {
        BulkEditField::Status(_) => false,
        BulkEditField::Segment(v) | BulkEditField::Location(v) => v.trim().is_empty(),
        BulkEditField::Responsible(ids) => ids.is_empty(),
    };
    if blank {
        return Err(AppError::InvalidBulkEdit("valor vazio"));
    }

    Ok(())
}

/// Altera só o campo escolhido das empresas selecionadas. Devolve quantas mudaram.
pub fn apply_bulk_edit(companies: &mut [Company], ids: &[Uuid], change: &BulkEditField) -> usize {
    let mut updated = 0;

    for company in companies.iter_mut().filter(|c| ids.contains(&c.id)) {
        match change {
            BulkEditField::Status(status) => company.status = *status,
            BulkEditField::Segment(segment) => company.segment = Some(segment.trim().to_string()),
            BulkEditField::Location(location) => company.location = Some(location.trim().to_string()),
            BulkEditField::Responsible(users) => company.responsible_ids = users.clone(),
        }
        updated += 1;
    }

    updated
}

#[derive(Clone)]
pub struct CrmService {
    repo: CrmRepository,
}

impl CrmService {
    pub fn new(repo: CrmRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  EMPRESAS
    // =========================================================================

    pub async fn list_companies<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_companies(executor, tenant_id).await
    }

    pub async fn create_company<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &CompanyPayload,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.insert_company(executor, tenant_id, payload).await
    }

    pub async fn update_company<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &CompanyPayload,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.update_company(executor, tenant_id, id, payload).await
    }

    // Não apaga negócios, contatos nem lançamentos vinculados
    pub async fn delete_company<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.delete_company(executor, tenant_id, id).await
    }

    pub async fn duplicate_company<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<Company, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let original = self.repo.find_company(&mut *conn, tenant_id, id).await?;
        let copy = duplicate_of(&original);

        self.repo.insert_company(&mut *conn, tenant_id, &copy).await
    }

    pub async fn add_company_note<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &AddCompanyNotePayload,
        author: &str,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let note = CompanyNote {
            id: Uuid::new_v4(),
            content: payload.content.clone(),
            author: author.to_string(),
            date: Utc::now(),
        };

        self.repo.append_company_note(executor, tenant_id, id, &note).await
    }

    pub async fn bulk_edit<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &BulkEditPayload,
    ) -> Result<BulkEditResult, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        validate_bulk_edit(payload)?;

        let mut tx = executor.begin().await?;

        // Só empresas do próprio tenant entram na seleção
        let mut companies = self
            .repo
            .find_companies_for_update(&mut *tx, tenant_id, &payload.ids)
            .await?;
        let updated = apply_bulk_edit(&mut companies, &payload.ids, &payload.change);

        for company in &companies {
            self.repo
                .update_company(&mut *tx, tenant_id, company.id, &CompanyPayload::from(company))
                .await?;
        }

        tx.commit().await?;

        tracing::info!("Edição em massa aplicada em {} empresas", updated);
        Ok(BulkEditResult { updated })
    }

    // =========================================================================
    //  CONTATOS
    // =========================================================================

    pub async fn list_contacts<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Contact>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_contacts(executor, tenant_id).await
    }

    pub async fn create_contact<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &ContactPayload,
    ) -> Result<Contact, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.insert_contact(executor, tenant_id, payload).await
    }

    pub async fn update_contact<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &ContactPayload,
    ) -> Result<Contact, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.update_contact(executor, tenant_id, id, payload).await
    }

    pub async fn delete_contact<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.delete_contact(executor, tenant_id, id).await
    }

    // =========================================================================
    //  BLOCO DE NOTAS
    // =========================================================================

    pub async fn list_notes<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<GeneralNote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_notes(executor, tenant_id).await
    }

    pub async fn create_note<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &NotePayload,
        author: &str,
    ) -> Result<GeneralNote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.insert_note(executor, tenant_id, author, payload).await
    }

    pub async fn update_note<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &NotePayload,
    ) -> Result<GeneralNote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.update_note(executor, tenant_id, id, payload).await
    }

    pub async fn delete_note<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.delete_note(executor, tenant_id, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::crm::CompanyStatus;

    fn company(name: &str, status: CompanyStatus) -> Company {
        Company {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            name: name.into(),
            tax_id: Some("12.345.678/0001-99".into()),
            segment: Some("Varejo".into()),
            location: Some("Curitiba - PR".into()),
            status,
            responsible_ids: vec![Uuid::new_v4()],
            notes: vec![CompanyNote {
                id: Uuid::new_v4(),
                content: "Primeiro contato".into(),
                author: "Ana".into(),
                date: Utc::now(),
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn bulk_status_changes_exactly_the_selection() {
        let mut companies = vec![
            company("A", CompanyStatus::Prospect),
            company("B", CompanyStatus::Prospect),
            company("C", CompanyStatus::Churned),
            company("D", CompanyStatus::Prospect),
        ];
        let before = companies.clone();
        let ids: Vec<Uuid> = companies[..3].iter().map(|c| c.id).collect();

        let n = apply_bulk_edit(&mut companies, &ids, &BulkEditField::Status(CompanyStatus::Active));

        assert_eq!(n, 3);
        for (after, before) in companies[..3].iter().zip(&before[..3]) {
            assert_eq!(after.status, CompanyStatus::Active);
            // Os demais campos ficam como estavam
            assert_eq!(
                Company { status: before.status, ..after.clone() },
                *before
            );
        }
        assert_eq!(companies[3], before[3]);
    }

    #[test]
    fn bulk_segment_only_touches_segment() {
        let mut companies = vec![company("A", CompanyStatus::Active)];
        let ids = vec![companies[0].id];

        apply_bulk_edit(&mut companies, &ids, &BulkEditField::Segment(" Indústria ".into()));

        assert_eq!(companies[0].segment.as_deref(), Some("Indústria"));
        assert_eq!(companies[0].location.as_deref(), Some("Curitiba - PR"));
    }

    #[test]
    fn bulk_edit_needs_selection_and_value() {
        let empty = BulkEditPayload {
            ids: vec![],
            change: BulkEditField::Status(CompanyStatus::Active),
        };
        assert!(matches!(validate_bulk_edit(&empty), Err(AppError::InvalidBulkEdit(_))));

        let blank = BulkEditPayload {
            ids: vec![Uuid::new_v4()],
            change: BulkEditField::Location("   ".into()),
        };
        assert!(matches!(validate_bulk_edit(&blank), Err(AppError::InvalidBulkEdit(_))));

        let ok = BulkEditPayload {
            ids: vec![Uuid::new_v4()],
            change: BulkEditField::Segment("Serviços".into()),
        };
        assert!(validate_bulk_edit(&ok).is_ok());
    }

    #[test]
    fn duplicate_gets_new_id_suffix_and_no_notes() {
        let original = company("Padaria Pão Quente", CompanyStatus::Active);
        let copy = duplicate_of(&original);

        assert_ne!(copy.id, Some(original.id));
        assert_eq!(copy.name, "Padaria Pão Quente (Cópia)");
        assert!(copy.notes.is_empty());
        assert_eq!(copy.segment, original.segment);
        assert_eq!(copy.responsible_ids, original.responsible_ids);
    }
}
