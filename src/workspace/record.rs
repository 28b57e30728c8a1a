// src/workspace/record.rs

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::models::{
    crm::{Company, Contact, GeneralNote},
    deals::Deal,
    finance::{Bank, ChartAccount, FinancialRecord},
    tasks::Task,
};

/// Entidade que pode viver num [`RecordStore`](super::RecordStore).
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Caminho do recurso na API, relativo a `/api`.
    const RESOURCE: &'static str;

    fn id(&self) -> Uuid;
}

macro_rules! record {
    ($ty:ty, $resource:literal) => {
        impl Record for $ty {
            const RESOURCE: &'static str = $resource;

            fn id(&self) -> Uuid {
                self.id
            }
        }
    };
}

record!(Company, "companies");
record!(Contact, "contacts");
record!(Deal, "deals");
record!(Task, "tasks");
record!(FinancialRecord, "finance/records");
record!(Bank, "finance/banks");
record!(ChartAccount, "finance/accounts");
record!(GeneralNote, "notes");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        crm::{CompanyNote, CompanyPayload, CompanyStatus, ContactPayload, NotePayload},
        deals::{DealPayload, DealStage, Interaction, InteractionKind, Temperature},
        finance::{BankPayload, ChartAccountPayload, RecordKind, RecordPayload, RecordStatus},
        tasks::{TaskKind, TaskPayload, TaskPriority, TaskStatus},
    };
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use validator::Validate;

    // O JSON da entidade é o corpo enviado ao servidor, que o lê como payload
    fn as_payload<T: Record, P: DeserializeOwned + Validate>(record: &T) -> P {
        let value = serde_json::to_value(record).unwrap();
        let payload: P = serde_json::from_value(value).unwrap();
        payload.validate().unwrap();
        payload
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    }

    #[test]
    fn company_is_accepted_as_payload() {
        let company = Company {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Padaria Pão Quente".into(),
            tax_id: Some("12.345.678/0001-99".into()),
            segment: Some("Varejo".into()),
            location: None,
            status: CompanyStatus::Active,
            responsible_ids: vec![Uuid::new_v4()],
            notes: vec![CompanyNote { id: Uuid::new_v4(), content: "Ligar".into(), author: "Ana".into(), date: Utc::now() }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let payload: CompanyPayload = as_payload(&company);

        assert_eq!(payload.id, Some(company.id));
        assert_eq!(payload.responsible_ids, company.responsible_ids);
        assert_eq!(payload.notes, company.notes);
        assert_eq!(payload.status, CompanyStatus::Active);
    }

    #[test]
    fn contact_is_accepted_as_payload() {
        let contact = Contact {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            company_id: Some(Uuid::new_v4()),
            name: "Carlos Lima".into(),
            role: Some("Diretor Financeiro".into()),
            email: Some("carlos@padaria.com.br".into()),
            phone: None,
            created_at: Utc::now(),
        };

        let payload: ContactPayload = as_payload(&contact);

        assert_eq!(payload.id, Some(contact.id));
        assert_eq!(payload.company_id, contact.company_id);
        assert_eq!(payload.email, contact.email);
    }

    #[test]
    fn deal_is_accepted_as_payload() {
        let deal = Deal {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            title: "Implantação ERP".into(),
            value: Decimal::new(1500050, 2),
            stage: DealStage::open("Proposta"),
            company_id: None,
            probability: 60,
            temperature: Temperature::Hot,
            revenue_type_id: Some(Uuid::new_v4()),
            interactions: vec![Interaction {
                kind: InteractionKind::Call,
                description: "Primeira conversa".into(),
                date: Utc::now(),
                author: "Ana".into(),
            }],
            last_activity: Utc::now(),
            won_at: None,
            created_at: Utc::now(),
        };

        let payload: DealPayload = as_payload(&deal);

        assert_eq!(payload.id, Some(deal.id));
        assert_eq!(payload.stage, deal.stage);
        assert_eq!(payload.value, deal.value);
        assert_eq!(payload.revenue_type_id, deal.revenue_type_id);
    }

    #[test]
    fn task_is_accepted_as_payload() {
        let task = Task {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            title: "Enviar proposta".into(),
            kind: TaskKind::Email,
            due_date: day(),
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            company_id: None,
            related_to: Some("Implantação ERP".into()),
            created_at: Utc::now(),
        };

        let payload: TaskPayload = as_payload(&task);

        assert_eq!(payload.id, Some(task.id));
        assert_eq!(payload.due_date, task.due_date);
        assert_eq!(payload.kind, TaskKind::Email);
    }

    #[test]
    fn financial_record_is_accepted_as_payload() {
        let record = FinancialRecord {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            description: "Mensalidade maio".into(),
            amount: Decimal::new(50000, 2),
            kind: RecordKind::Income,
            status: RecordStatus::Paid,
            due_date: day(),
            payment_date: Some(day()),
            competence_date: None,
            category: Some("Serviços".into()),
            company_id: None,
            deal_id: Some(Uuid::new_v4()),
            bank_id: Some(Uuid::new_v4()),
            account_id: None,
            revenue_type_id: None,
            created_at: Utc::now(),
        };

        let payload: RecordPayload = as_payload(&record);

        assert_eq!(payload.id, Some(record.id));
        assert_eq!(payload.amount, record.amount);
        assert_eq!(payload.payment_date, record.payment_date);
        assert_eq!(payload.bank_id, record.bank_id);
    }

    #[test]
    fn bank_is_accepted_as_payload() {
        let bank = Bank {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Banco do Brasil".into(),
            agency: Some("1234-5".into()),
            account: Some("98765-0".into()),
            initial_balance: Decimal::new(150050, 2),
            created_at: Utc::now(),
        };

        let payload: BankPayload = as_payload(&bank);

        assert_eq!(payload.id, Some(bank.id));
        assert_eq!(payload.initial_balance, bank.initial_balance);
    }

    #[test]
    fn chart_account_is_accepted_as_payload() {
        let account = ChartAccount {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            code: "3.1.01".into(),
            name: "Receita de Serviços".into(),
            kind: RecordKind::Income,
        };

        let payload: ChartAccountPayload = as_payload(&account);

        assert_eq!(payload.id, Some(account.id));
        assert_eq!(payload.code, account.code);
        assert_eq!(payload.kind, RecordKind::Income);
    }

    #[test]
    fn general_note_is_accepted_as_payload() {
        let note = GeneralNote {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            title: "Ideias".into(),
            content: "Campanha de inverno".into(),
            category: None,
            color: Some("yellow".into()),
            author: "Ana".into(),
            date: Utc::now(),
            company_id: Some(Uuid::new_v4()),
        };

        let payload: NotePayload = as_payload(&note);

        assert_eq!(payload.id, Some(note.id));
        assert_eq!(payload.content, note.content);
        assert_eq!(payload.company_id, note.company_id);
    }
}
