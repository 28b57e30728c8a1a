// src/services/dashboard_service.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DealRepository, FinanceRepository, TaskRepository},
    models::{
        dashboard::{Alert, AlertKind, DashboardSummary},
        deals::{Deal, DealStage},
        finance::{FinancialRecord, RecordKind},
        tasks::{Task, TaskStatus},
    },
};

// Negócio aberto sem atividade há mais que isso gera alerta
const STALE_DEAL_DAYS: i64 = 7;

pub fn summarize(
    deals: &[Deal],
    records: &[FinancialRecord],
    tasks: &[Task],
    today: NaiveDate,
) -> DashboardSummary {
    let open: Vec<&Deal> = deals.iter().filter(|d| d.stage.is_open()).collect();

    let won_this_month: Decimal = deals
        .iter()
        .filter(|d| d.stage == DealStage::Won)
        .filter(|d| {
            d.won_at
                .map(|at| at.date_naive())
                .is_some_and(|closed| closed.year() == today.year() && closed.month() == today.month())
        })
        .map(|d| d.value)
        .sum();

    let unpaid = || records.iter().filter(|r| !r.is_paid());
    let pending_of = |kind: RecordKind| -> Decimal {
        unpaid().filter(|r| r.kind == kind).map(|r| r.amount).sum()
    };

    DashboardSummary {
        open_pipeline_value: open.iter().map(|d| d.value).sum(),
        open_deals: open.len(),
        won_this_month,
        pending_receivables: pending_of(RecordKind::Income),
        pending_payables: pending_of(RecordKind::Expense),
        overdue_records: unpaid().filter(|r| r.due_date < today).count(),
        pending_tasks: tasks.iter().filter(|t| t.status == TaskStatus::Pending).count(),
    }
}

/// Alertas do painel, do mais atrasado para o mais recente.
pub fn alerts(
    deals: &[Deal],
    records: &[FinancialRecord],
    tasks: &[Task],
    now: DateTime<Utc>,
) -> Vec<Alert> {
    let today = now.date_naive();
    let mut alerts = Vec::new();

    for record in records.iter().filter(|r| !r.is_paid() && r.due_date < today) {
        alerts.push(Alert {
            kind: AlertKind::OverdueRecord,
            entity_id: record.id,
            title: record.description.clone(),
            reference_date: record.due_date,
            days: (today - record.due_date).num_days(),
        });
    }

    for task in tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Pending && t.due_date < today)
    {
        alerts.push(Alert {
            kind: AlertKind::OverdueTask,
            entity_id: task.id,
            title: task.title.clone(),
            reference_date: task.due_date,
            days: (today - task.due_date).num_days(),
        });
    }

    for deal in deals.iter().filter(|d| d.stage.is_open()) {
        let idle = (now - deal.last_activity).num_days();
        if idle > STALE_DEAL_DAYS {
            alerts.push(Alert {
                kind: AlertKind::StaleDeal,
                entity_id: deal.id,
                title: deal.title.clone(),
                reference_date: deal.last_activity.date_naive(),
                days: idle,
            });
        }
    }

    alerts.sort_by(|a, b| b.days.cmp(&a.days));
    alerts
}

#[derive(Clone)]
pub struct DashboardService {
    deal_repo: DealRepository,
    finance_repo: FinanceRepository,
    task_repo: TaskRepository,
}

impl DashboardService {
    pub fn new(deal_repo: DealRepository, finance_repo: FinanceRepository, task_repo: TaskRepository) -> Self {
        Self { deal_repo, finance_repo, task_repo }
    }

    async fn load<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<(Vec<Deal>, Vec<FinancialRecord>, Vec<Task>), AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let deals = self.deal_repo.list(&mut *conn, tenant_id).await?;
        let records = self.finance_repo.list_records(&mut *conn, tenant_id).await?;
        let tasks = self.task_repo.list(&mut *conn, tenant_id).await?;

        Ok((deals, records, tasks))
    }

    pub async fn get_summary<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<DashboardSummary, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let (deals, records, tasks) = self.load(executor, tenant_id).await?;
        Ok(summarize(&deals, &records, &tasks, Utc::now().date_naive()))
    }

    pub async fn get_alerts<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Alert>, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let (deals, records, tasks) = self.load(executor, tenant_id).await?;
        Ok(alerts(&deals, &records, &tasks, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        deals::Temperature,
        finance::RecordStatus,
        tasks::{TaskKind, TaskPriority},
    };
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 20, 15, 0, 0).unwrap()
    }

    fn deal(stage: DealStage, value: i64, idle_days: i64) -> Deal {
        let last_activity = now() - Duration::days(idle_days);
        let won_at = (stage == DealStage::Won).then_some(last_activity);
        Deal {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            title: "Negócio".into(),
            value: Decimal::from(value),
            stage,
            company_id: None,
            probability: 50,
            temperature: Temperature::Cold,
            revenue_type_id: None,
            interactions: vec![],
            last_activity,
            won_at,
            created_at: now() - Duration::days(60),
        }
    }

    fn record(kind: RecordKind, status: RecordStatus, amount: i64, due: NaiveDate) -> FinancialRecord {
        FinancialRecord {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            description: "Conta".into(),
            amount: Decimal::from(amount),
            kind,
            status,
            due_date: due,
            payment_date: None,
            competence_date: None,
            category: None,
            company_id: None,
            deal_id: None,
            bank_id: None,
            account_id: None,
            revenue_type_id: None,
            created_at: now(),
        }
    }

    fn task(status: TaskStatus, due: NaiveDate) -> Task {
        Task {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            title: "Ligar".into(),
            kind: TaskKind::Call,
            due_date: due,
            priority: TaskPriority::High,
            status,
            company_id: None,
            related_to: None,
            created_at: now(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    #[test]
    fn summary_totals() {
        let deals = vec![
            deal(DealStage::open("Proposta"), 100, 1),
            deal(DealStage::open("Negociação"), 200, 1),
            deal(DealStage::Won, 1000, 2),
            deal(DealStage::Won, 999, 40),
            deal(DealStage::Lost, 50, 1),
        ];
        let records = vec![
            record(RecordKind::Income, RecordStatus::Pending, 300, day(25)),
            record(RecordKind::Income, RecordStatus::Paid, 700, day(1)),
            record(RecordKind::Expense, RecordStatus::Overdue, 80, day(10)),
        ];
        let tasks = vec![task(TaskStatus::Pending, day(30)), task(TaskStatus::Done, day(1))];

        let s = summarize(&deals, &records, &tasks, now().date_naive());

        assert_eq!(s.open_pipeline_value, Decimal::from(300));
        assert_eq!(s.open_deals, 2);
        assert_eq!(s.won_this_month, Decimal::from(1000));
        assert_eq!(s.pending_receivables, Decimal::from(300));
        assert_eq!(s.pending_payables, Decimal::from(80));
        assert_eq!(s.overdue_records, 1);
        assert_eq!(s.pending_tasks, 1);
    }

    #[test]
    fn later_interactions_do_not_move_a_win_to_another_month() {
        // Ganho em abril, comentário adicionado em maio
        let mut won_in_april = deal(DealStage::Won, 500, 1);
        won_in_april.won_at = Some(now() - Duration::days(30));

        let mut won_in_may = deal(DealStage::Won, 800, 45);
        won_in_may.won_at = Some(now() - Duration::days(3));

        let s = summarize(&[won_in_april, won_in_may], &[], &[], now().date_naive());

        assert_eq!(s.won_this_month, Decimal::from(800));
    }

    #[test]
    fn alerts_cover_overdue_and_stale_items() {
        let deals = vec![
            deal(DealStage::open("Proposta"), 100, 10),
            deal(DealStage::open("Proposta"), 100, 7),
            deal(DealStage::Lost, 100, 30),
        ];
        let records = vec![
            record(RecordKind::Expense, RecordStatus::Pending, 10, day(15)),
            record(RecordKind::Expense, RecordStatus::Paid, 10, day(1)),
        ];
        let tasks = vec![task(TaskStatus::Pending, day(19)), task(TaskStatus::Pending, day(20))];

        let list = alerts(&deals, &records, &tasks, now());
        let kinds: Vec<(AlertKind, i64)> = list.iter().map(|a| (a.kind, a.days)).collect();

        assert_eq!(
            kinds,
            vec![
                (AlertKind::StaleDeal, 10),
                (AlertKind::OverdueRecord, 5),
                (AlertKind::OverdueTask, 1),
            ]
        );
    }
}
