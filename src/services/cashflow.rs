// src/services/cashflow.rs

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use crate::models::finance::{
    Bank, CashFlowProjection, ChartPoint, FinancialRecord, RecordKind, StatementRow,
};

/// Extrato e fluxo de caixa de uma conta bancária.
///
/// O saldo projetado considera todos os lançamentos, em qualquer situação.
/// O realizado só anda com lançamentos pagos e vencidos até `today`; nos
/// demais pontos repete o último valor, então a série nunca tem buracos.
pub fn project(bank: &Bank, records: &[FinancialRecord], today: NaiveDate) -> CashFlowProjection {
    let mut linked: Vec<&FinancialRecord> = records
        .iter()
        .filter(|r| r.bank_id == Some(bank.id))
        .collect();
    // sort_by_key é estável: mesma data mantém a ordem de chegada
    linked.sort_by_key(|r| r.due_date);

    let initial_date = linked
        .first()
        .and_then(|r| r.due_date.checked_sub_days(Days::new(1)))
        .unwrap_or(today);

    let mut projected = bank.initial_balance;
    let mut realized = bank.initial_balance;

    let mut chart = Vec::with_capacity(linked.len() + 1);
    chart.push(point(initial_date, realized, projected));

    let mut statement = Vec::with_capacity(linked.len());

    for record in linked {
        let signed = record.signed_amount();
        projected += signed;

        if record.is_paid() && record.due_date <= today {
            realized += signed;
        }

        chart.push(point(record.due_date, realized, projected));

        let (entry, exit) = match record.kind {
            RecordKind::Income => (Some(record.amount), None),
            RecordKind::Expense => (None, Some(record.amount)),
        };

        statement.push(StatementRow {
            id: record.id,
            date: record.due_date,
            description: record.description.clone(),
            status: record.status,
            entry,
            exit,
            balance: projected,
            pending: record.due_date > today && !record.is_paid(),
        });
    }

    CashFlowProjection {
        bank_id: bank.id,
        initial_balance: bank.initial_balance,
        projected_balance: projected,
        realized_balance: realized,
        chart,
        statement,
    }
}

fn point(date: NaiveDate, realized: Decimal, projected: Decimal) -> ChartPoint {
    ChartPoint {
        date,
        label: date.format("%d/%m").to_string(),
        realized,
        projected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::finance::RecordStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn bank(initial: i64) -> Bank {
        Bank {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            name: "Banco do Brasil".into(),
            agency: None,
            account: None,
            initial_balance: Decimal::from(initial),
            created_at: Utc::now(),
        }
    }

    fn record(
        bank: &Bank,
        kind: RecordKind,
        amount: i64,
        status: RecordStatus,
        due_date: NaiveDate,
    ) -> FinancialRecord {
        FinancialRecord {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            description: "Lançamento".into(),
            amount: Decimal::from(amount),
            kind,
            status,
            due_date,
            payment_date: None,
            competence_date: None,
            category: None,
            company_id: None,
            deal_id: None,
            bank_id: Some(bank.id),
            account_id: None,
            revenue_type_id: None,
            created_at: Utc::now(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn paid_yesterday_and_pending_tomorrow() {
        let today = day(2025, 3, 10);
        let b = bank(1000);
        let records = vec![
            record(&b, RecordKind::Expense, 200, RecordStatus::Pending, day(2025, 3, 11)),
            record(&b, RecordKind::Income, 500, RecordStatus::Paid, day(2025, 3, 9)),
        ];

        let p = project(&b, &records, today);

        assert_eq!(p.projected_balance, Decimal::from(1300));
        assert_eq!(p.realized_balance, Decimal::from(1500));

        // Ponto inicial um dia antes do primeiro lançamento
        assert_eq!(p.chart[0].date, day(2025, 3, 8));
        assert_eq!(p.chart[0].label, "08/03");
        assert_eq!(p.chart[0].realized, Decimal::from(1000));
        assert_eq!(p.chart[0].projected, Decimal::from(1000));

        // O realizado repete o último valor no ponto pendente
        assert_eq!(p.chart[2].realized, Decimal::from(1500));
        assert_eq!(p.chart[2].projected, Decimal::from(1300));

        assert!(!p.statement[0].pending);
        assert!(p.statement[1].pending);
        assert_eq!(p.statement[0].entry, Some(Decimal::from(500)));
        assert_eq!(p.statement[1].exit, Some(Decimal::from(200)));
    }

    #[test]
    fn bank_without_records_has_only_the_initial_point() {
        let today = day(2025, 3, 10);
        let b = bank(750);

        let p = project(&b, &[], today);

        assert_eq!(p.chart.len(), 1);
        assert_eq!(p.chart[0].date, today);
        assert_eq!(p.chart[0].projected, Decimal::from(750));
        assert!(p.statement.is_empty());
        assert_eq!(p.projected_balance, Decimal::from(750));
    }

    #[test]
    fn projected_balance_matches_every_prefix_sum() {
        let today = day(2025, 1, 15);
        let b = bank(100);
        let records = vec![
            record(&b, RecordKind::Income, 40, RecordStatus::Pending, day(2025, 1, 20)),
            record(&b, RecordKind::Expense, 30, RecordStatus::Paid, day(2025, 1, 2)),
            record(&b, RecordKind::Expense, 5, RecordStatus::Overdue, day(2025, 1, 10)),
            record(&b, RecordKind::Income, 70, RecordStatus::Paid, day(2025, 1, 30)),
        ];

        let p = project(&b, &records, today);

        let mut sorted = records.clone();
        sorted.sort_by_key(|r| r.due_date);
        let mut expected = b.initial_balance;
        for (row, rec) in p.statement.iter().zip(&sorted) {
            expected += rec.signed_amount();
            assert_eq!(row.balance, expected);
        }
        assert_eq!(p.projected_balance, Decimal::from(175));

        // Pago no futuro não conta como realizado
        assert_eq!(p.realized_balance, Decimal::from(70));
    }

    #[test]
    fn realized_series_starts_at_initial_balance_and_never_drops_points() {
        let today = day(2025, 6, 1);
        let b = bank(0);
        let records = vec![
            record(&b, RecordKind::Income, 10, RecordStatus::Pending, day(2025, 5, 1)),
            record(&b, RecordKind::Income, 20, RecordStatus::Paid, day(2025, 5, 2)),
            record(&b, RecordKind::Income, 30, RecordStatus::Pending, day(2025, 5, 3)),
        ];

        let p = project(&b, &records, today);
        let realized: Vec<Decimal> = p.chart.iter().map(|c| c.realized).collect();

        assert_eq!(realized.len(), 4);
        assert_eq!(
            realized,
            vec![Decimal::ZERO, Decimal::ZERO, Decimal::from(20), Decimal::from(20)]
        );
    }

    #[test]
    fn equal_dates_keep_input_order_and_other_banks_are_ignored() {
        let today = day(2025, 2, 1);
        let b = bank(0);
        let other = bank(0);
        let first = record(&b, RecordKind::Income, 1, RecordStatus::Paid, day(2025, 1, 5));
        let second = record(&b, RecordKind::Expense, 2, RecordStatus::Paid, day(2025, 1, 5));
        let foreign = record(&other, RecordKind::Income, 99, RecordStatus::Paid, day(2025, 1, 1));

        let p = project(&b, &[first.clone(), foreign, second.clone()], today);

        assert_eq!(p.statement.len(), 2);
        assert_eq!(p.statement[0].id, first.id);
        assert_eq!(p.statement[1].id, second.id);
        assert_eq!(p.realized_balance, Decimal::from(-1));
    }
}
