// src/services/pipeline.rs

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        crm::Company,
        deals::{
            BoardColumn, ColumnKind, Deal, DealFilter, DealStage, MoveTarget, PipelineBoard,
            WonRecordDraft,
        },
        settings::StageConfig,
    },
};

pub const LOST_COLUMN: &str = "Perdido";
const DEFAULT_WON_COLUMN: &str = "Ganho";
const AD_HOC_BASE_ORDER: i32 = 1000;

/// Para onde um arrasto leva o negócio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Stage(DealStage),
    // Ganho passa pelo formulário de faturamento antes de gravar
    NeedsConfirmation,
}

pub fn won_stage(stages: &[StageConfig]) -> Option<&StageConfig> {
    stages.iter().find(|s| s.is_won)
}

pub fn resolve_target(stages: &[StageConfig], target: &MoveTarget) -> Result<Resolved, AppError> {
    match target {
        MoveTarget::Won => Ok(Resolved::NeedsConfirmation),
        MoveTarget::Lost => Ok(Resolved::Stage(DealStage::Lost)),
        MoveTarget::Stage(name) => {
            let config = stages
                .iter()
                .find(|s| s.name == *name)
                .ok_or_else(|| AppError::UnknownStage(name.clone()))?;

            if config.is_won {
                Ok(Resolved::NeedsConfirmation)
            } else {
                Ok(Resolved::Stage(DealStage::open(config.name.clone())))
            }
        }
    }
}

/// Etapa vinda do formulário. Manter a etapa atual é sempre permitido.
pub fn check_form_stage(
    stages: &[StageConfig],
    requested: &DealStage,
    current: Option<&DealStage>,
) -> Result<(), AppError> {
    if current == Some(requested) {
        return Ok(());
    }

    match requested {
        DealStage::Won => Err(AppError::WonRequiresConfirmation),
        DealStage::Lost => Ok(()),
        DealStage::Open { stage } => match resolve_target(stages, &MoveTarget::Stage(stage.clone()))? {
            Resolved::NeedsConfirmation => Err(AppError::WonRequiresConfirmation),
            Resolved::Stage(_) => Ok(()),
        },
    }
}

pub fn won_draft(deal: &Deal, today: NaiveDate) -> WonRecordDraft {
    WonRecordDraft {
        description: format!("Venda: {}", deal.title),
        amount: deal.value,
        due_date: today,
        revenue_type_id: deal.revenue_type_id,
        company_id: deal.company_id,
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Todos os filtros informados precisam bater (E lógico).
pub fn matches_filter(deal: &Deal, company: Option<&Company>, filter: &DealFilter) -> bool {
    if let Some(search) = non_blank(&filter.search) {
        if !contains_ci(&deal.title, search) {
            return false;
        }
    }

    if let Some(user_id) = filter.responsible_id {
        if !company.is_some_and(|c| c.responsible_ids.contains(&user_id)) {
            return false;
        }
    }

    if let Some(revenue_type_id) = filter.revenue_type_id {
        if deal.revenue_type_id != Some(revenue_type_id) {
            return false;
        }
    }

    let created = deal.created_at.date_naive();
    if filter.created_from.is_some_and(|from| created < from) {
        return false;
    }
    if filter.created_to.is_some_and(|to| created > to) {
        return false;
    }

    if filter.temperature.is_some_and(|t| t != deal.temperature) {
        return false;
    }

    if let Some(name) = non_blank(&filter.company) {
        if !company.is_some_and(|c| contains_ci(&c.name, name)) {
            return false;
        }
    }

    if let Some(segment) = non_blank(&filter.segment) {
        if !company.is_some_and(|c| c.segment.as_deref() == Some(segment)) {
            return false;
        }
    }

    if filter.min_value.is_some_and(|min| deal.value < min) {
        return false;
    }
    if filter.max_value.is_some_and(|max| deal.value > max) {
        return false;
    }

    true
}

fn column(name: &str, kind: ColumnKind, order: i32, is_fixed: bool) -> BoardColumn {
    BoardColumn {
        name: name.to_string(),
        kind,
        order,
        is_fixed,
        total: Decimal::ZERO,
        deals: Vec::new(),
    }
}

/// Monta o quadro do funil.
///
/// As colunas saem da configuração e de todos os negócios; o conteúdo de
/// cada coluna respeita o filtro. Ordem: etapas visíveis, etapas avulsas
/// (nomes em negócios abertos sem configuração), ganho e, se houver
/// negócio perdido, a coluna de perdidos.
pub fn build_board(
    stages: &[StageConfig],
    deals: &[Deal],
    companies: &[Company],
    filter: &DealFilter,
) -> PipelineBoard {
    let mut configured: Vec<&StageConfig> = stages.iter().filter(|s| !s.is_won).collect();
    configured.sort_by_key(|s| s.order);

    let mut columns: Vec<BoardColumn> = configured
        .iter()
        .filter(|s| s.is_visible)
        .map(|s| column(&s.name, ColumnKind::Stage, s.order, s.is_fixed))
        .collect();

    let won = won_stage(stages);
    let won_name = won.map(|s| s.name.as_str()).unwrap_or(DEFAULT_WON_COLUMN);

    let mut ad_hoc: Vec<&str> = Vec::new();
    for deal in deals {
        if let Some(name) = deal.stage.stage_name() {
            let known = stages.iter().any(|s| s.name == name);
            if !known && !ad_hoc.contains(&name) {
                ad_hoc.push(name);
            }
        }
    }
    for (n, name) in ad_hoc.iter().enumerate() {
        columns.push(column(name, ColumnKind::AdHoc, AD_HOC_BASE_ORDER + n as i32, false));
    }

    let won_order = won
        .map(|s| s.order)
        .unwrap_or(AD_HOC_BASE_ORDER)
        .max(AD_HOC_BASE_ORDER + ad_hoc.len() as i32);
    columns.push(column(won_name, ColumnKind::Won, won_order, true));

    if deals.iter().any(|d| d.stage == DealStage::Lost) {
        columns.push(column(LOST_COLUMN, ColumnKind::Lost, won_order + 1, true));
    }

    let companies: HashMap<Uuid, &Company> = companies.iter().map(|c| (c.id, c)).collect();

    for deal in deals {
        let company = deal.company_id.and_then(|id| companies.get(&id).copied());
        if !matches_filter(deal, company, filter) {
            continue;
        }

        let target = columns.iter_mut().find(|col| match (&deal.stage, col.kind) {
            (DealStage::Won, ColumnKind::Won) => true,
            (DealStage::Lost, ColumnKind::Lost) => true,
            (DealStage::Open { stage }, ColumnKind::Stage | ColumnKind::AdHoc | ColumnKind::Won) => {
                col.name == *stage
            }
            _ => false,
        });

        // Etapa oculta: o negócio não aparece no quadro
        if let Some(col) = target {
            col.total += deal.value;
            col.deals.push(deal.clone());
        }
    }

    PipelineBoard { columns }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{crm::CompanyStatus, deals::Temperature};
    use chrono::{TimeZone, Utc};

    fn stage(name: &str, order: i32, is_fixed: bool, is_won: bool) -> StageConfig {
        StageConfig {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            name: name.into(),
            order,
            is_fixed,
            is_visible: true,
            is_won,
        }
    }

    fn stages() -> Vec<StageConfig> {
        vec![
            stage("Fechado", 3, true, true),
            stage("Prospecção", 0, true, false),
            stage("Proposta", 1, false, false),
            stage("Negociação", 2, false, false),
        ]
    }

    fn deal(title: &str, stage: DealStage, value: i64) -> Deal {
        let won_at = (stage == DealStage::Won).then(Utc::now);
        Deal {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            title: title.into(),
            value: Decimal::from(value),
            stage,
            company_id: None,
            probability: 50,
            temperature: Temperature::Warm,
            revenue_type_id: None,
            interactions: Vec::new(),
            last_activity: Utc::now(),
            won_at,
            created_at: Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap(),
        }
    }

    fn company(name: &str, segment: &str, responsible: Vec<Uuid>) -> Company {
        Company {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            name: name.into(),
            tax_id: None,
            segment: Some(segment.into()),
            location: None,
            status: CompanyStatus::Active,
            responsible_ids: responsible,
            notes: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn moving_to_won_asks_for_confirmation() {
        let s = stages();
        assert_eq!(resolve_target(&s, &MoveTarget::Won).unwrap(), Resolved::NeedsConfirmation);
        assert_eq!(
            resolve_target(&s, &MoveTarget::Stage("Fechado".into())).unwrap(),
            Resolved::NeedsConfirmation
        );
        assert_eq!(
            resolve_target(&s, &MoveTarget::Stage("Proposta".into())).unwrap(),
            Resolved::Stage(DealStage::open("Proposta"))
        );
        assert_eq!(
            resolve_target(&s, &MoveTarget::Lost).unwrap(),
            Resolved::Stage(DealStage::Lost)
        );
    }

    #[test]
    fn unknown_stage_is_rejected() {
        let err = resolve_target(&stages(), &MoveTarget::Stage("Inexistente".into())).unwrap_err();
        assert!(matches!(err, AppError::UnknownStage(name) if name == "Inexistente"));
    }

    #[test]
    fn form_cannot_set_won_but_may_keep_it() {
        let s = stages();
        assert!(matches!(
            check_form_stage(&s, &DealStage::Won, Some(&DealStage::open("Proposta"))),
            Err(AppError::WonRequiresConfirmation)
        ));
        assert!(check_form_stage(&s, &DealStage::Won, Some(&DealStage::Won)).is_ok());
        assert!(check_form_stage(&s, &DealStage::open("Negociação"), None).is_ok());
        // Nome legado mantido numa edição de título
        assert!(check_form_stage(
            &s,
            &DealStage::open("Legado"),
            Some(&DealStage::open("Legado"))
        )
        .is_ok());
    }

    #[test]
    fn board_orders_configured_ad_hoc_won_and_lost() {
        let deals = vec![
            deal("A", DealStage::open("Proposta"), 100),
            deal("B", DealStage::open("Legado"), 50),
            deal("C", DealStage::open("Outro"), 10),
            deal("D", DealStage::Won, 300),
            deal("E", DealStage::Lost, 20),
            deal("F", DealStage::open("Legado"), 5),
        ];

        let board = build_board(&stages(), &deals, &[], &DealFilter::default());
        let names: Vec<&str> = board.columns.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(
            names,
            vec!["Prospecção", "Proposta", "Negociação", "Legado", "Outro", "Fechado", "Perdido"]
        );
        assert_eq!(board.columns[3].order, 1000);
        assert_eq!(board.columns[4].order, 1001);
        assert_eq!(board.columns[3].total, Decimal::from(55));
        assert_eq!(board.columns[5].deals[0].title, "D");
    }

    #[test]
    fn lost_column_only_when_there_are_lost_deals() {
        let deals = vec![deal("A", DealStage::open("Proposta"), 100)];
        let board = build_board(&stages(), &deals, &[], &DealFilter::default());
        assert!(board.columns.iter().all(|c| c.kind != ColumnKind::Lost));
        assert_eq!(board.columns.last().unwrap().kind, ColumnKind::Won);
    }

    #[test]
    fn hidden_stage_is_not_a_column() {
        let mut s = stages();
        s.iter_mut().find(|x| x.name == "Negociação").unwrap().is_visible = false;
        let deals = vec![deal("A", DealStage::open("Negociação"), 100)];

        let board = build_board(&s, &deals, &[], &DealFilter::default());

        assert!(board.columns.iter().all(|c| c.name != "Negociação"));
        assert!(board.columns.iter().all(|c| c.deals.is_empty()));
    }

    #[test]
    fn filters_compose_with_and() {
        let ana = Uuid::new_v4();
        let padaria = company("Padaria Pão Quente", "Varejo", vec![ana]);
        let fabrica = company("Fábrica Aço", "Indústria", vec![]);

        let mut a = deal("Implantação ERP", DealStage::open("Proposta"), 1000);
        a.company_id = Some(padaria.id);
        a.temperature = Temperature::Hot;
        let mut b = deal("Implantação CRM", DealStage::open("Proposta"), 1000);
        b.company_id = Some(fabrica.id);
        b.temperature = Temperature::Hot;
        let mut c = deal("Consultoria", DealStage::open("Proposta"), 1000);
        c.company_id = Some(padaria.id);

        let filter = DealFilter {
            search: Some("implantação".into()),
            temperature: Some(Temperature::Hot),
            responsible_id: Some(ana),
            ..Default::default()
        };

        assert!(matches_filter(&a, Some(&padaria), &filter));
        assert!(!matches_filter(&b, Some(&fabrica), &filter));
        assert!(!matches_filter(&c, Some(&padaria), &filter));

        let by_company = DealFilter {
            company: Some("padaria".into()),
            segment: Some("Varejo".into()),
            min_value: Some(Decimal::from(500)),
            max_value: Some(Decimal::from(1000)),
            ..Default::default()
        };
        assert!(matches_filter(&a, Some(&padaria), &by_company));
        assert!(!matches_filter(&a, None, &by_company));
    }

    #[test]
    fn creation_range_is_inclusive() {
        let d = deal("A", DealStage::open("Proposta"), 1);
        let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let filter = DealFilter {
            created_from: Some(day),
            created_to: Some(day),
            ..Default::default()
        };
        assert!(matches_filter(&d, None, &filter));

        let later = DealFilter {
            created_from: day.succ_opt(),
            ..Default::default()
        };
        assert!(!matches_filter(&d, None, &later));
    }

    #[test]
    fn won_draft_uses_deal_value_and_today() {
        let mut d = deal("Implantação ERP", DealStage::open("Negociação"), 15000);
        d.revenue_type_id = Some(Uuid::new_v4());
        let today = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();

        let draft = won_draft(&d, today);

        assert_eq!(draft.description, "Venda: Implantação ERP");
        assert_eq!(draft.amount, Decimal::from(15000));
        assert_eq!(draft.due_date, today);
        assert_eq!(draft.revenue_type_id, d.revenue_type_id);
    }
}
