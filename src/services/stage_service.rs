// src/services/stage_service.rs

use std::collections::HashSet;

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DealRepository, SettingsRepository},
    models::settings::{StageConfig, StageScope, StagePayload},
};

/// Etapas criadas junto com a organização. A primeira e a última são fixas.
pub fn default_stages(tenant_id: Uuid, scope: StageScope) -> Vec<StageConfig> {
    let names: &[&str] = match scope {
        StageScope::Deal => &["Prospecção", "Qualificação", "Proposta", "Negociação", "Fechado"],
        StageScope::Task => &["A Fazer", "Em Andamento", "Concluído"],
    };
    let last = names.len() - 1;

    names
        .iter()
        .enumerate()
        .map(|(i, name)| StageConfig {
            id: Uuid::new_v4(),
            tenant_id,
            name: (*name).to_string(),
            order: i as i32,
            is_fixed: i == 0 || i == last,
            is_visible: true,
            is_won: scope == StageScope::Deal && i == last,
        })
        .collect()
}

// Reatribui 'order' pela posição na lista
fn renumber(mut stages: Vec<StageConfig>) -> Vec<StageConfig> {
    for (i, stage) in stages.iter_mut().enumerate() {
        stage.order = i as i32;
    }
    stages
}

/// Etapa nova entra antes da âncora final (quando a última etapa é fixa).
pub fn place_new_stage(current: &[StageConfig], new: StageConfig) -> Vec<StageConfig> {
    let mut stages = current.to_vec();
    stages.sort_by_key(|s| s.order);

    let at = match stages.last() {
        Some(last) if last.is_fixed => stages.len() - 1,
        _ => stages.len(),
    };
    stages.insert(at, new);

    renumber(stages)
}

/// Nova ordem das etapas. `ids` precisa conter todas as etapas, e as fixas
/// continuam exatamente onde estavam.
pub fn reorder_stages(current: &[StageConfig], ids: &[Uuid]) -> Result<Vec<StageConfig>, AppError> {
    let mut stages = current.to_vec();
    stages.sort_by_key(|s| s.order);

    let unique: HashSet<&Uuid> = ids.iter().collect();
    if ids.len() != stages.len() || unique.len() != ids.len() {
        return Err(AppError::InvalidStageOrder);
    }

    let mut reordered = Vec::with_capacity(stages.len());
    for (index, id) in ids.iter().enumerate() {
        let stage = stages
            .iter()
            .find(|s| s.id == *id)
            .ok_or(AppError::InvalidStageOrder)?;

        let anchor = &stages[index];
        if (anchor.is_fixed || stage.is_fixed) && anchor.id != stage.id {
            let locked = if stage.is_fixed { stage } else { anchor };
            return Err(AppError::StageLocked(locked.name.clone()));
        }

        reordered.push(stage.clone());
    }

    Ok(renumber(reordered))
}

#[derive(Clone)]
pub struct StageService {
    repo: SettingsRepository,
    deal_repo: DealRepository,
}

impl StageService {
    pub fn new(repo: SettingsRepository, deal_repo: DealRepository) -> Self {
        Self { repo, deal_repo }
    }

    pub async fn list<'e, E>(&self, executor: E, tenant_id: Uuid, scope: StageScope) -> Result<Vec<StageConfig>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_stages(executor, tenant_id, scope).await
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        scope: StageScope,
        payload: &StagePayload,
    ) -> Result<StageConfig, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self.repo.list_stages(&mut *tx, tenant_id, scope).await?;
        let new = StageConfig {
            id: payload.id.unwrap_or_else(Uuid::new_v4),
            tenant_id,
            name: payload.name.trim().to_string(),
            order: 0,
            is_fixed: false,
            is_visible: payload.is_visible,
            is_won: false,
        };
        let new_id = new.id;

        let placed = place_new_stage(&current, new);
        let mut created = None;

        for stage in &placed {
            if stage.id == new_id {
                created = Some(self.repo.insert_stage(&mut *tx, tenant_id, scope, stage).await?);
                continue;
            }
            let moved = current.iter().any(|c| c.id == stage.id && c.order != stage.order);
            if moved {
                self.repo
                    .set_stage_position(&mut *tx, tenant_id, scope, stage.id, stage.order)
                    .await?;
            }
        }

        tx.commit().await?;

        created.ok_or_else(|| anyhow::anyhow!("etapa nova não foi posicionada").into())
    }

    /// Renomeia/oculta uma etapa. No funil, os negócios abertos acompanham o novo nome.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        scope: StageScope,
        id: Uuid,
        payload: &StagePayload,
    ) -> Result<StageConfig, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self.repo.list_stages(&mut *tx, tenant_id, scope).await?;
        let old = current
            .iter()
            .find(|s| s.id == id)
            .ok_or(AppError::NotFound("Etapa"))?;

        let name = payload.name.trim();
        let updated = self
            .repo
            .update_stage(&mut *tx, tenant_id, scope, id, name, payload.is_visible)
            .await?;

        if scope == StageScope::Deal && old.name != name {
            let moved = self
                .deal_repo
                .rename_stage(&mut *tx, tenant_id, &old.name, name)
                .await?;
            tracing::info!("Etapa '{}' renomeada para '{}' ({} negócios)", old.name, name, moved);
        }

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete<'e, E>(&self, executor: E, tenant_id: Uuid, scope: StageScope, id: Uuid) -> Result<(), AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let current = self.repo.list_stages(&mut *conn, tenant_id, scope).await?;
        let stage = current
            .iter()
            .find(|s| s.id == id)
            .ok_or(AppError::NotFound("Etapa"))?;

        if stage.is_fixed {
            return Err(AppError::StageLocked(stage.name.clone()));
        }

        // Negócios que ficarem nesta etapa aparecem como etapa avulsa no quadro
        self.repo.delete_stage(&mut *conn, tenant_id, scope, id).await
    }

    pub async fn reorder<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        scope: StageScope,
        ids: &[Uuid],
    ) -> Result<Vec<StageConfig>, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self.repo.list_stages(&mut *tx, tenant_id, scope).await?;
        let reordered = reorder_stages(&current, ids)?;

        for stage in &reordered {
            self.repo
                .set_stage_position(&mut *tx, tenant_id, scope, stage.id, stage.order)
                .await?;
        }

        tx.commit().await?;
        Ok(reordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(stages: &[StageConfig]) -> Vec<&str> {
        stages.iter().map(|s| s.name.as_str()).collect()
    }

    fn custom(name: &str) -> StageConfig {
        StageConfig {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            name: name.into(),
            order: 0,
            is_fixed: false,
            is_visible: true,
            is_won: false,
        }
    }

    #[test]
    fn defaults_anchor_both_ends() {
        let deal = default_stages(Uuid::nil(), StageScope::Deal);
        assert!(deal.first().unwrap().is_fixed);
        assert!(deal.last().unwrap().is_fixed);
        assert_eq!(deal.iter().filter(|s| s.is_won).count(), 1);
        assert!(deal.last().unwrap().is_won);

        let task = default_stages(Uuid::nil(), StageScope::Task);
        assert!(task.iter().all(|s| !s.is_won));
    }

    #[test]
    fn new_stage_goes_before_closing_anchor() {
        let current = default_stages(Uuid::nil(), StageScope::Deal);
        let placed = place_new_stage(&current, custom("Contrato"));

        assert_eq!(
            names(&placed),
            vec!["Prospecção", "Qualificação", "Proposta", "Negociação", "Contrato", "Fechado"]
        );
        let orders: Vec<i32> = placed.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn custom_stages_can_swap_between_anchors() {
        let current = default_stages(Uuid::nil(), StageScope::Deal);
        let mut ids: Vec<Uuid> = current.iter().map(|s| s.id).collect();
        ids.swap(1, 3);

        let reordered = reorder_stages(&current, &ids).unwrap();
        assert_eq!(
            names(&reordered),
            vec!["Prospecção", "Negociação", "Proposta", "Qualificação", "Fechado"]
        );
    }

    #[test]
    fn fixed_stages_never_move() {
        let current = default_stages(Uuid::nil(), StageScope::Deal);
        let mut ids: Vec<Uuid> = current.iter().map(|s| s.id).collect();
        ids.swap(3, 4);

        assert!(matches!(
            reorder_stages(&current, &ids),
            Err(AppError::StageLocked(name)) if name == "Fechado"
        ));

        let mut ids: Vec<Uuid> = current.iter().map(|s| s.id).collect();
        ids.swap(0, 1);
        assert!(reorder_stages(&current, &ids).is_err());
    }

    #[test]
    fn reorder_needs_every_stage_once() {
        let current = default_stages(Uuid::nil(), StageScope::Task);
        let ids = vec![current[0].id, current[0].id, current[2].id];
        assert!(matches!(
            reorder_stages(&current, &ids),
            Err(AppError::InvalidStageOrder)
        ));
        assert!(matches!(
            reorder_stages(&current, &ids[..2]),
            Err(AppError::InvalidStageOrder)
        ));
    }
}
