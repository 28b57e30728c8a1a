// src/workspace/pending.rs

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpState {
    Pending,
    Committed,
    /// Servidor recusou a criação; o registro local continua na lista.
    FailedKept,
    /// Servidor recusou; a lista voltou ao estado anterior.
    FailedReverted,
    /// A tela dona da operação fechou antes da resposta.
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("transição inválida de {from:?} para {to:?}")]
pub struct InvalidTransition {
    pub from: OpState,
    pub to: OpState,
}

/// Uma mutação otimista aguardando o servidor.
#[derive(Debug, Clone)]
pub struct PendingOp<T> {
    record_id: Uuid,
    kind: OpKind,
    // Valor anterior à mudança (alteração e remoção)
    snapshot: Option<T>,
    state: OpState,
}

impl<T> PendingOp<T> {
    pub fn create(record_id: Uuid) -> Self {
        Self { record_id, kind: OpKind::Create, snapshot: None, state: OpState::Pending }
    }

    pub fn update(record_id: Uuid, before: T) -> Self {
        Self { record_id, kind: OpKind::Update, snapshot: Some(before), state: OpState::Pending }
    }

    pub fn delete(record_id: Uuid, before: T) -> Self {
        Self { record_id, kind: OpKind::Delete, snapshot: Some(before), state: OpState::Pending }
    }

    pub fn record_id(&self) -> Uuid {
        self.record_id
    }

    pub fn kind(&self) -> OpKind {
        self.kind
    }

    pub fn state(&self) -> OpState {
        self.state
    }

    pub fn commit(&mut self) -> Result<(), InvalidTransition> {
        self.transition(OpState::Committed)
    }

    /// Falha no servidor. Criação é mantida; alteração e remoção devolvem
    /// o valor anterior, que deve ser restaurado na lista.
    pub fn fail(&mut self) -> Result<Option<T>, InvalidTransition> {
        match self.kind {
            OpKind::Create => {
                self.transition(OpState::FailedKept)?;
                Ok(None)
            }
            OpKind::Update | OpKind::Delete => {
                self.transition(OpState::FailedReverted)?;
                Ok(self.snapshot.take())
            }
        }
    }

    pub fn abandon(&mut self) -> Result<(), InvalidTransition> {
        self.transition(OpState::Abandoned)
    }

    // Só se sai de Pending, e uma única vez
    fn transition(&mut self, to: OpState) -> Result<(), InvalidTransition> {
        if self.state != OpState::Pending {
            return Err(InvalidTransition { from: self.state, to });
        }
        self.state = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_create_is_kept() {
        let mut op = PendingOp::<String>::create(Uuid::new_v4());
        assert_eq!(op.fail().unwrap(), None);
        assert_eq!(op.state(), OpState::FailedKept);
    }

    #[test]
    fn failed_update_and_delete_give_back_the_snapshot() {
        let mut update = PendingOp::update(Uuid::new_v4(), "antes".to_string());
        assert_eq!(update.fail().unwrap().as_deref(), Some("antes"));
        assert_eq!(update.state(), OpState::FailedReverted);

        let mut delete = PendingOp::delete(Uuid::new_v4(), "removido".to_string());
        assert_eq!(delete.fail().unwrap().as_deref(), Some("removido"));
        assert_eq!(delete.state(), OpState::FailedReverted);
    }

    #[test]
    fn terminal_states_reject_further_transitions() {
        let mut op = PendingOp::update(Uuid::new_v4(), 1);
        op.commit().unwrap();

        assert_eq!(
            op.fail().unwrap_err(),
            InvalidTransition { from: OpState::Committed, to: OpState::FailedReverted }
        );
        assert!(op.abandon().is_err());
        assert!(op.commit().is_err());
        assert_eq!(op.state(), OpState::Committed);
    }

    #[test]
    fn abandoned_operation_cannot_fail_afterwards() {
        let mut op = PendingOp::delete(Uuid::new_v4(), 1);
        op.abandon().unwrap();
        assert!(op.fail().is_err());
        assert_eq!(op.state(), OpState::Abandoned);
    }
}
