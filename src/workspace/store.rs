// src/workspace/store.rs

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;
use uuid::Uuid;

use super::{
    pending::{InvalidTransition, OpKind, OpState, PendingOp},
    record::Record,
    remote::{RemoteError, RemoteStore},
    scope::ViewScope,
};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub enum StoreEvent<T> {
    Inserted(T),
    Updated(T),
    Removed(Uuid),
    /// Lista inteira trocada pela carga do servidor.
    Replaced { count: usize },
    /// A lista voltou ao valor anterior. `None` quando não havia valor.
    Reverted { id: Uuid, restored: Option<T> },
    /// Mensagem para o alerta da interface.
    Failed { id: Uuid, kind: OpKind, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("registro {0} não está na lista")]
    Missing(Uuid),

    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}

/// Lista local de uma entidade, espelhada no servidor.
pub struct RecordStore<T: Record> {
    records: RwLock<Vec<T>>,
    events: broadcast::Sender<StoreEvent<T>>,
    remote: Arc<dyn RemoteStore<T>>,
}

impl<T: Record> RecordStore<T> {
    pub fn new<R: RemoteStore<T> + 'static>(remote: Arc<R>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { records: RwLock::new(Vec::new()), events, remote }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent<T>> {
        self.events.subscribe()
    }

    pub fn list(&self) -> Vec<T> {
        self.read().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<T> {
        self.read().iter().find(|r| r.id() == id).cloned()
    }

    pub fn replace_all(&self, records: Vec<T>) {
        let count = records.len();
        *self.write() = records;
        self.emit(StoreEvent::Replaced { count });
    }

    /// Carga inicial. Nada muda se o escopo fechar antes da resposta.
    pub async fn load(&self, scope: &ViewScope) -> Result<(), RemoteError> {
        let result = tokio::select! {
            biased;
            _ = scope.closed() => return Ok(()),
            r = self.remote.list() => r,
        };

        let records = result.inspect_err(|e| {
            tracing::warn!("Falha ao carregar '{}': {}", T::RESOURCE, e);
        })?;
        self.replace_all(records);
        Ok(())
    }

    pub async fn create(&self, record: T, scope: &ViewScope) -> Result<OpState, StoreError> {
        let op = PendingOp::create(record.id());

        self.write().push(record.clone());
        self.emit(StoreEvent::Inserted(record.clone()));

        let outcome = tokio::select! {
            biased;
            _ = scope.closed() => None,
            r = self.remote.insert(&record) => Some(r.map(Some)),
        };

        self.settle(op, outcome, None)
    }

    pub async fn update(&self, record: T, scope: &ViewScope) -> Result<OpState, StoreError> {
        let id = record.id();
        let before = {
            let mut records = self.write();
            let slot = records
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or(StoreError::Missing(id))?;
            std::mem::replace(slot, record.clone())
        };
        let op = PendingOp::update(id, before);
        self.emit(StoreEvent::Updated(record.clone()));

        let outcome = tokio::select! {
            biased;
            _ = scope.closed() => None,
            r = self.remote.update(&record) => Some(r.map(Some)),
        };

        self.settle(op, outcome, None)
    }

    pub async fn delete(&self, id: Uuid, scope: &ViewScope) -> Result<OpState, StoreError> {
        let (index, before) = {
            let mut records = self.write();
            let index = records
                .iter()
                .position(|r| r.id() == id)
                .ok_or(StoreError::Missing(id))?;
            (index, records.remove(index))
        };
        let op = PendingOp::delete(id, before);
        self.emit(StoreEvent::Removed(id));

        let outcome = tokio::select! {
            biased;
            _ = scope.closed() => None,
            r = self.remote.delete(id) => Some(r.map(|_| None)),
        };

        self.settle(op, outcome, Some(index))
    }

    // Efeitos da resposta do servidor. `outcome` None: escopo fechado.
    fn settle(
        &self,
        mut op: PendingOp<T>,
        outcome: Option<Result<Option<T>, RemoteError>>,
        position: Option<usize>,
    ) -> Result<OpState, StoreError> {
        let id = op.record_id();

        match outcome {
            None => {
                op.abandon()?;
                tracing::debug!("Operação {:?} em '{}' abandonada", op.kind(), T::RESOURCE);
            }
            Some(Ok(saved)) => {
                op.commit()?;
                // Versão do servidor substitui a local
                if let Some(saved) = saved {
                    let replaced = match self.write().iter_mut().find(|r| r.id() == id) {
                        Some(slot) => {
                            *slot = saved.clone();
                            true
                        }
                        None => false,
                    };
                    if replaced {
                        self.emit(StoreEvent::Updated(saved));
                    }
                }
            }
            Some(Err(e)) => {
                tracing::warn!("Falha ao gravar em '{}' ({:?}): {}", T::RESOURCE, op.kind(), e);
                let restored = op.fail()?;

                if let Some(before) = &restored {
                    self.restore(id, before.clone(), position);
                    self.emit(StoreEvent::Reverted { id, restored: Some(before.clone()) });
                }
                self.emit(StoreEvent::Failed { id, kind: op.kind(), message: failure_message(&e) });
            }
        }

        Ok(op.state())
    }

    fn restore(&self, id: Uuid, before: T, position: Option<usize>) {
        let mut records = self.write();
        match records.iter_mut().find(|r| r.id() == id) {
            Some(slot) => *slot = before,
            None => {
                let at = position.unwrap_or(records.len()).min(records.len());
                records.insert(at, before);
            }
        }
    }

    fn emit(&self, event: StoreEvent<T>) {
        // Sem assinantes o envio falha, e tudo bem
        let _ = self.events.send(event);
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn failure_message(error: &RemoteError) -> String {
    match error {
        RemoteError::Api { message, .. } => message.clone(),
        RemoteError::Transport(_) => "Não foi possível falar com o servidor".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::crm::GeneralNote;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeRemote {
        fail: AtomicBool,
        // Quando presente, cada chamada espera por um aviso
        gate: Option<Arc<Notify>>,
        stored: RwLock<Vec<GeneralNote>>,
    }

    impl FakeRemote {
        async fn answer<R>(&self, ok: R) -> Result<R, RemoteError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(RemoteError::Api {
                    status: 422,
                    code: Some("validation_error".into()),
                    message: "Dados inválidos".into(),
                });
            }
            Ok(ok)
        }
    }

    #[async_trait]
    impl RemoteStore<GeneralNote> for FakeRemote {
        async fn list(&self) -> Result<Vec<GeneralNote>, RemoteError> {
            let stored = self.stored.read().unwrap().clone();
            self.answer(stored).await
        }

        async fn insert(&self, record: &GeneralNote) -> Result<GeneralNote, RemoteError> {
            let saved = GeneralNote { author: "Servidor".into(), ..record.clone() };
            self.answer(saved).await
        }

        async fn update(&self, record: &GeneralNote) -> Result<GeneralNote, RemoteError> {
            self.answer(record.clone()).await
        }

        async fn delete(&self, _id: Uuid) -> Result<(), RemoteError> {
            self.answer(()).await
        }
    }

    fn note(title: &str) -> GeneralNote {
        GeneralNote {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            title: title.into(),
            content: String::new(),
            category: None,
            color: None,
            author: "Ana".into(),
            date: Utc::now(),
            company_id: None,
        }
    }

    fn store(remote: FakeRemote, notes: Vec<GeneralNote>) -> (Arc<FakeRemote>, RecordStore<GeneralNote>) {
        let remote = Arc::new(remote);
        let store = RecordStore::new(remote.clone());
        store.replace_all(notes);
        (remote, store)
    }

    fn failing() -> FakeRemote {
        FakeRemote { fail: AtomicBool::new(true), ..Default::default() }
    }

    #[tokio::test]
    async fn successful_create_takes_server_version() {
        let (_, store) = store(FakeRemote::default(), vec![]);
        let new = note("Reunião");

        let state = store.create(new.clone(), &ViewScope::new()).await.unwrap();

        assert_eq!(state, OpState::Committed);
        assert_eq!(store.get(new.id).unwrap().author, "Servidor");
    }

    #[tokio::test]
    async fn failed_create_stays_in_the_list_and_is_flagged() {
        let (_, store) = store(failing(), vec![]);
        let mut events = store.subscribe();
        let new = note("Rascunho");

        let state = store.create(new.clone(), &ViewScope::new()).await.unwrap();

        assert_eq!(state, OpState::FailedKept);
        assert_eq!(store.list(), vec![new.clone()]);
        assert_matches!(events.recv().await.unwrap(), StoreEvent::Inserted(n) if n.id == new.id);
        assert_matches!(
            events.recv().await.unwrap(),
            StoreEvent::Failed { kind: OpKind::Create, message, .. } if message == "Dados inválidos"
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_update_restores_previous_value() {
        let original = note("Original");
        let (_, store) = store(failing(), vec![original.clone()]);
        let mut events = store.subscribe();

        let edited = GeneralNote { title: "Editada".into(), ..original.clone() };
        let state = store.update(edited, &ViewScope::new()).await.unwrap();

        assert_eq!(state, OpState::FailedReverted);
        assert_eq!(store.get(original.id), Some(original.clone()));
        assert_matches!(events.recv().await.unwrap(), StoreEvent::Updated(_));
        assert_matches!(
            events.recv().await.unwrap(),
            StoreEvent::Reverted { restored: Some(n), .. } if n == original
        );
        assert_matches!(events.recv().await.unwrap(), StoreEvent::Failed { kind: OpKind::Update, .. });
    }

    #[tokio::test]
    async fn failed_delete_puts_record_back_in_place() {
        let notes = vec![note("A"), note("B"), note("C")];
        let (_, store) = store(failing(), notes.clone());

        let state = store.delete(notes[1].id, &ViewScope::new()).await.unwrap();

        assert_eq!(state, OpState::FailedReverted);
        assert_eq!(store.list(), notes);
    }

    #[tokio::test]
    async fn unknown_record_is_rejected_before_any_change() {
        let (_, store) = store(FakeRemote::default(), vec![note("A")]);
        let stray = note("B");

        assert_matches!(
            store.update(stray.clone(), &ViewScope::new()).await,
            Err(StoreError::Missing(id)) if id == stray.id
        );
        assert_matches!(store.delete(stray.id, &ViewScope::new()).await, Err(StoreError::Missing(_)));
        assert_eq!(store.list().len(), 1);
    }

    #[tokio::test]
    async fn closed_scope_abandons_without_reverting() {
        let gate = Arc::new(Notify::new());
        let remote = FakeRemote { fail: AtomicBool::new(true), gate: Some(gate.clone()), ..Default::default() };
        let original = note("Original");
        let (_, store) = store(remote, vec![original.clone()]);
        let store = Arc::new(store);
        let mut events = store.subscribe();

        let scope = ViewScope::new();
        let edited = GeneralNote { title: "Editada".into(), ..original.clone() };
        let task = {
            let store = store.clone();
            let scope = scope.clone();
            tokio::spawn(async move { store.update(edited, &scope).await })
        };

        // A edição local já aconteceu; a tela fecha antes da resposta
        assert_matches!(events.recv().await.unwrap(), StoreEvent::Updated(_));
        scope.close();

        assert_eq!(task.await.unwrap().unwrap(), OpState::Abandoned);
        assert_eq!(store.get(original.id).unwrap().title, "Editada");
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn load_replaces_the_list() {
        let remote = FakeRemote::default();
        *remote.stored.write().unwrap() = vec![note("Servidor 1"), note("Servidor 2")];
        let (_, store) = store(remote, vec![note("Local")]);

        store.load(&ViewScope::new()).await.unwrap();

        let titles: Vec<String> = store.list().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["Servidor 1", "Servidor 2"]);
    }
}
