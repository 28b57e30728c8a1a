//! Estado do lado do cliente: uma lista por entidade, alterada de forma
//! otimista e espelhada na API.
//!
//! Cada mutação aplica a mudança localmente, avisa os assinantes e só
//! depois chama o servidor. Se o servidor recusar, a [`PendingOp`]
//! decide o que acontece com a lista local: criação fica (e é sinalizada),
//! alteração e remoção voltam ao estado anterior.

pub mod pending;
pub mod record;
pub mod remote;
pub mod scope;
pub mod store;

use std::sync::Arc;

use crate::models::{
    crm::{Company, Contact, GeneralNote},
    deals::Deal,
    finance::{Bank, ChartAccount, FinancialRecord},
    tasks::Task,
};

pub use pending::{InvalidTransition, OpKind, OpState, PendingOp};
pub use record::Record;
pub use remote::{HttpRemote, RemoteError, RemoteStore};
pub use scope::ViewScope;
pub use store::{RecordStore, StoreError, StoreEvent};

/// As listas de um usuário autenticado.
pub struct Workspace {
    pub companies: Arc<RecordStore<Company>>,
    pub contacts: Arc<RecordStore<Contact>>,
    pub deals: Arc<RecordStore<Deal>>,
    pub tasks: Arc<RecordStore<Task>>,
    pub records: Arc<RecordStore<FinancialRecord>>,
    pub banks: Arc<RecordStore<Bank>>,
    pub accounts: Arc<RecordStore<ChartAccount>>,
    pub notes: Arc<RecordStore<GeneralNote>>,
}

impl Workspace {
    pub fn new(remote: Arc<HttpRemote>) -> Self {
        Self {
            companies: Arc::new(RecordStore::new(remote.clone())),
            contacts: Arc::new(RecordStore::new(remote.clone())),
            deals: Arc::new(RecordStore::new(remote.clone())),
            tasks: Arc::new(RecordStore::new(remote.clone())),
            records: Arc::new(RecordStore::new(remote.clone())),
            banks: Arc::new(RecordStore::new(remote.clone())),
            accounts: Arc::new(RecordStore::new(remote.clone())),
            notes: Arc::new(RecordStore::new(remote)),
        }
    }

    /// Carga inicial de todas as listas. Para na primeira falha.
    pub async fn load_all(&self, scope: &ViewScope) -> Result<(), RemoteError> {
        self.companies.load(scope).await?;
        self.contacts.load(scope).await?;
        self.deals.load(scope).await?;
        self.tasks.load(scope).await?;
        self.records.load(scope).await?;
        self.banks.load(scope).await?;
        self.accounts.load(scope).await?;
        self.notes.load(scope).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::{routing::get, routing::MethodRouter, Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{}", addr)
    }

    fn empty() -> MethodRouter {
        get(|| async { Json(Vec::<Value>::new()) })
    }

    fn notes() -> MethodRouter {
        get(|| async {
            Json(json!([{
                "id": "6f1c2a7e-1d3b-4c55-9a0e-2b7d8e9f0a11",
                "tenantId": "00000000-0000-0000-0000-000000000000",
                "title": "Reunião de kick-off",
                "content": "",
                "category": null,
                "color": "yellow",
                "author": "Ana",
                "date": "2025-05-20T15:00:00Z",
                "companyId": null
            }]))
        })
    }

    fn api(with_accounts: bool) -> Router {
        let router = Router::new()
            .route("/api/companies", empty())
            .route("/api/contacts", empty())
            .route("/api/deals", empty())
            .route("/api/tasks", empty())
            .route("/api/finance/records", empty())
            .route("/api/finance/banks", empty())
            .route("/api/notes", notes());
        if with_accounts {
            router.route("/api/finance/accounts", empty())
        } else {
            router
        }
    }

    #[tokio::test]
    async fn load_all_fills_every_store() {
        let base = serve(api(true)).await;
        let workspace = Workspace::new(Arc::new(HttpRemote::new(base, "token")));

        workspace.load_all(&ViewScope::new()).await.unwrap();

        assert!(workspace.companies.list().is_empty());
        let notes = workspace.notes.list();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Reunião de kick-off");
    }

    #[tokio::test]
    async fn load_all_stops_at_first_failure() {
        let base = serve(api(false)).await;
        let workspace = Workspace::new(Arc::new(HttpRemote::new(base, "token")));

        let result = workspace.load_all(&ViewScope::new()).await;

        assert_matches!(result, Err(RemoteError::Api { status: 404, .. }));
        // Contas vêm antes das notas na carga
        assert!(workspace.notes.list().is_empty());
    }
}
