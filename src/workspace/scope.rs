// src/workspace/scope.rs

use tokio_util::sync::{CancellationToken, DropGuard};

/// Tempo de vida de uma tela. Operações iniciadas num escopo fechado
/// terminam como abandonadas e não mexem mais na lista.
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Escopo de um modal dentro da tela: fecha junto com o pai.
    pub fn child(&self) -> Self {
        Self { token: self.token.child_token() }
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn closed(&self) {
        self.token.cancelled().await
    }

    /// Fecha o escopo quando o guard sair de cena.
    pub fn close_on_drop(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }
}
