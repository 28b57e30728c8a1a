use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Nosso tipo de erro de domínio. Cada variante tem um código estável,
// que é a chave da mensagem traduzida no I18nStore.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Sem permissão para o módulo {0}")]
    Forbidden(String),

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    #[error("Etapa desconhecida: {0}")]
    UnknownStage(String),

    #[error("Etapa fixa não pode ser alterada: {0}")]
    StageLocked(String),

    #[error("Mover para a etapa de ganho exige confirmação")]
    WonRequiresConfirmation,

    #[error("Negócio já está ganho")]
    DealAlreadyWon,

    #[error("Ordem de etapas inválida")]
    InvalidStageOrder,

    #[error("Edição em massa inválida: {0}")]
    InvalidBulkEdit(&'static str),

    #[error("Arquivo de importação inválido: {0}")]
    InvalidImport(String),

    #[error("Um usuário não pode remover a própria conta")]
    CannotDeleteSelf,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Código estável enviado ao cliente e usado como chave de tradução.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::EmailAlreadyExists => "email_already_exists",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::UserNotFound => "user_not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::UnknownStage(_) => "unknown_stage",
            AppError::StageLocked(_) => "stage_locked",
            AppError::WonRequiresConfirmation => "won_requires_confirmation",
            AppError::DealAlreadyWon => "deal_already_won",
            AppError::InvalidStageOrder => "invalid_stage_order",
            AppError::InvalidBulkEdit(_) => "invalid_bulk_edit",
            AppError::InvalidImport(_) => "invalid_import",
            AppError::CannotDeleteSelf => "cannot_delete_self",
            AppError::UniqueConstraintViolation(_) => "unique_violation",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidStageOrder
            | AppError::InvalidBulkEdit(_)
            | AppError::InvalidImport(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::CannotDeleteSelf => StatusCode::FORBIDDEN,
            AppError::UserNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists
            | AppError::UniqueConstraintViolation(_)
            | AppError::StageLocked(_)
            | AppError::DealAlreadyWon => StatusCode::CONFLICT,
            AppError::UnknownStage(_) | AppError::WonRequiresConfirmation => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Argumento interpolado em "{arg}" na mensagem traduzida
    fn message_arg(&self) -> Option<String> {
        match self {
            AppError::Forbidden(module) => Some(module.clone()),
            AppError::NotFound(entity) => Some((*entity).to_string()),
            AppError::UnknownStage(name) | AppError::StageLocked(name) => Some(name.clone()),
            AppError::InvalidBulkEdit(reason) => Some((*reason).to_string()),
            AppError::InvalidImport(reason) | AppError::UniqueConstraintViolation(reason) => {
                Some(reason.clone())
            }
            _ => None,
        }
    }

    /// Converte o erro de domínio na resposta HTTP, traduzida para o idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        let code = self.code();

        if status.is_server_error() {
            // O detalhe fica só no log
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let message = store.translate(&locale.0, code, self.message_arg().as_deref());

        let details = match &self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                            Value::String(store.translate(&locale.0, key, None))
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                Some(Value::Object(details))
            }
            _ => None,
        };

        ApiError {
            status,
            code: code.to_string(),
            error: message,
            details,
        }
    }
}

// Usado por middlewares e extractors que não têm o Locale à mão.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), I18nStore::global())
            .into_response()
    }
}

/// Erro já renderizado para o cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "code": self.code, "details": details }),
            None => json!({ "error": self.error, "code": self.code }),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Converte violações de unicidade do Postgres no erro amigável.
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(what.to_string());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404_with_entity_in_message() {
        let api = AppError::NotFound("Empresa")
            .to_api_error(&Locale("pt".into()), I18nStore::global());

        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.code, "not_found");
        assert!(api.error.contains("Empresa"));
    }

    #[test]
    fn internal_errors_are_sanitized() {
        let err = AppError::InternalServerError(anyhow::anyhow!("senha do banco vazou"));
        let api = err.to_api_error(&Locale("en".into()), I18nStore::global());

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("senha"));
    }

    #[test]
    fn won_confirmation_is_unprocessable() {
        assert_eq!(
            AppError::WonRequiresConfirmation.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let mut errors = validator::ValidationErrors::new();
        let mut e = validator::ValidationError::new("length");
        e.message = Some("required".into());
        errors.add("name", e);

        let api = AppError::ValidationError(errors)
            .to_api_error(&Locale("pt".into()), I18nStore::global());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["name"][0], "Campo obrigatório.");
    }
}
