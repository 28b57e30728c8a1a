// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::LazyLock;

pub const DEFAULT_LANG: &str = "pt";

// Mensagens por idioma. A chave é o código do erro (AppError::code)
// ou a "message" usada nas validações dos payloads.
const PT: &[(&str, &str)] = &[
    ("validation_error", "Um ou mais campos são inválidos."),
    ("email_already_exists", "Este e-mail já está em uso."),
    ("invalid_credentials", "E-mail ou senha inválidos."),
    ("invalid_token", "Sessão expirada ou inválida. Entre novamente."),
    ("user_not_found", "Usuário não encontrado."),
    ("forbidden", "Você não tem permissão para acessar o módulo '{arg}'."),
    ("not_found", "{arg} não encontrado(a)."),
    ("unknown_stage", "A etapa '{arg}' não existe no funil."),
    ("stage_locked", "A etapa '{arg}' é fixa e não pode ser alterada."),
    ("won_requires_confirmation", "Confirme os dados do faturamento para marcar o negócio como ganho."),
    ("deal_already_won", "Este negócio já foi marcado como ganho."),
    ("invalid_stage_order", "A nova ordem das etapas é inválida."),
    ("invalid_bulk_edit", "Edição em massa inválida: {arg}."),
    ("invalid_import", "Arquivo de importação inválido: {arg}."),
    ("cannot_delete_self", "Você não pode remover a sua própria conta."),
    ("unique_violation", "Registro duplicado: {arg}."),
    ("internal_error", "Ocorreu um erro inesperado."),
    ("required", "Campo obrigatório."),
    ("invalid_email", "E-mail inválido."),
    ("invalid_probability", "A probabilidade deve estar entre 0 e 100."),
    ("invalid_amount", "O valor não pode ser negativo."),
    ("password_too_short", "A senha deve ter no mínimo 6 caracteres."),
];

const EN: &[(&str, &str)] = &[
    ("validation_error", "One or more fields are invalid."),
    ("email_already_exists", "This e-mail is already in use."),
    ("invalid_credentials", "Invalid e-mail or password."),
    ("invalid_token", "Session expired or invalid. Please sign in again."),
    ("user_not_found", "User not found."),
    ("forbidden", "You are not allowed to access the '{arg}' module."),
    ("not_found", "{arg} not found."),
    ("unknown_stage", "Stage '{arg}' does not exist in the pipeline."),
    ("stage_locked", "Stage '{arg}' is fixed and cannot be changed."),
    ("won_requires_confirmation", "Confirm the billing data to mark the deal as won."),
    ("deal_already_won", "This deal is already marked as won."),
    ("invalid_stage_order", "The new stage order is invalid."),
    ("invalid_bulk_edit", "Invalid bulk edit: {arg}."),
    ("invalid_import", "Invalid import file: {arg}."),
    ("cannot_delete_self", "You cannot delete your own account."),
    ("unique_violation", "Duplicate record: {arg}."),
    ("internal_error", "An unexpected error occurred."),
    ("required", "Required field."),
    ("invalid_email", "Invalid e-mail."),
    ("invalid_probability", "Probability must be between 0 and 100."),
    ("invalid_amount", "Amount cannot be negative."),
    ("password_too_short", "Password must have at least 6 characters."),
];

static GLOBAL: LazyLock<I18nStore> = LazyLock::new(I18nStore::new);

#[derive(Debug, Clone)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
    fallback: String,
}

impl I18nStore {
    pub fn new() -> Self {
        Self::with_fallback(DEFAULT_LANG)
    }

    /// Idioma usado quando o cliente pede um que não temos.
    pub fn with_fallback(lang: &str) -> Self {
        let mut messages: HashMap<&'static str, HashMap<&'static str, &'static str>> = HashMap::new();
        messages.insert("pt", PT.iter().copied().collect());
        messages.insert("en", EN.iter().copied().collect());

        let fallback = if messages.contains_key(lang) { lang } else { DEFAULT_LANG };
        Self { messages, fallback: fallback.to_string() }
    }

    pub fn global() -> &'static I18nStore {
        &GLOBAL
    }

    /// Traduz a chave. Idioma desconhecido cai para o idioma padrão; chave
    /// desconhecida volta como está.
    pub fn translate(&self, lang: &str, key: &str, arg: Option<&str>) -> String {
        let template = self
            .messages
            .get(lang)
            .and_then(|m| m.get(key))
            .or_else(|| self.messages.get(self.fallback.as_str()).and_then(|m| m.get(key)))
            .copied()
            .unwrap_or(key);

        match arg {
            Some(arg) => template.replace("{arg}", arg),
            None => template.to_string(),
        }
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_falls_back_to_portuguese() {
        let store = I18nStore::new();
        assert_eq!(
            store.translate("de", "invalid_credentials", None),
            "E-mail ou senha inválidos."
        );
    }

    #[test]
    fn interpolates_argument() {
        let store = I18nStore::new();
        assert_eq!(
            store.translate("en", "unknown_stage", Some("Demo")),
            "Stage 'Demo' does not exist in the pipeline."
        );
    }

    #[test]
    fn configured_fallback_is_used_for_unknown_language() {
        let store = I18nStore::with_fallback("en");
        assert_eq!(store.translate("de", "invalid_credentials", None), "Invalid e-mail or password.");

        // Idioma padrão não suportado volta para o português
        let store = I18nStore::with_fallback("fr");
        assert_eq!(store.translate("de", "user_not_found", None), "Usuário não encontrado.");
    }

    #[test]
    fn request_without_language_uses_configured_default() {
        let store = I18nStore::with_fallback("en");
        assert_eq!(store.translate("", "invalid_token", None), "Session expired or invalid. Please sign in again.");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::new();
        assert_eq!(store.translate("pt", "whatever", None), "whatever");
    }
}
