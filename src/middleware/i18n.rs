// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

// Extrator de idioma a partir do Accept-Language.
// Vazio quando o cliente não pediu nenhum: o I18nStore usa o idioma
// padrão configurado (DEFAULT_LOCALE).
#[derive(Debug, Clone, Default)]
pub struct Locale(pub String);

impl Locale {
    pub fn is_unspecified(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_header(header_str: &str) -> Self {
        accept_language::parse(header_str)
            .first()
            // "pt-BR" -> "pt"
            .map(|tag| tag.split('-').next().unwrap_or(tag.as_str()).to_lowercase())
            .map(Locale)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_primary_subtag_of_preferred_language() {
        assert_eq!(Locale::from_header("en-US,pt;q=0.8").0, "en");
        assert_eq!(Locale::from_header("pt-BR").0, "pt");
    }

    #[test]
    fn empty_header_leaves_language_to_the_store() {
        assert!(Locale::from_header("").is_unspecified());
        assert!(Locale::default().is_unspecified());
    }
}
