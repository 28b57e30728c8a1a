// src/services/import_service.rs

use std::collections::HashSet;
use std::str::FromStr;

use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sqlx::{Acquire, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FinanceRepository, SettingsRepository},
    models::settings::{ImportKind, ImportResult, LookupKind},
};

// Cabeçalho: nome;agencia;conta;saldo_inicial
#[derive(Debug, Clone, Deserialize)]
pub struct BankRow {
    pub nome: String,
    #[serde(default)]
    pub agencia: Option<String>,
    #[serde(default)]
    pub conta: Option<String>,
    #[serde(default)]
    pub saldo_inicial: Option<String>,
}

// Cabeçalho: nome
#[derive(Debug, Clone, Deserialize)]
pub struct NameRow {
    pub nome: String,
}

pub fn parse_rows<T: DeserializeOwned>(content: &str) -> Result<Vec<T>, AppError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for (line, result) in reader.deserialize().enumerate() {
        // +2: cabeçalho e base 1
        let row = result.map_err(|e| AppError::InvalidImport(format!("linha {}: {}", line + 2, e)))?;
        rows.push(row);
    }

    Ok(rows)
}

/// Aceita "1.234,56" (formato brasileiro), "1,234.56" e "1234.56".
///
/// Com os dois separadores, o último é o decimal. Com um só, ele é decimal
/// quando aparece uma vez e não separa exatamente três dígitos finais
/// ("10,5", "1234.56"); caso contrário é separador de milhar ("1.234",
/// "1.234.567"). Grupos de milhar fora do padrão são rejeitados.
pub fn parse_amount(raw: &str) -> Result<Decimal, AppError> {
    let invalid = || AppError::InvalidImport(format!("valor inválido '{}'", raw.trim()));

    let cleaned: String = raw
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let (decimal_sep, group_sep) = match (digits.rfind(','), digits.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => (Some(','), Some('.')),
        (Some(_), Some(_)) => (Some('.'), Some(',')),
        (Some(at), None) => single_separator(digits, ',', at),
        (None, Some(at)) => single_separator(digits, '.', at),
        (None, None) => (None, None),
    };

    let (int_part, frac_part) = match decimal_sep {
        Some(sep) => digits.rsplit_once(sep).ok_or_else(invalid)?,
        None => (digits, ""),
    };

    let is_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    if decimal_sep.is_some() && !is_digits(frac_part) {
        return Err(invalid());
    }

    let integer = match group_sep {
        Some(sep) => {
            let groups: Vec<&str> = int_part.split(sep).collect();
            let well_formed = groups.iter().enumerate().all(|(i, g)| {
                is_digits(g) && if i == 0 { g.len() <= 3 } else { g.len() == 3 }
            });
            if !well_formed {
                return Err(invalid());
            }
            groups.concat()
        }
        None if is_digits(int_part) => int_part.to_string(),
        None => return Err(invalid()),
    };

    let normalized = match (negative, frac_part.is_empty()) {
        (false, true) => integer,
        (false, false) => format!("{}.{}", integer, frac_part),
        (true, true) => format!("-{}", integer),
        (true, false) => format!("-{}.{}", integer, frac_part),
    };

    Decimal::from_str(&normalized).map_err(|_| invalid())
}

// Separador único: decimal ou milhar, pela quantidade e pela posição
fn single_separator(digits: &str, sep: char, last: usize) -> (Option<char>, Option<char>) {
    let occurrences = digits.matches(sep).count();
    let trailing = digits.len() - last - 1;

    if occurrences > 1 || trailing == 3 {
        (None, Some(sep))
    } else {
        (Some(sep), None)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Separa o que entra do que é ignorado: nome vazio, já cadastrado no
/// tenant ou repetido no próprio arquivo (sem diferenciar maiúsculas).
pub fn plan_import<T>(
    existing: impl IntoIterator<Item = String>,
    rows: Vec<T>,
    name_of: impl Fn(&T) -> &str,
) -> (Vec<T>, usize) {
    let mut seen: HashSet<String> = existing.into_iter().map(|n| normalize(&n)).collect();
    let mut accepted = Vec::new();
    let mut ignored = 0;

    for row in rows {
        let key = normalize(name_of(&row));
        if key.is_empty() || !seen.insert(key) {
            ignored += 1;
            continue;
        }
        accepted.push(row);
    }

    (accepted, ignored)
}

#[derive(Clone)]
pub struct ImportService {
    finance_repo: FinanceRepository,
    settings_repo: SettingsRepository,
}

impl ImportService {
    pub fn new(finance_repo: FinanceRepository, settings_repo: SettingsRepository) -> Self {
        Self { finance_repo, settings_repo }
    }

    pub async fn import<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        kind: ImportKind,
        content: &str,
    ) -> Result<ImportResult, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let result = match kind {
            ImportKind::Banks => {
                let rows: Vec<BankRow> = parse_rows(content)?;
                let existing = self
                    .finance_repo
                    .list_banks(&mut *tx, tenant_id)
                    .await?
                    .into_iter()
                    .map(|b| b.name);
                let (accepted, ignored) = plan_import(existing, rows, |r| r.nome.as_str());

                for row in &accepted {
                    let balance = match row.saldo_inicial.as_deref() {
                        Some(raw) => parse_amount(raw)?,
                        None => Decimal::ZERO,
                    };
                    self.finance_repo
                        .insert_bank(
                            &mut *tx,
                            tenant_id,
                            None,
                            row.nome.trim(),
                            row.agencia.as_deref(),
                            row.conta.as_deref(),
                            balance,
                        )
                        .await?;
                }

                ImportResult { inserted: accepted.len(), ignored }
            }
            ImportKind::Segments | ImportKind::RevenueTypes => {
                let lookup = match kind {
                    ImportKind::Segments => LookupKind::Segments,
                    _ => LookupKind::RevenueTypes,
                };
                let rows: Vec<NameRow> = parse_rows(content)?;
                let existing = self
                    .settings_repo
                    .list_lookups(&mut *tx, tenant_id, lookup)
                    .await?
                    .into_iter()
                    .map(|i| i.name);
                let (accepted, ignored) = plan_import(existing, rows, |r| r.nome.as_str());

                for row in &accepted {
                    self.settings_repo
                        .insert_lookup(&mut *tx, tenant_id, lookup, None, row.nome.trim(), None)
                        .await?;
                }

                ImportResult { inserted: accepted.len(), ignored }
            }
        };

        tx.commit().await?;

        tracing::info!(
            "Importação {:?}: {} inseridos, {} ignorados",
            kind,
            result.inserted,
            result.ignored
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANKS: &str = "nome;agencia;conta;saldo_inicial\n\
        Banco do Brasil;1234-5;98765-0;1.234,56\n\
        Itaú;0001;11111-1;1234.56\n\
        banco do brasil ;9999;22222-2;10,00\n\
        Caixa;;;\n";

    #[test]
    fn parses_semicolon_rows_and_both_number_formats() {
        let rows: Vec<BankRow> = parse_rows(BANKS).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].agencia.as_deref(), Some("1234-5"));
        assert_eq!(rows[3].agencia, None);

        assert_eq!(parse_amount("1.234,56").unwrap(), Decimal::new(123456, 2));
        assert_eq!(parse_amount("1234.56").unwrap(), Decimal::new(123456, 2));
        assert_eq!(parse_amount("R$ 10,5").unwrap(), Decimal::new(105, 1));
        assert_eq!(parse_amount("").unwrap(), Decimal::ZERO);
        assert!(matches!(parse_amount("abc"), Err(AppError::InvalidImport(_))));
    }

    #[test]
    fn last_separator_is_the_decimal_one() {
        assert_eq!(parse_amount("1,234.56").unwrap(), Decimal::new(123456, 2));
        assert_eq!(parse_amount("1.234.567,89").unwrap(), Decimal::new(123456789, 2));
        assert_eq!(parse_amount("-2.500,00").unwrap(), Decimal::new(-250000, 2));
    }

    #[test]
    fn lone_separator_before_three_digits_is_thousands() {
        assert_eq!(parse_amount("1.234").unwrap(), Decimal::from(1234));
        assert_eq!(parse_amount("1,234,567").unwrap(), Decimal::from(1234567));
        assert_eq!(parse_amount("10,50").unwrap(), Decimal::new(1050, 2));
    }

    #[test]
    fn malformed_grouping_is_rejected() {
        for raw in ["1.23.4", "12,34,56", "1,234,56.7", "1.2345,00", "1.234,", ",50", "1.234,5.6"] {
            assert!(
                matches!(parse_amount(raw), Err(AppError::InvalidImport(_))),
                "'{}' deveria ser rejeitado",
                raw
            );
        }
    }

    #[test]
    fn duplicates_in_file_and_tenant_are_ignored() {
        let rows: Vec<BankRow> = parse_rows(BANKS).unwrap();
        let existing = vec!["CAIXA".to_string()];

        let (accepted, ignored) = plan_import(existing, rows, |r| r.nome.as_str());

        let names: Vec<&str> = accepted.iter().map(|r| r.nome.as_str()).collect();
        assert_eq!(names, vec!["Banco do Brasil", "Itaú"]);
        assert_eq!(ignored, 2);
    }

    #[test]
    fn importing_the_same_file_twice_inserts_nothing() {
        let content = "nome\nVarejo\nIndústria\nvarejo\n\n";

        let first: Vec<NameRow> = parse_rows(content).unwrap();
        let (accepted, _) = plan_import(Vec::<String>::new(), first, |r| r.nome.as_str());
        let stored: Vec<String> = accepted.iter().map(|r| r.nome.clone()).collect();
        assert_eq!(stored.len(), 2);

        let second: Vec<NameRow> = parse_rows(content).unwrap();
        let (accepted, ignored) = plan_import(stored, second, |r| r.nome.as_str());
        assert!(accepted.is_empty());
        assert_eq!(ignored, 3);
    }

    #[test]
    fn missing_name_column_is_an_invalid_file() {
        let result: Result<Vec<NameRow>, _> = parse_rows("titulo\nVarejo\n");
        assert!(matches!(result, Err(AppError::InvalidImport(_))));
    }
}
