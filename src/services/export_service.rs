// src/services/export_service.rs

use serde::Serialize;
use serde_json::Value;
use sqlx::{Acquire, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CrmRepository, DealRepository, FinanceRepository, TaskRepository},
    models::export::{Sheet, Workbook},
};

// O tenant é implícito na exportação
const HIDDEN_COLUMNS: &[&str] = &["tenantId"];

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Listas e objetos aninhados viram o próprio JSON
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Uma planilha por entidade, com cada campo convertido em texto.
pub fn to_sheet<T: Serialize>(name: &str, items: &[T]) -> Result<Sheet, AppError> {
    let objects = items
        .iter()
        .map(|item| match serde_json::to_value(item) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(anyhow::anyhow!("registro de '{}' não é um objeto", name).into()),
            Err(e) => Err(AppError::InternalServerError(e.into())),
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let mut columns: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !HIDDEN_COLUMNS.contains(&key.as_str()) && !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = objects
        .iter()
        .map(|object| {
            columns
                .iter()
                .map(|col| object.get(col).map(cell).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(Sheet { name: name.to_string(), columns, rows })
}

#[derive(Clone)]
pub struct ExportService {
    crm_repo: CrmRepository,
    deal_repo: DealRepository,
    task_repo: TaskRepository,
    finance_repo: FinanceRepository,
}

impl ExportService {
    pub fn new(
        crm_repo: CrmRepository,
        deal_repo: DealRepository,
        task_repo: TaskRepository,
        finance_repo: FinanceRepository,
    ) -> Self {
        Self { crm_repo, deal_repo, task_repo, finance_repo }
    }

    /// `entities`: nomes separados por vírgula, na ordem das abas.
    pub async fn export<'e, E>(&self, executor: E, tenant_id: Uuid, entities: &str) -> Result<Workbook, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        let mut sheets = Vec::new();

        for entity in entities.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let sheet = match entity {
                "companies" => to_sheet("Empresas", &self.crm_repo.list_companies(&mut *conn, tenant_id).await?)?,
                "contacts" => to_sheet("Contatos", &self.crm_repo.list_contacts(&mut *conn, tenant_id).await?)?,
                "deals" => to_sheet("Negócios", &self.deal_repo.list(&mut *conn, tenant_id).await?)?,
                "tasks" => to_sheet("Tarefas", &self.task_repo.list(&mut *conn, tenant_id).await?)?,
                "finance" => to_sheet("Financeiro", &self.finance_repo.list_records(&mut *conn, tenant_id).await?)?,
                "banks" => to_sheet("Bancos", &self.finance_repo.list_banks(&mut *conn, tenant_id).await?)?,
                "notes" => to_sheet("Notas", &self.crm_repo.list_notes(&mut *conn, tenant_id).await?)?,
                other => {
                    tracing::warn!("Entidade desconhecida na exportação: {}", other);
                    continue;
                }
            };
            sheets.push(sheet);
        }

        Ok(Workbook { sheets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Row {
        tenant_id: Uuid,
        name: String,
        value: f64,
        active: bool,
        tags: Vec<String>,
        extra: Option<Value>,
    }

    #[test]
    fn nested_fields_are_stringified() {
        let rows = vec![
            Row {
                tenant_id: Uuid::nil(),
                name: "Padaria".into(),
                value: 10.5,
                active: true,
                tags: vec!["vip".into(), "sul".into()],
                extra: Some(json!({ "a": 1 })),
            },
            Row {
                tenant_id: Uuid::nil(),
                name: "Fábrica".into(),
                value: 0.0,
                active: false,
                tags: vec![],
                extra: None,
            },
        ];

        let sheet = to_sheet("Empresas", &rows).unwrap();

        assert!(!sheet.columns.contains(&"tenantId".to_string()));
        let idx = |c: &str| sheet.columns.iter().position(|x| x == c).unwrap();

        assert_eq!(sheet.rows[0][idx("name")], "Padaria");
        assert_eq!(sheet.rows[0][idx("value")], "10.5");
        assert_eq!(sheet.rows[0][idx("active")], "true");
        assert_eq!(sheet.rows[0][idx("tags")], r#"["vip","sul"]"#);
        assert_eq!(sheet.rows[0][idx("extra")], r#"{"a":1}"#);
        assert_eq!(sheet.rows[1][idx("extra")], "");
        assert_eq!(sheet.rows[1][idx("tags")], "[]");
    }

    #[test]
    fn empty_collection_gives_empty_sheet() {
        let sheet = to_sheet::<Row>("Tarefas", &[]).unwrap();
        assert!(sheet.columns.is_empty());
        assert!(sheet.rows.is_empty());
    }
}
