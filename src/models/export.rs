// src/models/export.rs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// Planilha "achatada": toda célula já é texto
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    #[schema(example = "Empresas")]
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// Lista separada por vírgula: companies,contacts,deals,tasks,finance,banks,notes
    #[param(example = "companies,deals")]
    pub entities: String,
}
