// src/handlers/data.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermExports, PermSettings, RequirePermission},
        tenancy::TenantContext,
    },
    models::{
        export::{ExportQuery, Workbook},
        settings::{ImportKind, ImportResult},
    },
};

// POST /api/import/{kind}
// Corpo: texto CSV separado por ponto e vírgula, com cabeçalho
#[utoipa::path(
    post,
    path = "/api/import/{kind}",
    tag = "Data",
    request_body(content = String, content_type = "text/csv", description = "nome;agencia;conta;saldo_inicial (bancos) ou nome (listas)"),
    params(("kind" = ImportKind, Path, description = "banks | segments | revenue-types")),
    responses(
        (status = 200, description = "Quantidade inserida e ignorada", body = ImportResult),
        (status = 400, description = "Arquivo inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_csv(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermSettings>,
    Path(kind): Path<ImportKind>,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let result = app_state
        .import_service
        .import(&app_state.db_pool, tenant.0, kind, &body)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}

// GET /api/export?entities=companies,deals
#[utoipa::path(
    get,
    path = "/api/export",
    tag = "Data",
    params(ExportQuery),
    responses((status = 200, description = "Uma planilha por entidade pedida", body = Workbook)),
    security(("api_jwt" = []))
)]
pub async fn export_workbook(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermExports>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let workbook = app_state
        .export_service
        .export(&app_state.db_pool, tenant.0, &query.entities)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(workbook)))
}
