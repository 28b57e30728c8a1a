// src/handlers/finance.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermFinance, RequirePermission},
        tenancy::TenantContext,
    },
    models::finance::{
        Bank, BankPayload, CashFlowProjection, ChartAccount, ChartAccountPayload, FinancialRecord,
        RecordPayload,
    },
};

// =============================================================================
//  ÁREA 1: LANÇAMENTOS
// =============================================================================

// GET /api/finance/records
#[utoipa::path(
    get,
    path = "/api/finance/records",
    tag = "Finance",
    responses((status = 200, description = "Lançamentos da organização", body = Vec<FinancialRecord>)),
    security(("api_jwt" = []))
)]
pub async fn list_records(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermFinance>,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .finance_service
        .list_records(&app_state.db_pool, tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(items)))
}

// POST /api/finance/records
#[utoipa::path(
    post,
    path = "/api/finance/records",
    tag = "Finance",
    request_body = RecordPayload,
    responses(
        (status = 201, description = "Lançamento criado", body = FinancialRecord),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_record(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermFinance>,
    Json(payload): Json<RecordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let created = app_state
        .finance_service
        .create_record(&app_state.db_pool, tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(created)))
}

// PUT /api/finance/records/{id}
#[utoipa::path(
    put,
    path = "/api/finance/records/{id}",
    tag = "Finance",
    request_body = RecordPayload,
    params(("id" = Uuid, Path, description = "ID do lançamento")),
    responses(
        (status = 200, description = "Lançamento atualizado", body = FinancialRecord),
        (status = 404, description = "Lançamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_record(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermFinance>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let updated = app_state
        .finance_service
        .update_record(&app_state.db_pool, tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(updated)))
}

// DELETE /api/finance/records/{id}
#[utoipa::path(
    delete,
    path = "/api/finance/records/{id}",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID do lançamento")),
    responses(
        (status = 204, description = "Lançamento removido"),
        (status = 404, description = "Lançamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_record(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermFinance>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .finance_service
        .delete_record(&app_state.db_pool, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: BANCOS E EXTRATO
// =============================================================================

// GET /api/finance/banks
#[utoipa::path(
    get,
    path = "/api/finance/banks",
    tag = "Finance",
    responses((status = 200, description = "Contas bancárias", body = Vec<Bank>)),
    security(("api_jwt" = []))
)]
pub async fn list_banks(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermFinance>,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .finance_service
        .list_banks(&app_state.db_pool, tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(items)))
}

// POST /api/finance/banks
#[utoipa::path(
    post,
    path = "/api/finance/banks",
    tag = "Finance",
    request_body = BankPayload,
    responses(
        (status = 201, description = "Banco criado", body = Bank),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_bank(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermFinance>,
    Json(payload): Json<BankPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let created = app_state
        .finance_service
        .create_bank(&app_state.db_pool, tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(created)))
}

// PUT /api/finance/banks/{id}
#[utoipa::path(
    put,
    path = "/api/finance/banks/{id}",
    tag = "Finance",
    request_body = BankPayload,
    params(("id" = Uuid, Path, description = "ID do banco")),
    responses(
        (status = 200, description = "Banco atualizado", body = Bank),
        (status = 404, description = "Banco não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_bank(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermFinance>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BankPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let updated = app_state
        .finance_service
        .update_bank(&app_state.db_pool, tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(updated)))
}

// DELETE /api/finance/banks/{id}
#[utoipa::path(
    delete,
    path = "/api/finance/banks/{id}",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID do banco")),
    responses(
        (status = 204, description = "Banco removido"),
        (status = 404, description = "Banco não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_bank(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermFinance>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .finance_service
        .delete_bank(&app_state.db_pool, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/finance/banks/{id}/statement
#[utoipa::path(
    get,
    path = "/api/finance/banks/{id}/statement",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID do banco")),
    responses(
        (status = 200, description = "Extrato com saldo projetado e realizado", body = CashFlowProjection),
        (status = 404, description = "Banco não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_statement(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermFinance>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let projection = app_state
        .finance_service
        .statement(&app_state.db_pool, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(projection)))
}

// =============================================================================
//  ÁREA 3: PLANO DE CONTAS
// =============================================================================

// GET /api/finance/accounts
#[utoipa::path(
    get,
    path = "/api/finance/accounts",
    tag = "Finance",
    responses((status = 200, description = "Rubricas do plano de contas", body = Vec<ChartAccount>)),
    security(("api_jwt" = []))
)]
pub async fn list_accounts(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermFinance>,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .finance_service
        .list_accounts(&app_state.db_pool, tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(items)))
}

// POST /api/finance/accounts
#[utoipa::path(
    post,
    path = "/api/finance/accounts",
    tag = "Finance",
    request_body = ChartAccountPayload,
    responses(
        (status = 201, description = "Rubrica criada", body = ChartAccount),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_account(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermFinance>,
    Json(payload): Json<ChartAccountPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let created = app_state
        .finance_service
        .create_account(&app_state.db_pool, tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(created)))
}

// PUT /api/finance/accounts/{id}
#[utoipa::path(
    put,
    path = "/api/finance/accounts/{id}",
    tag = "Finance",
    request_body = ChartAccountPayload,
    params(("id" = Uuid, Path, description = "ID da rubrica")),
    responses(
        (status = 200, description = "Rubrica atualizada", body = ChartAccount),
        (status = 404, description = "Rubrica não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_account(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermFinance>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChartAccountPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let updated = app_state
        .finance_service
        .update_account(&app_state.db_pool, tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(updated)))
}

// DELETE /api/finance/accounts/{id}
#[utoipa::path(
    delete,
    path = "/api/finance/accounts/{id}",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID da rubrica")),
    responses(
        (status = 204, description = "Rubrica removida"),
        (status = 404, description = "Rubrica não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_account(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermFinance>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .finance_service
        .delete_account(&app_state.db_pool, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
