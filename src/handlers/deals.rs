// src/handlers/deals.rs

use axum::{
    extract::{Path, Query, State},
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
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermDeals, RequirePermission},
        tenancy::TenantContext,
    },
    models::deals::{
        AddInteractionPayload, ConfirmWonPayload, Deal, DealFilter, DealPayload, MoveDealPayload,
        MoveOutcome, PipelineBoard, WonResult,
    },
};

// GET /api/deals
#[utoipa::path(
    get,
    path = "/api/deals",
    tag = "Deals",
    responses((status = 200, description = "Negócios da organização", body = Vec<Deal>)),
    security(("api_jwt" = []))
)]
pub async fn list_deals(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermDeals>,
) -> Result<impl IntoResponse, ApiError> {
    let deals = app_state
        .deal_service
        .list(&app_state.db_pool, tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(deals)))
}

// POST /api/deals
#[utoipa::path(
    post,
    path = "/api/deals",
    tag = "Deals",
    request_body = DealPayload,
    responses(
        (status = 201, description = "Negócio criado", body = Deal),
        (status = 400, description = "Dados inválidos"),
        (status = 422, description = "Etapa desconhecida ou ganho sem confirmação")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_deal(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermDeals>,
    Json(payload): Json<DealPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let deal = app_state
        .deal_service
        .create(&app_state.db_pool, tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(deal)))
}

// PUT /api/deals/{id}
#[utoipa::path(
    put,
    path = "/api/deals/{id}",
    tag = "Deals",
    request_body = DealPayload,
    params(("id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 200, description = "Negócio atualizado", body = Deal),
        (status = 404, description = "Negócio não encontrado"),
        (status = 422, description = "Etapa desconhecida ou ganho sem confirmação")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_deal(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermDeals>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DealPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let deal = app_state
        .deal_service
        .update(&app_state.db_pool, tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(deal)))
}

// DELETE /api/deals/{id}
#[utoipa::path(
    delete,
    path = "/api/deals/{id}",
    tag = "Deals",
    params(("id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 204, description = "Negócio removido"),
        (status = 404, description = "Negócio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_deal(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermDeals>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .deal_service
        .delete(&app_state.db_pool, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/deals/board
#[utoipa::path(
    get,
    path = "/api/deals/board",
    tag = "Deals",
    params(DealFilter),
    responses((status = 200, description = "Quadro do funil, colunas em ordem", body = PipelineBoard)),
    security(("api_jwt" = []))
)]
pub async fn get_board(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermDeals>,
    Query(filter): Query<DealFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let board = app_state
        .deal_service
        .board(&app_state.db_pool, tenant.0, &filter)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(board)))
}

// POST /api/deals/{id}/move
#[utoipa::path(
    post,
    path = "/api/deals/{id}/move",
    tag = "Deals",
    request_body = MoveDealPayload,
    params(("id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 200, description = "Negócio movido, ou rascunho do faturamento quando o destino é ganho", body = MoveOutcome),
        (status = 409, description = "Negócio já ganho"),
        (status = 422, description = "Etapa desconhecida")
    ),
    security(("api_jwt" = []))
)]
pub async fn move_deal(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermDeals>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveDealPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state
        .deal_service
        .move_deal(&app_state.db_pool, tenant.0, id, &payload.target, &user.0.name)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(outcome)))
}

// POST /api/deals/{id}/win
#[utoipa::path(
    post,
    path = "/api/deals/{id}/win",
    tag = "Deals",
    request_body = ConfirmWonPayload,
    params(("id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 201, description = "Negócio ganho e lançamento de receita criado", body = WonResult),
        (status = 400, description = "Dados do lançamento inválidos"),
        (status = 409, description = "Negócio já ganho")
    ),
    security(("api_jwt" = []))
)]
pub async fn confirm_won(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermDeals>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConfirmWonPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let result = app_state
        .deal_service
        .confirm_won(&app_state.db_pool, tenant.0, id, &payload, &user.0.name)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(result)))
}

// POST /api/deals/{id}/interactions
#[utoipa::path(
    post,
    path = "/api/deals/{id}/interactions",
    tag = "Deals",
    request_body = AddInteractionPayload,
    params(("id" = Uuid, Path, description = "ID do negócio")),
    responses(
        (status = 200, description = "Interação registrada", body = Deal),
        (status = 404, description = "Negócio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_interaction(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermDeals>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddInteractionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let deal = app_state
        .deal_service
        .add_interaction(&app_state.db_pool, tenant.0, id, &payload, &user.0.name)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(deal)))
}
