// src/handlers/settings.rs

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
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermSettings, RequireAdmin, RequirePermission},
        tenancy::TenantContext,
    },
    models::{
        auth::User,
        settings::{
            CreateUserPayload, LookupItem, LookupKind, LookupPayload, OrganizationSettings,
            ReorderStagesPayload, StageConfig, StagePayload, StageScope, UpdateOrganizationRequest,
            UpdateUserPayload,
        },
    },
};

// =============================================================================
//  ÁREA 1: ORGANIZAÇÃO
// =============================================================================

// GET /api/settings/organization
#[utoipa::path(
    get,
    path = "/api/settings/organization",
    tag = "Settings",
    responses((status = 200, description = "Dados da organização", body = OrganizationSettings)),
    security(("api_jwt" = []))
)]
pub async fn get_organization(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let settings = app_state
        .settings_service
        .get_organization(&app_state.db_pool, tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/settings/organization
#[utoipa::path(
    put,
    path = "/api/settings/organization",
    tag = "Settings",
    request_body = UpdateOrganizationRequest,
    responses(
        (status = 200, description = "Dados da organização atualizados", body = OrganizationSettings),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_organization(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermSettings>,
    Json(payload): Json<UpdateOrganizationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let updated = app_state
        .settings_service
        .update_organization(&app_state.db_pool, tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(updated)))
}

// =============================================================================
//  ÁREA 2: USUÁRIOS (somente administradores)
// =============================================================================

// GET /api/settings/users
#[utoipa::path(
    get,
    path = "/api/settings/users",
    tag = "Settings",
    responses(
        (status = 200, description = "Usuários da organização", body = Vec<User>),
        (status = 403, description = "Somente administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state
        .settings_service
        .list_users(&app_state.db_pool, tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(users)))
}

// POST /api/settings/users
#[utoipa::path(
    post,
    path = "/api/settings/users",
    tag = "Settings",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _admin: RequireAdmin,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .settings_service
        .create_user(&app_state.db_pool, tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(user)))
}

// PUT /api/settings/users/{id}
#[utoipa::path(
    put,
    path = "/api/settings/users/{id}",
    tag = "Settings",
    request_body = UpdateUserPayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário atualizado", body = User),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .settings_service
        .update_user(&app_state.db_pool, tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(user)))
}

// DELETE /api/settings/users/{id}
#[utoipa::path(
    delete,
    path = "/api/settings/users/{id}",
    tag = "Settings",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 204, description = "Usuário removido"),
        (status = 403, description = "Tentativa de remover a própria conta"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    user: AuthenticatedUser,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .settings_service
        .delete_user(&app_state.db_pool, tenant.0, user.0.id, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 3: LISTAS (segmentos, tipos de receita, tags)
// =============================================================================

// GET /api/lists/{kind}
#[utoipa::path(
    get,
    path = "/api/lists/{kind}",
    tag = "Settings",
    params(("kind" = LookupKind, Path, description = "segments | revenue-types | tags")),
    responses((status = 200, description = "Itens da lista", body = Vec<LookupItem>)),
    security(("api_jwt" = []))
)]
pub async fn list_lookups(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(kind): Path<LookupKind>,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .settings_service
        .list_lookups(&app_state.db_pool, tenant.0, kind)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(items)))
}

// POST /api/lists/{kind}
#[utoipa::path(
    post,
    path = "/api/lists/{kind}",
    tag = "Settings",
    request_body = LookupPayload,
    params(("kind" = LookupKind, Path, description = "segments | revenue-types | tags")),
    responses(
        (status = 201, description = "Item criado", body = LookupItem),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lookup(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermSettings>,
    Path(kind): Path<LookupKind>,
    Json(payload): Json<LookupPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let item = app_state
        .settings_service
        .create_lookup(&app_state.db_pool, tenant.0, kind, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(item)))
}

// PUT /api/lists/{kind}/{id}
#[utoipa::path(
    put,
    path = "/api/lists/{kind}/{id}",
    tag = "Settings",
    request_body = LookupPayload,
    params(
        ("kind" = LookupKind, Path, description = "segments | revenue-types | tags"),
        ("id" = Uuid, Path, description = "ID do item")
    ),
    responses(
        (status = 200, description = "Item atualizado", body = LookupItem),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lookup(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermSettings>,
    Path((kind, id)): Path<(LookupKind, Uuid)>,
    Json(payload): Json<LookupPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let item = app_state
        .settings_service
        .update_lookup(&app_state.db_pool, tenant.0, kind, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(item)))
}

// DELETE /api/lists/{kind}/{id}
#[utoipa::path(
    delete,
    path = "/api/lists/{kind}/{id}",
    tag = "Settings",
    params(
        ("kind" = LookupKind, Path, description = "segments | revenue-types | tags"),
        ("id" = Uuid, Path, description = "ID do item")
    ),
    responses(
        (status = 204, description = "Item removido"),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lookup(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermSettings>,
    Path((kind, id)): Path<(LookupKind, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .settings_service
        .delete_lookup(&app_state.db_pool, tenant.0, kind, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 4: ETAPAS (funil de negócios e quadro de tarefas)
// =============================================================================

// GET /api/stages/{scope}
#[utoipa::path(
    get,
    path = "/api/stages/{scope}",
    tag = "Settings",
    params(("scope" = StageScope, Path, description = "deal | task")),
    responses((status = 200, description = "Etapas em ordem", body = Vec<StageConfig>)),
    security(("api_jwt" = []))
)]
pub async fn list_stages(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(scope): Path<StageScope>,
) -> Result<impl IntoResponse, ApiError> {
    let stages = app_state
        .stage_service
        .list(&app_state.db_pool, tenant.0, scope)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(stages)))
}

// POST /api/stages/{scope}
#[utoipa::path(
    post,
    path = "/api/stages/{scope}",
    tag = "Settings",
    request_body = StagePayload,
    params(("scope" = StageScope, Path, description = "deal | task")),
    responses(
        (status = 201, description = "Etapa criada antes da etapa final", body = StageConfig),
        (status = 409, description = "Nome já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_stage(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermSettings>,
    Path(scope): Path<StageScope>,
    Json(payload): Json<StagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let stage = app_state
        .stage_service
        .create(&app_state.db_pool, tenant.0, scope, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(stage)))
}

// PUT /api/stages/{scope}/{id}
#[utoipa::path(
    put,
    path = "/api/stages/{scope}/{id}",
    tag = "Settings",
    request_body = StagePayload,
    params(
        ("scope" = StageScope, Path, description = "deal | task"),
        ("id" = Uuid, Path, description = "ID da etapa")
    ),
    responses(
        (status = 200, description = "Etapa renomeada/ocultada", body = StageConfig),
        (status = 404, description = "Etapa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_stage(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermSettings>,
    Path((scope, id)): Path<(StageScope, Uuid)>,
    Json(payload): Json<StagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let stage = app_state
        .stage_service
        .update(&app_state.db_pool, tenant.0, scope, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(stage)))
}

// DELETE /api/stages/{scope}/{id}
#[utoipa::path(
    delete,
    path = "/api/stages/{scope}/{id}",
    tag = "Settings",
    params(
        ("scope" = StageScope, Path, description = "deal | task"),
        ("id" = Uuid, Path, description = "ID da etapa")
    ),
    responses(
        (status = 204, description = "Etapa removida"),
        (status = 409, description = "Etapa fixa")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_stage(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermSettings>,
    Path((scope, id)): Path<(StageScope, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .stage_service
        .delete(&app_state.db_pool, tenant.0, scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// PUT /api/stages/{scope}/order
#[utoipa::path(
    put,
    path = "/api/stages/{scope}/order",
    tag = "Settings",
    request_body = ReorderStagesPayload,
    params(("scope" = StageScope, Path, description = "deal | task")),
    responses(
        (status = 200, description = "Etapas na nova ordem", body = Vec<StageConfig>),
        (status = 400, description = "Lista incompleta ou repetida"),
        (status = 409, description = "Tentativa de mover etapa fixa")
    ),
    security(("api_jwt" = []))
)]
pub async fn reorder_stages(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermSettings>,
    Path(scope): Path<StageScope>,
    Json(payload): Json<ReorderStagesPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let stages = app_state
        .stage_service
        .reorder(&app_state.db_pool, tenant.0, scope, &payload.ids)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(stages)))
}
