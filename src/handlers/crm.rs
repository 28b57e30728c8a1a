// src/handlers/crm.rs

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
        rbac::{PermCompanies, PermContacts, PermNotes, RequirePermission},
        tenancy::TenantContext,
    },
    models::crm::{
        AddCompanyNotePayload, BulkEditPayload, BulkEditResult, Company, CompanyPayload, Contact,
        ContactPayload, GeneralNote, NotePayload,
    },
};

// =============================================================================
//  ÁREA 1: EMPRESAS
// =============================================================================

// GET /api/companies
#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "CRM",
    responses(
        (status = 200, description = "Empresas da organização", body = Vec<Company>),
        (status = 403, description = "Sem acesso ao módulo")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_companies(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermCompanies>,
) -> Result<impl IntoResponse, ApiError> {
    let companies = app_state
        .crm_service
        .list_companies(&app_state.db_pool, tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(companies)))
}

// POST /api/companies
#[utoipa::path(
    post,
    path = "/api/companies",
    tag = "CRM",
    request_body = CompanyPayload,
    responses(
        (status = 201, description = "Empresa criada", body = Company),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_company(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermCompanies>,
    Json(payload): Json<CompanyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let company = app_state
        .crm_service
        .create_company(&app_state.db_pool, tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(company)))
}

// PUT /api/companies/{id}
#[utoipa::path(
    put,
    path = "/api/companies/{id}",
    tag = "CRM",
    request_body = CompanyPayload,
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa atualizada", body = Company),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_company(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermCompanies>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompanyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let company = app_state
        .crm_service
        .update_company(&app_state.db_pool, tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(company)))
}

// DELETE /api/companies/{id}
#[utoipa::path(
    delete,
    path = "/api/companies/{id}",
    tag = "CRM",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 204, description = "Empresa removida"),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_company(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermCompanies>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .crm_service
        .delete_company(&app_state.db_pool, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/companies/{id}/duplicate
#[utoipa::path(
    post,
    path = "/api/companies/{id}/duplicate",
    tag = "CRM",
    params(("id" = Uuid, Path, description = "ID da empresa original")),
    responses(
        (status = 201, description = "Cópia criada", body = Company),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn duplicate_company(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermCompanies>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let copy = app_state
        .crm_service
        .duplicate_company(&app_state.db_pool, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(copy)))
}

// POST /api/companies/{id}/notes
#[utoipa::path(
    post,
    path = "/api/companies/{id}/notes",
    tag = "CRM",
    request_body = AddCompanyNotePayload,
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Nota anexada à empresa", body = Company),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_company_note(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermCompanies>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddCompanyNotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let company = app_state
        .crm_service
        .add_company_note(&app_state.db_pool, tenant.0, id, &payload, &user.0.name)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(company)))
}

// PATCH /api/companies/bulk
#[utoipa::path(
    patch,
    path = "/api/companies/bulk",
    tag = "CRM",
    request_body = BulkEditPayload,
    responses(
        (status = 200, description = "Quantidade de empresas alteradas", body = BulkEditResult),
        (status = 400, description = "Seleção vazia ou valor em branco")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_edit_companies(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermCompanies>,
    Json(payload): Json<BulkEditPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let result = app_state
        .crm_service
        .bulk_edit(&app_state.db_pool, tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}

// =============================================================================
//  ÁREA 2: CONTATOS
// =============================================================================

// GET /api/contacts
#[utoipa::path(
    get,
    path = "/api/contacts",
    tag = "CRM",
    responses((status = 200, description = "Contatos da organização", body = Vec<Contact>)),
    security(("api_jwt" = []))
)]
pub async fn list_contacts(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermContacts>,
) -> Result<impl IntoResponse, ApiError> {
    let contacts = app_state
        .crm_service
        .list_contacts(&app_state.db_pool, tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(contacts)))
}

// POST /api/contacts
#[utoipa::path(
    post,
    path = "/api/contacts",
    tag = "CRM",
    request_body = ContactPayload,
    responses(
        (status = 201, description = "Contato criado", body = Contact),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contact(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermContacts>,
    Json(payload): Json<ContactPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let contact = app_state
        .crm_service
        .create_contact(&app_state.db_pool, tenant.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(contact)))
}

// PUT /api/contacts/{id}
#[utoipa::path(
    put,
    path = "/api/contacts/{id}",
    tag = "CRM",
    request_body = ContactPayload,
    params(("id" = Uuid, Path, description = "ID do contato")),
    responses(
        (status = 200, description = "Contato atualizado", body = Contact),
        (status = 404, description = "Contato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_contact(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermContacts>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContactPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let contact = app_state
        .crm_service
        .update_contact(&app_state.db_pool, tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(contact)))
}

// DELETE /api/contacts/{id}
#[utoipa::path(
    delete,
    path = "/api/contacts/{id}",
    tag = "CRM",
    params(("id" = Uuid, Path, description = "ID do contato")),
    responses(
        (status = 204, description = "Contato removido"),
        (status = 404, description = "Contato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_contact(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermContacts>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .crm_service
        .delete_contact(&app_state.db_pool, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 3: BLOCO DE NOTAS
// =============================================================================

// GET /api/notes
#[utoipa::path(
    get,
    path = "/api/notes",
    tag = "Notes",
    responses((status = 200, description = "Notas da organização", body = Vec<GeneralNote>)),
    security(("api_jwt" = []))
)]
pub async fn list_notes(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermNotes>,
) -> Result<impl IntoResponse, ApiError> {
    let notes = app_state
        .crm_service
        .list_notes(&app_state.db_pool, tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(notes)))
}

// POST /api/notes
#[utoipa::path(
    post,
    path = "/api/notes",
    tag = "Notes",
    request_body = NotePayload,
    responses(
        (status = 201, description = "Nota criada", body = GeneralNote),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_note(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermNotes>,
    Json(payload): Json<NotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let note = app_state
        .crm_service
        .create_note(&app_state.db_pool, tenant.0, &payload, &user.0.name)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(note)))
}

// PUT /api/notes/{id}
#[utoipa::path(
    put,
    path = "/api/notes/{id}",
    tag = "Notes",
    request_body = NotePayload,
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 200, description = "Nota atualizada", body = GeneralNote),
        (status = 404, description = "Nota não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_note(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermNotes>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let note = app_state
        .crm_service
        .update_note(&app_state.db_pool, tenant.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(note)))
}

// DELETE /api/notes/{id}
#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    tag = "Notes",
    params(("id" = Uuid, Path, description = "ID da nota")),
    responses(
        (status = 204, description = "Nota removida"),
        (status = 404, description = "Nota não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_note(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermNotes>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .crm_service
        .delete_note(&app_state.db_pool, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
