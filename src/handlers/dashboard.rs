// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermDashboard, RequirePermission},
        tenancy::TenantContext,
    },
    models::dashboard::{Alert, DashboardSummary},
};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Indicadores do funil, do financeiro e das tarefas", body = DashboardSummary),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Sem acesso ao módulo")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermDashboard>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .dashboard_service
        .get_summary(&app_state.db_pool, tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/dashboard/alerts
#[utoipa::path(
    get,
    path = "/api/dashboard/alerts",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Lançamentos e tarefas vencidos, negócios parados", body = Vec<Alert>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_alerts(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    _perm: RequirePermission<PermDashboard>,
) -> Result<impl IntoResponse, ApiError> {
    let alerts = app_state
        .dashboard_service
        .get_alerts(&app_state.db_pool, tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(alerts)))
}
