// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod workspace;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

/// Monta o roteador completo da API.
pub fn app(app_state: AppState) -> Router {
    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let protected_routes = Router::new()
        .route("/auth/me", get(handlers::auth::get_me))
        // CRM
        .route(
            "/companies",
            get(handlers::crm::list_companies).post(handlers::crm::create_company),
        )
        .route("/companies/bulk", patch(handlers::crm::bulk_edit_companies))
        .route(
            "/companies/{id}",
            put(handlers::crm::update_company).delete(handlers::crm::delete_company),
        )
        .route("/companies/{id}/duplicate", post(handlers::crm::duplicate_company))
        .route("/companies/{id}/notes", post(handlers::crm::add_company_note))
        .route(
            "/contacts",
            get(handlers::crm::list_contacts).post(handlers::crm::create_contact),
        )
        .route(
            "/contacts/{id}",
            put(handlers::crm::update_contact).delete(handlers::crm::delete_contact),
        )
        .route(
            "/notes",
            get(handlers::crm::list_notes).post(handlers::crm::create_note),
        )
        .route(
            "/notes/{id}",
            put(handlers::crm::update_note).delete(handlers::crm::delete_note),
        )
        // Negócios
        .route(
            "/deals",
            get(handlers::deals::list_deals).post(handlers::deals::create_deal),
        )
        .route("/deals/board", get(handlers::deals::get_board))
        .route(
            "/deals/{id}",
            put(handlers::deals::update_deal).delete(handlers::deals::delete_deal),
        )
        .route("/deals/{id}/move", post(handlers::deals::move_deal))
        .route("/deals/{id}/win", post(handlers::deals::confirm_won))
        .route("/deals/{id}/interactions", post(handlers::deals::add_interaction))
        // Tarefas
        .route(
            "/tasks",
            get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
        )
        .route(
            "/tasks/{id}",
            put(handlers::tasks::update_task).delete(handlers::tasks::delete_task),
        )
        // Financeiro
        .route(
            "/finance/records",
            get(handlers::finance::list_records).post(handlers::finance::create_record),
        )
        .route(
            "/finance/records/{id}",
            put(handlers::finance::update_record).delete(handlers::finance::delete_record),
        )
        .route(
            "/finance/banks",
            get(handlers::finance::list_banks).post(handlers::finance::create_bank),
        )
        .route(
            "/finance/banks/{id}",
            put(handlers::finance::update_bank).delete(handlers::finance::delete_bank),
        )
        .route("/finance/banks/{id}/statement", get(handlers::finance::get_statement))
        .route(
            "/finance/accounts",
            get(handlers::finance::list_accounts).post(handlers::finance::create_account),
        )
        .route(
            "/finance/accounts/{id}",
            put(handlers::finance::update_account).delete(handlers::finance::delete_account),
        )
        // Configurações
        .route(
            "/settings/organization",
            get(handlers::settings::get_organization).put(handlers::settings::update_organization),
        )
        .route(
            "/settings/users",
            get(handlers::settings::list_users).post(handlers::settings::create_user),
        )
        .route(
            "/settings/users/{id}",
            put(handlers::settings::update_user).delete(handlers::settings::delete_user),
        )
        .route(
            "/lists/{kind}",
            get(handlers::settings::list_lookups).post(handlers::settings::create_lookup),
        )
        .route(
            "/lists/{kind}/{id}",
            put(handlers::settings::update_lookup).delete(handlers::settings::delete_lookup),
        )
        .route(
            "/stages/{scope}",
            get(handlers::settings::list_stages).post(handlers::settings::create_stage),
        )
        .route("/stages/{scope}/order", put(handlers::settings::reorder_stages))
        .route(
            "/stages/{scope}/{id}",
            put(handlers::settings::update_stage).delete(handlers::settings::delete_stage),
        )
        // Importação / exportação
        .route("/import/{kind}", post(handlers::data::import_csv))
        .route("/export", get(handlers::data::export_workbook))
        // Dashboard
        .route("/dashboard/summary", get(handlers::dashboard::get_summary))
        .route("/dashboard/alerts", get(handlers::dashboard::get_alerts))
        // Aplica o middleware de autenticação em tudo
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
