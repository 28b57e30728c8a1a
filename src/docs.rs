// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- CRM ---
        handlers::crm::list_companies,
        handlers::crm::create_company,
        handlers::crm::update_company,
        handlers::crm::delete_company,
        handlers::crm::duplicate_company,
        handlers::crm::add_company_note,
        handlers::crm::bulk_edit_companies,
        handlers::crm::list_contacts,
        handlers::crm::create_contact,
        handlers::crm::update_contact,
        handlers::crm::delete_contact,

        // --- Notes ---
        handlers::crm::list_notes,
        handlers::crm::create_note,
        handlers::crm::update_note,
        handlers::crm::delete_note,

        // --- Deals ---
        handlers::deals::list_deals,
        handlers::deals::create_deal,
        handlers::deals::update_deal,
        handlers::deals::delete_deal,
        handlers::deals::get_board,
        handlers::deals::move_deal,
        handlers::deals::confirm_won,
        handlers::deals::add_interaction,

        // --- Tasks ---
        handlers::tasks::list_tasks,
        handlers::tasks::create_task,
        handlers::tasks::update_task,
        handlers::tasks::delete_task,

        // --- Finance ---
        handlers::finance::list_records,
        handlers::finance::create_record,
        handlers::finance::update_record,
        handlers::finance::delete_record,
        handlers::finance::list_banks,
        handlers::finance::create_bank,
        handlers::finance::update_bank,
        handlers::finance::delete_bank,
        handlers::finance::get_statement,
        handlers::finance::list_accounts,
        handlers::finance::create_account,
        handlers::finance::update_account,
        handlers::finance::delete_account,

        // --- Settings ---
        handlers::settings::get_organization,
        handlers::settings::update_organization,
        handlers::settings::list_users,
        handlers::settings::create_user,
        handlers::settings::update_user,
        handlers::settings::delete_user,
        handlers::settings::list_lookups,
        handlers::settings::create_lookup,
        handlers::settings::update_lookup,
        handlers::settings::delete_lookup,
        handlers::settings::list_stages,
        handlers::settings::create_stage,
        handlers::settings::update_stage,
        handlers::settings::delete_stage,
        handlers::settings::reorder_stages,

        // --- Data ---
        handlers::data::import_csv,
        handlers::data::export_workbook,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_alerts,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::Module,
            models::auth::User,
            models::auth::RegisterPayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- CRM ---
            models::crm::CompanyStatus,
            models::crm::CompanyNote,
            models::crm::Company,
            models::crm::CompanyPayload,
            models::crm::AddCompanyNotePayload,
            models::crm::BulkEditField,
            models::crm::BulkEditPayload,
            models::crm::BulkEditResult,
            models::crm::Contact,
            models::crm::ContactPayload,
            models::crm::GeneralNote,
            models::crm::NotePayload,

            // --- Deals ---
            models::deals::Temperature,
            models::deals::DealStage,
            models::deals::InteractionKind,
            models::deals::Interaction,
            models::deals::Deal,
            models::deals::DealPayload,
            models::deals::MoveTarget,
            models::deals::MoveDealPayload,
            models::deals::MoveOutcome,
            models::deals::WonRecordDraft,
            models::deals::ConfirmWonPayload,
            models::deals::WonResult,
            models::deals::AddInteractionPayload,
            models::deals::ColumnKind,
            models::deals::BoardColumn,
            models::deals::PipelineBoard,

            // --- Tasks ---
            models::tasks::TaskKind,
            models::tasks::TaskPriority,
            models::tasks::TaskStatus,
            models::tasks::Task,
            models::tasks::TaskPayload,

            // --- Finance ---
            models::finance::RecordKind,
            models::finance::RecordStatus,
            models::finance::Bank,
            models::finance::ChartAccount,
            models::finance::FinancialRecord,
            models::finance::RecordPayload,
            models::finance::BankPayload,
            models::finance::ChartAccountPayload,
            models::finance::ChartPoint,
            models::finance::StatementRow,
            models::finance::CashFlowProjection,

            // --- Settings ---
            models::settings::OrganizationSettings,
            models::settings::UpdateOrganizationRequest,
            models::settings::StageScope,
            models::settings::StageConfig,
            models::settings::StagePayload,
            models::settings::ReorderStagesPayload,
            models::settings::LookupKind,
            models::settings::LookupItem,
            models::settings::LookupPayload,
            models::settings::CreateUserPayload,
            models::settings::UpdateUserPayload,
            models::settings::ImportKind,
            models::settings::ImportResult,

            // --- Data / Dashboard ---
            models::export::Sheet,
            models::export::Workbook,
            models::dashboard::DashboardSummary,
            models::dashboard::AlertKind,
            models::dashboard::Alert,
        )
    ),
    tags(
        (name = "Auth", description = "Cadastro da organização e login"),
        (name = "CRM", description = "Empresas e contatos"),
        (name = "Notes", description = "Bloco de notas"),
        (name = "Deals", description = "Negócios e funil de vendas"),
        (name = "Tasks", description = "Tarefas e agenda"),
        (name = "Finance", description = "Lançamentos, bancos, extrato e plano de contas"),
        (name = "Settings", description = "Organização, usuários, listas e etapas"),
        (name = "Data", description = "Importação CSV e exportação"),
        (name = "Dashboard", description = "Indicadores e alertas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_board_and_statement() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/deals/board"));
        assert!(doc.paths.paths.contains_key("/api/finance/banks/{id}/statement"));
    }
}
