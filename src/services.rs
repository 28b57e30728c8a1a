pub mod auth;
pub mod cashflow;
pub mod crm_service;
pub mod dashboard_service;
pub mod deal_service;
pub mod export_service;
pub mod finance_service;
pub mod import_service;
pub mod pipeline;
pub mod settings_service;
pub mod stage_service;
pub mod task_service;
