pub mod user_repo;
pub use user_repo::UserRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
pub mod crm_repo;
pub use crm_repo::CrmRepository;
pub mod deal_repo;
pub use deal_repo::DealRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod task_repo;
pub use task_repo::TaskRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
