// src/config.rs

use std::{env, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        CrmRepository, DealRepository, FinanceRepository, SettingsRepository, TaskRepository,
        TenantRepository, UserRepository,
    },
    services::{
        auth::AuthService, crm_service::CrmService, dashboard_service::DashboardService,
        deal_service::DealService, export_service::ExportService,
        finance_service::FinanceService, import_service::ImportService,
        settings_service::SettingsService, stage_service::StageService,
        task_service::TaskService,
    },
};

/// Configuração lida do ambiente (.env aceito).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub default_locale: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(v) => v.parse().context("DB_MAX_CONNECTIONS inválido")?,
            Err(_) => 5,
        };
        let default_locale = env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "pt".to_string());

        Ok(Self { database_url, jwt_secret, bind_addr, db_max_connections, default_locale })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub i18n_store: I18nStore,

    pub auth_service: AuthService,
    pub crm_service: CrmService,
    pub deal_service: DealService,
    pub stage_service: StageService,
    pub finance_service: FinanceService,
    pub task_service: TaskService,
    pub settings_service: SettingsService,
    pub import_service: ImportService,
    pub export_service: ExportService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, config.jwt_secret.clone(), &config.default_locale))
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn with_pool(db_pool: PgPool, jwt_secret: String, default_locale: &str) -> Self {
        let user_repo = UserRepository::new();
        let tenant_repo = TenantRepository::new();
        let crm_repo = CrmRepository::new();
        let deal_repo = DealRepository::new();
        let finance_repo = FinanceRepository::new();
        let task_repo = TaskRepository::new();
        let settings_repo = SettingsRepository::new();

        let auth_service = AuthService::new(
            user_repo.clone(),
            tenant_repo,
            settings_repo.clone(),
            jwt_secret.clone(),
            db_pool.clone(),
        );

        Self {
            db_pool,
            jwt_secret,
            i18n_store: I18nStore::with_fallback(default_locale),
            auth_service,
            crm_service: CrmService::new(crm_repo.clone()),
            deal_service: DealService::new(
                deal_repo.clone(),
                crm_repo.clone(),
                settings_repo.clone(),
                finance_repo.clone(),
            ),
            stage_service: StageService::new(settings_repo.clone(), deal_repo.clone()),
            finance_service: FinanceService::new(finance_repo.clone()),
            task_service: TaskService::new(task_repo.clone()),
            settings_service: SettingsService::new(settings_repo.clone(), user_repo),
            import_service: ImportService::new(finance_repo.clone(), settings_repo),
            export_service: ExportService::new(crm_repo, deal_repo.clone(), task_repo.clone(), finance_repo.clone()),
            dashboard_service: DashboardService::new(deal_repo, finance_repo, task_repo),
        }
    }
}
