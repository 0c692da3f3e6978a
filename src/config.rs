// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        CrmRepository, DashboardRepository, FinanceRepository, InventoryRepository, OrderRepository,
        PurchasingRepository, SettingsRepository, TenantRepository, UserRepository,
    },
    services::{
        auth::AuthService, crm_service::CrmService, dashboard_service::DashboardService,
        document_service::DocumentService, finance_service::FinanceService, inventory_service::InventoryService,
        order_service::OrderService, purchasing_service::PurchasingService, settings_service::SettingsService,
        tenancy_service::TenantService, user_service::UserService,
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub app_env: String,
    pub fonts_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {}", raw))?,
            Err(_) => 5,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections,
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            fonts_dir: env::var("FONTS_DIR").unwrap_or_else(|_| "./fonts".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Config,

    // Serviços
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub tenant_service: TenantService,
    pub inventory_service: InventoryService,
    pub order_service: OrderService,
    pub purchasing_service: PurchasingService,
    pub crm_service: CrmService,
    pub finance_service: FinanceService,
    pub settings_service: SettingsService,
    pub dashboard_service: DashboardService,
    pub document_service: DocumentService,

    // Leituras simples vão direto ao repositório
    pub order_repo: OrderRepository,
    pub purchasing_repo: PurchasingRepository,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new();
        let tenant_repo = TenantRepository::new();
        let settings_repo = SettingsRepository::new();
        let order_repo = OrderRepository::new();
        let finance_repo = FinanceRepository::new();

        let settings_service = SettingsService::new(settings_repo.clone());

        Ok(Self {
            auth_service: AuthService::new(
                db_pool.clone(),
                user_repo.clone(),
                tenant_repo.clone(),
                settings_repo.clone(),
                config.jwt_secret.clone(),
            ),
            user_service: UserService::new(user_repo),
            tenant_service: TenantService::new(tenant_repo),
            inventory_service: InventoryService::new(InventoryRepository::new(), settings_service.clone()),
            order_service: OrderService::new(),
            purchasing_service: PurchasingService::new(),
            crm_service: CrmService::new(CrmRepository::new()),
            finance_service: FinanceService::new(finance_repo.clone()),
            settings_service,
            dashboard_service: DashboardService::new(DashboardRepository::new(), order_repo.clone(), finance_repo),
            document_service: DocumentService::new(order_repo.clone(), settings_repo, config.fonts_dir.clone()),
            order_repo,
            purchasing_repo: PurchasingRepository::new(),
            db_pool,
            config,
        })
    }
}
