pub mod user_repo;
pub use user_repo::UserRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod orders_repo;
pub use orders_repo::OrderRepository;
pub mod purchasing_repo;
pub use purchasing_repo::PurchasingRepository;
pub mod crm_repo;
pub use crm_repo::CrmRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
