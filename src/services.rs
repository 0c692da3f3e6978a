pub mod auth;
pub mod crm_service;
pub mod dashboard_service;
pub mod document_service;
pub mod finance_service;
pub mod inventory_service;
pub mod order_service;
pub mod purchasing_service;
pub mod settings_service;
pub mod stock_ledger;
pub mod tenancy_service;
pub mod user_service;
