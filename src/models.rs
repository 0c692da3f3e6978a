pub mod auth;
pub mod crm;
pub mod dashboard;
pub mod finance;
pub mod inventory;
pub mod orders;
pub mod purchasing;
pub mod settings;
pub mod tenancy;
