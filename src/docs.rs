// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::signup,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::invite_user,
        handlers::users::update_user_role,
        handlers::users::update_user_pin,
        handlers::users::delete_user,

        // --- Tenancy ---
        handlers::tenancy::update_tenant,

        // --- Catalog ---
        handlers::inventory::list_products,
        handlers::inventory::create_product,
        handlers::inventory::update_product,
        handlers::inventory::delete_product,
        handlers::inventory::adjust_stock,
        handlers::inventory::list_stock_logs,
        handlers::inventory::list_categories,
        handlers::inventory::create_category,
        handlers::inventory::delete_category,

        // --- Sales ---
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::create_order,
        handlers::orders::update_order_status,
        handlers::orders::get_order_receipt,

        // --- Purchasing ---
        handlers::purchasing::list_purchase_orders,
        handlers::purchasing::create_purchase_order,
        handlers::purchasing::update_purchase_order_status,

        // --- CRM ---
        handlers::crm::list_customers,
        handlers::crm::create_customer,
        handlers::crm::update_customer,
        handlers::crm::delete_customer,
        handlers::crm::list_suppliers,
        handlers::crm::create_supplier,
        handlers::crm::delete_supplier,

        // --- Finance ---
        handlers::finance::list_expenses,
        handlers::finance::create_expense,
        handlers::finance::delete_expense,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
        handlers::settings::issue_barcode,

        // --- Dashboard ---
        handlers::dashboard::get_stats,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::PublicUser,
            models::auth::SignupPayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::auth::MeResponse,
            models::auth::InviteUserPayload,
            models::auth::InviteUserResponse,
            models::auth::UpdateRolePayload,
            models::auth::UpdatePinPayload,

            // --- Tenancy ---
            models::tenancy::Tenant,
            models::tenancy::TenantStatus,
            models::tenancy::SubscriptionTier,
            models::tenancy::SubscriptionStatus,
            models::tenancy::UpdateTenantPayload,

            // --- Catalog ---
            models::inventory::Product,
            models::inventory::Category,
            models::inventory::StockLog,
            models::inventory::StockLogType,
            models::inventory::CreateProductPayload,
            models::inventory::UpdateProductPayload,
            models::inventory::AdjustStockPayload,
            models::inventory::CreateCategoryPayload,

            // --- Sales ---
            models::orders::Order,
            models::orders::OrderItem,
            models::orders::OrderItemType,
            models::orders::OrderStatus,
            models::orders::CreateOrderPayload,
            models::orders::UpdateOrderStatusPayload,

            // --- Purchasing ---
            models::purchasing::PurchaseOrder,
            models::purchasing::PurchaseOrderItem,
            models::purchasing::PurchaseOrderStatus,
            models::purchasing::CreatePurchaseOrderPayload,
            models::purchasing::UpdatePurchaseOrderStatusPayload,

            // --- CRM ---
            models::crm::Customer,
            models::crm::Supplier,
            models::crm::CreateCustomerPayload,
            models::crm::UpdateCustomerPayload,
            models::crm::CreateSupplierPayload,

            // --- Finance ---
            models::finance::Expense,
            models::finance::CreateExpensePayload,

            // --- Settings ---
            models::settings::Settings,
            models::settings::UpdateSettingsPayload,
            models::settings::IssuedBarcode,
            models::settings::ReceiptTemplate,
            models::settings::BarcodeFormat,
            models::settings::BarcodePrefixStrategy,

            // --- Dashboard ---
            models::dashboard::DashboardStats,
        )
    ),
    tags(
        (name = "Auth", description = "Cadastro da loja, login e sessão"),
        (name = "Users", description = "Administração de usuários da loja"),
        (name = "Tenancy", description = "Dados cadastrais da loja"),
        (name = "Catalog", description = "Produtos, categorias e histórico de estoque"),
        (name = "Sales", description = "Pedidos de venda e recibos"),
        (name = "Purchasing", description = "Pedidos de compra"),
        (name = "CRM", description = "Clientes e fornecedores"),
        (name = "Finance", description = "Despesas"),
        (name = "Settings", description = "Configurações da Loja"),
        (name = "Dashboard", description = "Indicadores Gerenciais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_routes_are_documented_with_bearer_auth() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
        assert!(doc.paths.paths.contains_key("/api/orders/{id}/status"));
        assert!(doc.paths.paths.contains_key("/api/auth/signup"));
    }
}
