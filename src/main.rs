//src/main.rs
#![allow(async_fn_in_trait)]

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("backoffice=info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    common::error::set_expose_error_details(!config.is_production());

    let app_state = AppState::new(config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas
    let auth_routes = Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login));

    // Tudo daqui para baixo exige token
    let protected_routes = Router::new()
        .route("/auth/me", get(handlers::auth::get_me))
        // Catálogo
        .route(
            "/products",
            get(handlers::inventory::list_products).post(handlers::inventory::create_product),
        )
        .route(
            "/products/{id}",
            put(handlers::inventory::update_product).delete(handlers::inventory::delete_product),
        )
        .route("/products/{id}/stock", post(handlers::inventory::adjust_stock))
        .route(
            "/categories",
            get(handlers::inventory::list_categories).post(handlers::inventory::create_category),
        )
        .route("/categories/{id}", delete(handlers::inventory::delete_category))
        .route("/stock-logs", get(handlers::inventory::list_stock_logs))
        // Vendas
        .route(
            "/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route("/orders/{id}", get(handlers::orders::get_order))
        .route("/orders/{id}/status", put(handlers::orders::update_order_status))
        .route("/orders/{id}/receipt", get(handlers::orders::get_order_receipt))
        // Compras
        .route(
            "/purchase-orders",
            get(handlers::purchasing::list_purchase_orders).post(handlers::purchasing::create_purchase_order),
        )
        .route(
            "/purchase-orders/{id}/status",
            put(handlers::purchasing::update_purchase_order_status),
        )
        // CRM e financeiro
        .route(
            "/customers",
            get(handlers::crm::list_customers).post(handlers::crm::create_customer),
        )
        .route(
            "/customers/{id}",
            put(handlers::crm::update_customer).delete(handlers::crm::delete_customer),
        )
        .route(
            "/suppliers",
            get(handlers::crm::list_suppliers).post(handlers::crm::create_supplier),
        )
        .route("/suppliers/{id}", delete(handlers::crm::delete_supplier))
        .route(
            "/expenses",
            get(handlers::finance::list_expenses).post(handlers::finance::create_expense),
        )
        .route("/expenses/{id}", delete(handlers::finance::delete_expense))
        // Usuários e loja
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::invite_user),
        )
        .route("/users/invite", post(handlers::users::invite_user))
        .route("/users/{id}", delete(handlers::users::delete_user))
        .route("/users/{id}/role", put(handlers::users::update_user_role))
        .route("/users/{id}/pin", put(handlers::users::update_user_pin))
        .route("/tenant", put(handlers::tenancy::update_tenant))
        // Configurações e dashboard
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route("/settings/barcode", post(handlers::settings::issue_barcode))
        .route("/stats", get(handlers::dashboard::get_stats))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let bind_addr = app_state.config.bind_addr.clone();

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
