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

        // --- Catalog (painel do admin) ---
        handlers::catalog::list_categories,
        handlers::catalog::create_category,
        handlers::catalog::delete_category,
        handlers::catalog::list_products,
        handlers::catalog::create_product,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,

        // --- Orders ---
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order_status,

        // --- Storefront (vitrine pública, resolvida por hostname) ---
        handlers::storefront::list_products,
        handlers::storefront::place_order,

        // --- Domains ---
        handlers::domains::add_domain,
        handlers::domains::list_domains,
        handlers::domains::verify_domain,
        handlers::domains::check_domain,
        handlers::domains::activate_domain,
        handlers::domains::deactivate_domain,
        handlers::domains::delete_domain,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::UserRole,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Catalog ---
            models::catalog::Category,
            models::catalog::Product,
            models::catalog::CreateCategoryPayload,
            models::catalog::CreateProductPayload,
            models::catalog::UpdateProductPayload,

            // --- Orders ---
            models::orders::Order,
            models::orders::OrderItem,
            models::orders::OrderStatus,
            models::orders::OrderWithItems,
            models::orders::CreateOrderPayload,
            models::orders::CreateOrderItemPayload,
            models::orders::UpdateOrderStatusPayload,

            // --- Domains ---
            models::domains::DomainRecord,
            models::domains::DomainStatus,
            models::domains::DnsInstruction,
            models::domains::VerificationOutcome,
            models::domains::AddDomainPayload,
            models::domains::AddDomainResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Catalog", description = "Catálogo da Loja (Categorias e Produtos)"),
        (name = "Orders", description = "Gestão de Pedidos"),
        (name = "Storefront", description = "Vitrine Pública (resolvida por hostname)"),
        (name = "Domains", description = "Domínios Customizados e Verificação de DNS")
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
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
