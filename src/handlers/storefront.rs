// src/handlers/storefront.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::RequireTenant,
    models::{
        catalog::Product,
        orders::{CreateOrderPayload, OrderWithItems},
    },
};

// A vitrine pública: rotas resolvidas por hostname (domínio customizado
// ou subdomínio). O RequireTenant rejeita com 403 antes do handler rodar
// quando nenhuma loja corresponde ao endereço.

// GET /api/storefront/products
#[utoipa::path(
    get,
    path = "/api/storefront/products",
    tag = "Storefront",
    responses(
        (status = 200, description = "Produtos publicados da loja resolvida", body = Vec<Product>),
        (status = 403, description = "Nenhuma loja corresponde a este endereço")
    )
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    tenant: RequireTenant,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .catalog_service
        .list_storefront_products(tenant.admin_id)
        .await?;
    Ok(Json(products))
}

// POST /api/storefront/orders
#[utoipa::path(
    post,
    path = "/api/storefront/orders",
    tag = "Storefront",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado na loja resolvida", body = OrderWithItems),
        (status = 403, description = "Nenhuma loja corresponde a este endereço")
    )
)]
pub async fn place_order(
    State(app_state): State<AppState>,
    tenant: RequireTenant,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let order = app_state
        .order_service
        .place_order(tenant.admin_id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}
