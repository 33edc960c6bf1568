// src/services/order_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, OrderRepository, TenantScope},
    models::orders::{CreateOrderPayload, Order, OrderStatus, OrderWithItems},
};

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    catalog_repo: CatalogRepository,
    pool: PgPool, // Usamos a pool para iniciar transações
}

impl OrderService {
    pub fn new(order_repo: OrderRepository, catalog_repo: CatalogRepository, pool: PgPool) -> Self {
        Self { order_repo, catalog_repo, pool }
    }

    /// Cria um pedido na vitrine do tenant resolvido. Cabeçalho e itens
    /// entram na mesma transação; os preços vêm do catálogo do próprio
    /// tenant (produto de outro admin = NotFound, nunca vaza).
    pub async fn place_order(
        &self,
        admin_id: Uuid,
        payload: &CreateOrderPayload,
    ) -> Result<OrderWithItems, AppError> {
        let scope = TenantScope::Scoped(admin_id);

        // 1. Resolve os produtos e calcula o total antes de abrir a transação
        let mut resolved = Vec::with_capacity(payload.items.len());
        let mut total = Decimal::ZERO;
        for item in &payload.items {
            let product = self
                .catalog_repo
                .find_product(item.product_id, scope)
                .await?
                .filter(|p| p.is_published)
                .ok_or(AppError::NotFound)?;

            total += product.price * Decimal::from(item.quantity);
            resolved.push((product, item.quantity));
        }

        // 2. Transação: cabeçalho + itens, tudo ou nada
        let mut tx = self.pool.begin().await?;

        let order = self
            .order_repo
            .create_order(
                &mut *tx,
                admin_id,
                &payload.customer_name,
                &payload.customer_phone,
                total,
            )
            .await?;

        let mut items = Vec::with_capacity(resolved.len());
        for (product, quantity) in resolved {
            let item = self
                .order_repo
                .create_item(&mut *tx, order.id, product.id, quantity, product.price)
                .await?;
            items.push(item);
        }

        tx.commit().await?;

        tracing::info!(order_id = %order.id, admin_id = %admin_id, "Pedido criado");
        Ok(OrderWithItems { order, items })
    }

    pub async fn list_orders(&self, scope: TenantScope) -> Result<Vec<Order>, AppError> {
        self.order_repo.list_orders(scope).await
    }

    pub async fn get_order(
        &self,
        id: Uuid,
        scope: TenantScope,
    ) -> Result<OrderWithItems, AppError> {
        let order = self
            .order_repo
            .find_order(id, scope)
            .await?
            .ok_or(AppError::NotFound)?;
        let items = self.order_repo.list_items(order.id).await?;
        Ok(OrderWithItems { order, items })
    }

    pub async fn update_status(
        &self,
        admin_id: Uuid,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, AppError> {
        self.order_repo
            .update_status(id, admin_id, status)
            .await?
            .ok_or(AppError::NotFound)
    }
}
