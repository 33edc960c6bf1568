// src/db/order_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use super::TenantScope;
use crate::{
    common::error::AppError,
    models::orders::{Order, OrderItem, OrderStatus},
};

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_orders(&self, scope: TenantScope) -> Result<Vec<Order>, AppError> {
        let orders = match scope {
            TenantScope::Scoped(admin_id) => {
                sqlx::query_as::<_, Order>(
                    "SELECT * FROM orders WHERE admin_id = $1 ORDER BY created_at DESC",
                )
                .bind(admin_id)
                .fetch_all(&self.pool)
                .await?
            }
            TenantScope::Unscoped => {
                sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(orders)
    }

    pub async fn find_order(
        &self,
        id: Uuid,
        scope: TenantScope,
    ) -> Result<Option<Order>, AppError> {
        let order = match scope {
            TenantScope::Scoped(admin_id) => {
                sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 AND admin_id = $2")
                    .bind(id)
                    .bind(admin_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            TenantScope::Unscoped => {
                sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(order)
    }

    pub async fn list_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, AppError> {
        let items =
            sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1")
                .bind(order_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(items)
    }

    // Cabeçalho do pedido. Aceita um executor para participar da mesma
    // transação que os itens.
    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        admin_id: Uuid,
        customer_name: &str,
        customer_phone: &str,
        total: Decimal,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (admin_id, customer_name, customer_phone, total)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(admin_id)
        .bind(customer_name)
        .bind(customer_phone)
        .bind(total)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    pub async fn create_item<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, unit_price)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    /// Atualiza o status de um pedido do admin dono. Pedido de outro admin
    /// não encontra linha.
    pub async fn update_status(
        &self,
        id: Uuid,
        admin_id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET status = $3
            WHERE id = $1 AND admin_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(admin_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }
}
