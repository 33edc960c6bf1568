// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::TenantScope;
use crate::{
    common::error::AppError,
    models::catalog::{Category, Product},
};

// Repositório do catálogo (categorias e produtos).
// Todo método de leitura/escrita exige um TenantScope: não existe
// consulta sobre entidades de tenant sem escopo declarado.
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Categorias
    // ---

    pub async fn list_categories(&self, scope: TenantScope) -> Result<Vec<Category>, AppError> {
        let categories = match scope {
            TenantScope::Scoped(admin_id) => {
                sqlx::query_as::<_, Category>(
                    "SELECT * FROM categories WHERE admin_id = $1 ORDER BY name",
                )
                .bind(admin_id)
                .fetch_all(&self.pool)
                .await?
            }
            TenantScope::Unscoped => {
                sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(categories)
    }

    /// Escritas são sempre etiquetadas com o admin dono — por isso recebem
    /// o Uuid diretamente, não um TenantScope (não existe escrita global).
    pub async fn create_category(
        &self,
        admin_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (admin_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(admin_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    /// A posse faz parte do WHERE: apagar categoria de outro admin
    /// simplesmente não encontra linha nenhuma.
    pub async fn delete_category(&self, id: Uuid, admin_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND admin_id = $2")
            .bind(id)
            .bind(admin_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Produtos
    // ---

    pub async fn list_products(&self, scope: TenantScope) -> Result<Vec<Product>, AppError> {
        let products = match scope {
            TenantScope::Scoped(admin_id) => {
                sqlx::query_as::<_, Product>(
                    "SELECT * FROM products WHERE admin_id = $1 ORDER BY created_at DESC",
                )
                .bind(admin_id)
                .fetch_all(&self.pool)
                .await?
            }
            TenantScope::Unscoped => {
                sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(products)
    }

    /// A vitrine pública só mostra produtos publicados do tenant resolvido.
    pub async fn list_published_products(&self, admin_id: Uuid) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE admin_id = $1 AND is_published = true
            ORDER BY created_at DESC
            "#,
        )
        .bind(admin_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn find_product(
        &self,
        id: Uuid,
        scope: TenantScope,
    ) -> Result<Option<Product>, AppError> {
        let product = match scope {
            TenantScope::Scoped(admin_id) => {
                sqlx::query_as::<_, Product>(
                    "SELECT * FROM products WHERE id = $1 AND admin_id = $2",
                )
                .bind(id)
                .bind(admin_id)
                .fetch_optional(&self.pool)
                .await?
            }
            TenantScope::Unscoped => {
                sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(product)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_product(
        &self,
        admin_id: Uuid,
        category_id: Option<Uuid>,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        stock: i32,
        is_published: bool,
    ) -> Result<Product, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (admin_id, category_id, name, description, price, stock, is_published)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(admin_id)
        .bind(category_id)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(stock)
        .bind(is_published)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_product(
        &self,
        id: Uuid,
        admin_id: Uuid,
        category_id: Option<Uuid>,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        stock: i32,
        is_published: bool,
    ) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET category_id = $3, name = $4, description = $5,
                price = $6, stock = $7, is_published = $8, updated_at = now()
            WHERE id = $1 AND admin_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(admin_id)
        .bind(category_id)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(stock)
        .bind(is_published)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn delete_product(&self, id: Uuid, admin_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND admin_id = $2")
            .bind(id)
            .bind(admin_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
