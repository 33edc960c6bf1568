// src/services/catalog_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, TenantScope},
    models::catalog::{
        Category, CreateCategoryPayload, CreateProductPayload, Product, UpdateProductPayload,
    },
};

// Orquestração fina sobre o repositório do catálogo. A regra de ouro:
// leituras recebem o TenantScope da requisição; mutações recebem o admin
// dono e a posse entra no WHERE (registro alheio = NotFound).
#[derive(Clone)]
pub struct CatalogService {
    catalog_repo: CatalogRepository,
}

impl CatalogService {
    pub fn new(catalog_repo: CatalogRepository) -> Self {
        Self { catalog_repo }
    }

    pub async fn list_categories(&self, scope: TenantScope) -> Result<Vec<Category>, AppError> {
        self.catalog_repo.list_categories(scope).await
    }

    pub async fn create_category(
        &self,
        admin_id: Uuid,
        payload: &CreateCategoryPayload,
    ) -> Result<Category, AppError> {
        self.catalog_repo
            .create_category(admin_id, &payload.name, payload.description.as_deref())
            .await
    }

    pub async fn delete_category(&self, admin_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.catalog_repo.delete_category(id, admin_id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn list_products(&self, scope: TenantScope) -> Result<Vec<Product>, AppError> {
        self.catalog_repo.list_products(scope).await
    }

    /// Vitrine pública: só produtos publicados do tenant resolvido.
    pub async fn list_storefront_products(&self, admin_id: Uuid) -> Result<Vec<Product>, AppError> {
        self.catalog_repo.list_published_products(admin_id).await
    }

    pub async fn get_product(&self, id: Uuid, scope: TenantScope) -> Result<Product, AppError> {
        self.catalog_repo
            .find_product(id, scope)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create_product(
        &self,
        admin_id: Uuid,
        payload: &CreateProductPayload,
    ) -> Result<Product, AppError> {
        self.catalog_repo
            .create_product(
                admin_id,
                payload.category_id,
                &payload.name,
                payload.description.as_deref(),
                payload.price,
                payload.stock,
                payload.is_published,
            )
            .await
    }

    pub async fn update_product(
        &self,
        admin_id: Uuid,
        id: Uuid,
        payload: &UpdateProductPayload,
    ) -> Result<Product, AppError> {
        self.catalog_repo
            .update_product(
                id,
                admin_id,
                payload.category_id,
                &payload.name,
                payload.description.as_deref(),
                payload.price,
                payload.stock,
                payload.is_published,
            )
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete_product(&self, admin_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.catalog_repo.delete_product(id, admin_id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
