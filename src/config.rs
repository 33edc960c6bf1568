// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{CatalogRepository, DomainRepository, OrderRepository, UserRepository},
    dns::HickoryDnsResolver,
    services::{
        auth::AuthService, catalog_service::CatalogService, domain_service::DomainService,
        order_service::OrderService, tenancy_service::HostResolver,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub order_service: OrderService,
    pub domain_service: DomainService,
    pub host_resolver: HostResolver,
    pub bind_addr: String,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        // Alvo do CNAME mostrado aos admins (ex.: "lojas.vitrine.app").
        // Opcional no startup: a ausência só falha as operações de domínio
        // que precisarem dele, nunca o processo.
        let cname_target = env::var("STOREFRONT_CNAME_TARGET").ok();
        if cname_target.is_none() {
            tracing::warn!("STOREFRONT_CNAME_TARGET não definido: cadastro de domínios customizados ficará indisponível");
        }

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let domain_repo = DomainRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret);
        let catalog_service = CatalogService::new(catalog_repo.clone());
        let order_service =
            OrderService::new(order_repo, catalog_repo, db_pool.clone());
        let domain_service = DomainService::new(
            domain_repo.clone(),
            Arc::new(HickoryDnsResolver::new()),
            cname_target,
        );
        let host_resolver = HostResolver::new(user_repo, domain_repo);

        Ok(Self {
            db_pool,
            auth_service,
            catalog_service,
            order_service,
            domain_service,
            host_resolver,
            bind_addr,
        })
    }
}
