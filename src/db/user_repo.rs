// src/db/user_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name,
                   subdomain, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name,
                   subdomain, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    /// Busca o admin dono de um subdomínio. Só contas com papel 'admin'
    /// resolvem uma loja — superadmins não têm vitrine.
    pub async fn find_admin_by_subdomain(
        &self,
        subdomain: &str,
    ) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, first_name, last_name,
                   subdomain, role, created_at, updated_at
            FROM users
            WHERE subdomain = $1 AND role = 'admin'
            "#,
        )
        .bind(subdomain)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    /// Pré-checagem de UX do alocador de subdomínios. A fonte da verdade
    /// contra corridas continua sendo o UNIQUE da coluna.
    pub async fn subdomain_exists(&self, subdomain: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM users WHERE subdomain = $1)
            "#,
        )
        .bind(subdomain)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Todos os subdomínios já tomados que começam com o prefixo dado.
    /// O alocador busca o conjunto de conflitos numa viagem só e decide
    /// o sufixo em memória.
    pub async fn list_subdomains_with_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<String>, AppError> {
        let taken = sqlx::query_scalar::<_, String>(
            r#"
            SELECT subdomain FROM users
            WHERE subdomain LIKE $1 || '%'
            "#,
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;
        Ok(taken)
    }

    // Cria um novo usuário com o subdomínio já alocado.
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
        subdomain: &str,
        role: UserRole,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, subdomain, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, password_hash, first_name, last_name,
                      subdomain, role, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .bind(subdomain)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}
