// src/db/domain_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::domains::{DnsInstruction, DomainRecord, DomainStatus},
};

const DOMAIN_COLUMNS: &str = r#"
    id, domain, admin_id, verification_token, dns_records, status,
    is_active, error_message, last_verified, verified_at, created_at
"#;

// Repositório da tabela 'custom_domains'
#[derive(Clone)]
pub struct DomainRepository {
    pool: PgPool,
}

impl DomainRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lookup exato usado pelo Host Resolver. Só devolve domínios
    /// prontos para servir tráfego (status 'active' e is_active).
    pub async fn find_active_by_domain(
        &self,
        domain: &str,
    ) -> Result<Option<DomainRecord>, AppError> {
        let record = sqlx::query_as::<_, DomainRecord>(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM custom_domains \
             WHERE domain = $1 AND status = 'active' AND is_active = true"
        ))
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    pub async fn find_by_domain(&self, domain: &str) -> Result<Option<DomainRecord>, AppError> {
        let record = sqlx::query_as::<_, DomainRecord>(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM custom_domains WHERE domain = $1"
        ))
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Busca um registro pelo id, mas só se pertencer ao admin informado.
    /// A posse faz parte do WHERE: registro de outro admin = não encontrado.
    pub async fn find_owned(
        &self,
        id: Uuid,
        admin_id: Uuid,
    ) -> Result<Option<DomainRecord>, AppError> {
        let record = sqlx::query_as::<_, DomainRecord>(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM custom_domains WHERE id = $1 AND admin_id = $2"
        ))
        .bind(id)
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    pub async fn find_by_admin_id(&self, admin_id: Uuid) -> Result<Vec<DomainRecord>, AppError> {
        let records = sqlx::query_as::<_, DomainRecord>(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM custom_domains \
             WHERE admin_id = $1 ORDER BY created_at DESC"
        ))
        .bind(admin_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    pub async fn create(
        &self,
        domain: &str,
        admin_id: Uuid,
        verification_token: &str,
        dns_records: &[DnsInstruction],
    ) -> Result<DomainRecord, AppError> {
        let record = sqlx::query_as::<_, DomainRecord>(&format!(
            "INSERT INTO custom_domains (domain, admin_id, verification_token, dns_records) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {DOMAIN_COLUMNS}"
        ))
        .bind(domain)
        .bind(admin_id)
        .bind(verification_token)
        .bind(Json(dns_records))
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    /// Atualiza apenas o status (transições que não tocam nos timestamps
    /// de verificação: verifying, active, inactive).
    pub async fn update_status(
        &self,
        id: Uuid,
        status: DomainStatus,
        is_active: bool,
    ) -> Result<DomainRecord, AppError> {
        let record = sqlx::query_as::<_, DomainRecord>(&format!(
            "UPDATE custom_domains SET status = $2, is_active = $3 \
             WHERE id = $1 \
             RETURNING {DOMAIN_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .bind(is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    /// Desfecho de uma verificação que passou: limpa o erro e grava os
    /// timestamps.
    pub async fn mark_verified(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<DomainRecord, AppError> {
        let record = sqlx::query_as::<_, DomainRecord>(&format!(
            "UPDATE custom_domains \
             SET status = 'verified', error_message = NULL, \
                 last_verified = $2, verified_at = $2 \
             WHERE id = $1 \
             RETURNING {DOMAIN_COLUMNS}"
        ))
        .bind(id)
        .bind(at)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    /// Desfecho de uma verificação que falhou: guarda a lista agregada de
    /// erros. O domínio fica em 'failed', reverificável sem perda de dados.
    pub async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<DomainRecord, AppError> {
        let record = sqlx::query_as::<_, DomainRecord>(&format!(
            "UPDATE custom_domains SET status = 'failed', error_message = $2 \
             WHERE id = $1 \
             RETURNING {DOMAIN_COLUMNS}"
        ))
        .bind(id)
        .bind(error_message)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    pub async fn delete_owned(&self, id: Uuid, admin_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM custom_domains WHERE id = $1 AND admin_id = $2")
            .bind(id)
            .bind(admin_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
