// src/models/domains.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// 1. Status do domínio (a máquina de estados da verificação)
// ---
// pending -> verifying -> verified | failed
// verified -> active <-> inactive
// failed e pending podem pedir nova verificação; nada mais sai de failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "domain_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    Pending,
    Verifying,
    Verified,
    Active,
    Inactive,
    Failed,
}

impl DomainStatus {
    /// Só domínios ainda não verificados (ou que falharam) aceitam um novo
    /// pedido de verificação.
    pub fn can_start_verification(self) -> bool {
        matches!(self, DomainStatus::Pending | DomainStatus::Failed)
    }

    /// Ativação exige verificação prévia; reativar um domínio inativo
    /// não exige verificar de novo.
    pub fn can_activate(self) -> bool {
        matches!(self, DomainStatus::Verified | DomainStatus::Inactive)
    }

    pub fn can_deactivate(self) -> bool {
        matches!(self, DomainStatus::Active)
    }
}

// ---
// 2. Instrução de DNS mostrada ao admin
// ---
// Geradas deterministicamente a partir de (domínio, token, alvo).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DnsInstruction {
    pub record_type: String,
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

// ---
// 3. DomainRecord (a linha persistida)
// ---
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    pub id: Uuid,
    pub domain: String,
    pub admin_id: Uuid,

    #[serde(skip_serializing)] // segredo: nunca sai na API de listagem
    pub verification_token: String,

    #[schema(value_type = Vec<DnsInstruction>)]
    pub dns_records: Json<Vec<DnsInstruction>>,
    pub status: DomainStatus,
    pub is_active: bool,
    pub error_message: Option<String>,
    pub last_verified: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ---
// 4. Resultado de uma verificação
// ---
// Falha de verificação NÃO é um erro de API: é um resultado com a lista
// de problemas legível para humanos (um item por checagem que falhou).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub verified: bool,
    pub errors: Vec<String>,
}

impl VerificationOutcome {
    pub fn ok() -> Self {
        Self { verified: true, errors: Vec::new() }
    }
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddDomainPayload {
    #[validate(length(min = 4, message = "O domínio fornecido é inválido."))]
    pub domain: String,
}

// Resposta da criação: inclui as instruções que o admin deve configurar
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddDomainResponse {
    pub record: DomainRecord,
    pub instructions: Vec<DnsInstruction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apenas_pending_e_failed_aceitam_verificacao() {
        assert!(DomainStatus::Pending.can_start_verification());
        assert!(DomainStatus::Failed.can_start_verification());
        assert!(!DomainStatus::Verifying.can_start_verification());
        assert!(!DomainStatus::Verified.can_start_verification());
        assert!(!DomainStatus::Active.can_start_verification());
        assert!(!DomainStatus::Inactive.can_start_verification());
    }

    #[test]
    fn ativacao_exige_verificacao_previa() {
        assert!(DomainStatus::Verified.can_activate());
        // Reativar não exige nova verificação
        assert!(DomainStatus::Inactive.can_activate());
        assert!(!DomainStatus::Pending.can_activate());
        assert!(!DomainStatus::Failed.can_activate());
        assert!(!DomainStatus::Active.can_activate());
    }

    #[test]
    fn apenas_active_pode_desativar() {
        assert!(DomainStatus::Active.can_deactivate());
        assert!(!DomainStatus::Verified.can_deactivate());
        assert!(!DomainStatus::Inactive.can_deactivate());
    }
}
