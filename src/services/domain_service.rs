// src/services/domain_service.rs

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::{rngs::OsRng, RngCore};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::DomainRepository,
    dns::{DnsLookupError, DnsResolver},
    models::domains::{
        AddDomainResponse, DnsInstruction, DomainRecord, DomainStatus, VerificationOutcome,
    },
    services::tenancy_service::normalize_host,
};

// Prefixos do desafio DNS. O valor do TXT é comparado por igualdade
// exata — conter o token como substring não basta.
const TXT_HOST_PREFIX: &str = "_ecommerce-verify";
const TXT_VALUE_PREFIX: &str = "ecommerce-verification=";

// Tentativas: a propagação de DNS demora; uma falha logo após criar o
// registro é esperada, não excepcional.
const INTERNAL_VERIFY_ATTEMPTS: u32 = 3;
const ADMIN_VERIFY_ATTEMPTS: u32 = 5;
const VERIFY_RETRY_DELAY: Duration = Duration::from_secs(10);

// ---
// 1. Funções puras: token e instruções de DNS
// ---

/// Token de verificação: 256 bits de entropia do SO, em hex (64 chars).
/// Gerado uma única vez na criação do domínio e nunca rotacionado —
/// rotacionar invalidaria instruções que o admin já pode ter configurado.
pub fn generate_verification_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Gera as instruções de DNS mostradas ao admin. Determinística: as
/// mesmas entradas produzem sempre as mesmas instruções.
pub fn generate_dns_records(domain: &str, token: &str, target: &str) -> Vec<DnsInstruction> {
    vec![
        DnsInstruction {
            record_type: "TXT".to_string(),
            name: format!("{TXT_HOST_PREFIX}.{domain}"),
            value: format!("{TXT_VALUE_PREFIX}{token}"),
            ttl: Some(300),
        },
        DnsInstruction {
            record_type: "CNAME".to_string(),
            name: domain.to_string(),
            value: target.to_string(),
            ttl: Some(300),
        },
    ]
}

// ---
// 2. As duas checagens, independentes entre si
// ---
// Cada falha de lookup (NXDOMAIN, timeout, resposta malformada) vira uma
// entrada legível na lista de erros e nunca aborta a outra checagem.

async fn check_txt(resolver: &dyn DnsResolver, domain: &str, token: &str) -> Option<String> {
    let name = format!("{TXT_HOST_PREFIX}.{domain}");
    let expected = format!("{TXT_VALUE_PREFIX}{token}");

    match resolver.resolve_txt(&name).await {
        Ok(values) => {
            // Igualdade exata, não substring
            if values.iter().any(|v| v == &expected) {
                None
            } else {
                Some(format!(
                    "Registro TXT em '{name}' encontrado, mas nenhum valor confere com o esperado."
                ))
            }
        }
        Err(DnsLookupError::NotFound) => {
            Some(format!("Registro TXT em '{name}' não encontrado."))
        }
        Err(DnsLookupError::Transient(e)) => {
            Some(format!("Consulta TXT em '{name}' falhou: {e}"))
        }
    }
}

async fn check_cname(resolver: &dyn DnsResolver, domain: &str, target: &str) -> Option<String> {
    match resolver.resolve_cname(domain).await {
        Ok(values) => {
            // Alvos de CNAME podem vir com ponto final (FQDN); toleramos.
            if values
                .iter()
                .any(|v| v == target || v.trim_end_matches('.') == target)
            {
                None
            } else {
                Some(format!(
                    "CNAME de '{domain}' encontrado, mas não aponta para '{target}'."
                ))
            }
        }
        Err(DnsLookupError::NotFound) => {
            Some(format!("CNAME de '{domain}' não encontrado."))
        }
        Err(DnsLookupError::Transient(e)) => {
            Some(format!("Consulta CNAME de '{domain}' falhou: {e}"))
        }
    }
}

/// Uma tentativa de verificação: as duas checagens rodam sempre, e as
/// duas precisam passar.
pub async fn check_domain(
    resolver: &dyn DnsResolver,
    domain: &str,
    token: &str,
    target: &str,
) -> VerificationOutcome {
    let mut errors = Vec::new();

    if let Some(e) = check_txt(resolver, domain, token).await {
        errors.push(e);
    }
    if let Some(e) = check_cname(resolver, domain, target).await {
        errors.push(e);
    }

    VerificationOutcome { verified: errors.is_empty(), errors }
}

/// Laço de tentativas com espera não bloqueante entre elas. Para na
/// primeira que passar; se todas falharem, devolve o resultado da última.
/// Nenhum recurso exclusivo é segurado durante a espera — verificações
/// de outros domínios seguem em paralelo.
pub async fn auto_verify(
    resolver: &dyn DnsResolver,
    domain: &str,
    token: &str,
    target: &str,
    max_attempts: u32,
    delay: Duration,
) -> VerificationOutcome {
    let attempts = max_attempts.max(1);
    let mut last = VerificationOutcome::ok();

    for attempt in 1..=attempts {
        last = check_domain(resolver, domain, token, target).await;
        if last.verified {
            tracing::info!(domain = %domain, attempt, "Domínio verificado");
            return last;
        }
        tracing::debug!(domain = %domain, attempt, errors = ?last.errors, "Tentativa de verificação falhou");
        if attempt < attempts {
            tokio::time::sleep(delay).await;
        }
    }
    last
}

// ---
// 3. O serviço: máquina de estados + persistência
// ---
#[derive(Clone)]
pub struct DomainService {
    domain_repo: DomainRepository,
    resolver: Arc<dyn DnsResolver>,
    // Alvo do CNAME mostrado ao admin (ex.: "lojas.vitrine.app").
    // Ausente = erro de configuração na operação que precisar dele.
    cname_target: Option<String>,
}

impl DomainService {
    pub fn new(
        domain_repo: DomainRepository,
        resolver: Arc<dyn DnsResolver>,
        cname_target: Option<String>,
    ) -> Self {
        Self { domain_repo, resolver, cname_target }
    }

    fn cname_target(&self) -> Result<&str, AppError> {
        self.cname_target
            .as_deref()
            .ok_or_else(|| AppError::Configuration("STOREFRONT_CNAME_TARGET".to_string()))
    }

    /// Cadastra um domínio: normaliza, pré-checa duplicata (UX) e cria o
    /// registro PENDING com token e instruções. O UNIQUE do banco é quem
    /// decide de verdade em caso de corrida.
    pub async fn add_domain(
        &self,
        admin_id: Uuid,
        raw_domain: &str,
    ) -> Result<AddDomainResponse, AppError> {
        let target = self.cname_target()?.to_string();
        let domain = normalize_host(raw_domain);
        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::ValidationError(validation_error(
                "domain",
                "O domínio fornecido é inválido.",
            )));
        }

        if self.domain_repo.find_by_domain(&domain).await?.is_some() {
            return Err(AppError::DomainAlreadyExists(domain));
        }

        let token = generate_verification_token();
        let instructions = generate_dns_records(&domain, &token, &target);

        let record = self
            .domain_repo
            .create(&domain, admin_id, &token, &instructions)
            .await
            .map_err(|e| match e {
                // Corrida perdida entre a pré-checagem e o INSERT
                AppError::DatabaseError(ref db_err) if is_unique_violation(db_err) => {
                    AppError::DomainAlreadyExists(domain.clone())
                }
                other => other,
            })?;

        tracing::info!(domain = %record.domain, admin_id = %admin_id, "Domínio customizado cadastrado");
        Ok(AddDomainResponse { record, instructions })
    }

    pub async fn list_domains(&self, admin_id: Uuid) -> Result<Vec<DomainRecord>, AppError> {
        self.domain_repo.find_by_admin_id(admin_id).await
    }

    /// Pedido de verificação disparado pelo admin: PENDING/FAILED ->
    /// VERIFYING, roda o laço de tentativas e persiste o desfecho.
    pub async fn request_verification(
        &self,
        admin_id: Uuid,
        domain_id: Uuid,
    ) -> Result<(DomainRecord, VerificationOutcome), AppError> {
        let target = self.cname_target()?.to_string();
        let record = self
            .domain_repo
            .find_owned(domain_id, admin_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !record.status.can_start_verification() {
            return Err(AppError::InvalidDomainState(format!(
                "O domínio '{}' não está aguardando verificação.",
                record.domain
            )));
        }

        let record = self
            .domain_repo
            .update_status(record.id, DomainStatus::Verifying, false)
            .await?;

        let outcome = auto_verify(
            self.resolver.as_ref(),
            &record.domain,
            &record.verification_token,
            &target,
            ADMIN_VERIFY_ATTEMPTS,
            VERIFY_RETRY_DELAY,
        )
        .await;

        let record = if outcome.verified {
            self.domain_repo.mark_verified(record.id, Utc::now()).await?
        } else {
            self.domain_repo
                .mark_failed(record.id, &outcome.errors.join(" "))
                .await?
        };

        Ok((record, outcome))
    }

    /// Uma tentativa avulsa (sem persistir), usada pelo endpoint de
    /// pré-checagem: o admin confere as instruções antes de pedir a
    /// verificação oficial.
    pub async fn dry_run_check(
        &self,
        admin_id: Uuid,
        domain_id: Uuid,
    ) -> Result<VerificationOutcome, AppError> {
        let target = self.cname_target()?.to_string();
        let record = self
            .domain_repo
            .find_owned(domain_id, admin_id)
            .await?
            .ok_or(AppError::NotFound)?;

        Ok(auto_verify(
            self.resolver.as_ref(),
            &record.domain,
            &record.verification_token,
            &target,
            INTERNAL_VERIFY_ATTEMPTS,
            VERIFY_RETRY_DELAY,
        )
        .await)
    }

    /// VERIFIED/INACTIVE -> ACTIVE. Reativar não exige nova verificação.
    pub async fn activate(&self, admin_id: Uuid, domain_id: Uuid) -> Result<DomainRecord, AppError> {
        let record = self
            .domain_repo
            .find_owned(domain_id, admin_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !record.status.can_activate() {
            return Err(AppError::InvalidDomainState(format!(
                "O domínio '{}' precisa estar verificado para ser ativado.",
                record.domain
            )));
        }

        self.domain_repo
            .update_status(record.id, DomainStatus::Active, true)
            .await
    }

    /// ACTIVE -> INACTIVE.
    pub async fn deactivate(
        &self,
        admin_id: Uuid,
        domain_id: Uuid,
    ) -> Result<DomainRecord, AppError> {
        let record = self
            .domain_repo
            .find_owned(domain_id, admin_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !record.status.can_deactivate() {
            return Err(AppError::InvalidDomainState(format!(
                "O domínio '{}' não está ativo.",
                record.domain
            )));
        }

        self.domain_repo
            .update_status(record.id, DomainStatus::Inactive, false)
            .await
    }

    pub async fn delete(&self, admin_id: Uuid, domain_id: Uuid) -> Result<(), AppError> {
        let deleted = self.domain_repo.delete_owned(domain_id, admin_id).await?;
        if !deleted {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}

fn validation_error(field: &'static str, message: &'static str) -> validator::ValidationErrors {
    let mut errors = validator::ValidationErrors::new();
    let mut error = validator::ValidationError::new("invalid");
    error.message = Some(std::borrow::Cow::Borrowed(message));
    errors.add(field, error);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    // Resolvedor roteirizado: devolve respostas fixas por nome e conta
    // quantas tentativas de TXT foram feitas.
    #[derive(Default)]
    struct ScriptedResolver {
        txt: HashMap<String, Result<Vec<String>, DnsLookupError>>,
        cname: HashMap<String, Result<Vec<String>, DnsLookupError>>,
        txt_calls: AtomicU32,
        // A partir de qual chamada de TXT o registro "propaga" (0 = nunca)
        txt_succeeds_after: u32,
    }

    impl ScriptedResolver {
        fn clone_result(
            map: &HashMap<String, Result<Vec<String>, DnsLookupError>>,
            name: &str,
        ) -> Result<Vec<String>, DnsLookupError> {
            match map.get(name) {
                Some(Ok(values)) => Ok(values.clone()),
                Some(Err(DnsLookupError::NotFound)) => Err(DnsLookupError::NotFound),
                Some(Err(DnsLookupError::Transient(e))) => {
                    Err(DnsLookupError::Transient(e.clone()))
                }
                None => Err(DnsLookupError::NotFound),
            }
        }
    }

    #[async_trait]
    impl DnsResolver for ScriptedResolver {
        async fn resolve_txt(&self, name: &str) -> Result<Vec<String>, DnsLookupError> {
            let call = self.txt_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.txt_succeeds_after > 0 && call >= self.txt_succeeds_after {
                if let Some(Ok(values)) = self.txt.get(name) {
                    return Ok(values.clone());
                }
            }
            if self.txt_succeeds_after > 0 {
                return Err(DnsLookupError::NotFound);
            }
            Self::clone_result(&self.txt, name)
        }

        async fn resolve_cname(&self, name: &str) -> Result<Vec<String>, DnsLookupError> {
            Self::clone_result(&self.cname, name)
        }
    }

    fn resolver_ok(domain: &str, token: &str, target: &str) -> ScriptedResolver {
        let mut resolver = ScriptedResolver::default();
        resolver.txt.insert(
            format!("{TXT_HOST_PREFIX}.{domain}"),
            Ok(vec![format!("{TXT_VALUE_PREFIX}{token}")]),
        );
        resolver
            .cname
            .insert(domain.to_string(), Ok(vec![target.to_string()]));
        resolver
    }

    #[test]
    fn geracao_de_instrucoes_e_deterministica() {
        let a = generate_dns_records("loja.com.br", "abc123", "lojas.vitrine.app");
        let b = generate_dns_records("loja.com.br", "abc123", "lojas.vitrine.app");
        assert_eq!(a, b);

        assert_eq!(a.len(), 2);
        assert_eq!(a[0].record_type, "TXT");
        assert_eq!(a[0].name, "_ecommerce-verify.loja.com.br");
        assert_eq!(a[0].value, "ecommerce-verification=abc123");
        assert_eq!(a[1].record_type, "CNAME");
        assert_eq!(a[1].name, "loja.com.br");
        assert_eq!(a[1].value, "lojas.vitrine.app");
    }

    #[test]
    fn token_tem_256_bits_em_hex() {
        let token = generate_verification_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        // Tokens são aleatórios: dois seguidos não coincidem
        assert_ne!(token, generate_verification_token());
    }

    #[tokio::test]
    async fn verificacao_passa_quando_as_duas_checagens_passam() {
        let resolver = resolver_ok("loja.com.br", "tok", "lojas.vitrine.app");
        let outcome = check_domain(&resolver, "loja.com.br", "tok", "lojas.vitrine.app").await;
        assert!(outcome.verified);
        assert!(outcome.errors.is_empty());
    }

    #[tokio::test]
    async fn txt_exige_igualdade_exata_nao_substring() {
        let mut resolver = resolver_ok("loja.com.br", "tok", "lojas.vitrine.app");
        // O valor CONTÉM o token, mas não é exatamente igual
        resolver.txt.insert(
            "_ecommerce-verify.loja.com.br".to_string(),
            Ok(vec!["prefixo ecommerce-verification=tok sufixo".to_string()]),
        );

        let outcome = check_domain(&resolver, "loja.com.br", "tok", "lojas.vitrine.app").await;
        assert!(!outcome.verified);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("TXT"));
    }

    #[tokio::test]
    async fn cname_tolera_ponto_final() {
        let mut resolver = resolver_ok("loja.com.br", "tok", "lojas.vitrine.app");
        resolver.cname.insert(
            "loja.com.br".to_string(),
            Ok(vec!["lojas.vitrine.app.".to_string()]),
        );

        let outcome = check_domain(&resolver, "loja.com.br", "tok", "lojas.vitrine.app").await;
        assert!(outcome.verified, "CNAME com ponto final (FQDN) deve passar");
    }

    #[tokio::test]
    async fn falha_em_uma_checagem_nao_aborta_a_outra() {
        let mut resolver = ScriptedResolver::default();
        resolver.txt.insert(
            "_ecommerce-verify.loja.com.br".to_string(),
            Err(DnsLookupError::Transient("timeout".to_string())),
        );
        // CNAME nem existe

        let outcome = check_domain(&resolver, "loja.com.br", "tok", "lojas.vitrine.app").await;
        assert!(!outcome.verified);
        // Uma entrada legível por checagem que falhou
        assert_eq!(outcome.errors.len(), 2);
    }

    #[tokio::test]
    async fn auto_verify_para_na_primeira_tentativa_que_passa() {
        let mut resolver = resolver_ok("loja.com.br", "tok", "lojas.vitrine.app");
        // O TXT só "propaga" a partir da segunda consulta
        resolver.txt_succeeds_after = 2;

        let outcome = auto_verify(
            &resolver,
            "loja.com.br",
            "tok",
            "lojas.vitrine.app",
            5,
            Duration::ZERO,
        )
        .await;

        assert!(outcome.verified);
        // Parou na 2ª tentativa: as 3 restantes nunca executaram
        assert_eq!(resolver.txt_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn auto_verify_respeita_o_teto_de_tentativas() {
        let resolver = ScriptedResolver::default(); // tudo NotFound

        let outcome = auto_verify(
            &resolver,
            "loja.com.br",
            "tok",
            "lojas.vitrine.app",
            3,
            Duration::ZERO,
        )
        .await;

        assert!(!outcome.verified);
        assert_eq!(resolver.txt_calls.load(Ordering::SeqCst), 3);
        // O desfecho devolvido é o da última tentativa
        assert_eq!(outcome.errors.len(), 2);
    }
}
