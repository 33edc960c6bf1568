// src/services/tenancy_service.rs

use std::future::Future;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{DomainRepository, TenantScope, UserRepository},
};

// ---
// 1. TenantContext: a identidade do tenant desta requisição
// ---
// Efêmero: construído por requisição e descartado com ela. No máximo um
// dos caminhos (domínio customizado / subdomínio) resolve; o domínio
// customizado sempre ganha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    CustomDomain,
    Subdomain,
    None,
}

#[derive(Debug, Clone)]
pub struct TenantContext {
    pub admin_id: Option<Uuid>,
    pub kind: ResolutionKind,
    pub identifier: Option<String>,
}

impl TenantContext {
    pub fn none() -> Self {
        Self { admin_id: None, kind: ResolutionKind::None, identifier: None }
    }

    /// O escopo de dados desta requisição: com tenant resolvido, tudo é
    /// filtrado pelo admin dono; sem tenant, visão global.
    pub fn scope(&self) -> TenantScope {
        match self.admin_id {
            Some(admin_id) => TenantScope::Scoped(admin_id),
            None => TenantScope::Unscoped,
        }
    }
}

// ---
// 2. Funções puras de normalização e extração
// ---

/// Normaliza o valor do cabeçalho Host: remove esquema (se vier colado),
/// porta e ponto final, e rebaixa para minúsculas.
pub fn normalize_host(host_header: &str) -> String {
    let host = host_header.trim();
    let host = host.strip_prefix("https://").unwrap_or(host);
    let host = host.strip_prefix("http://").unwrap_or(host);
    let host = host.split('/').next().unwrap_or(host);
    let host = host.rsplit_once(':').map_or(host, |(name, port)| {
        // Só descarta o sufixo se parecer mesmo uma porta
        if port.chars().all(|c| c.is_ascii_digit()) { name } else { host }
    });
    host.trim_end_matches('.').to_ascii_lowercase()
}

/// Extrai o rótulo candidato a subdomínio de um host já normalizado.
///
/// Em desenvolvimento (`*.localhost`) o primeiro rótulo vale desde que
/// exista mais de um. Em produção o primeiro rótulo só vale quando há
/// mais de dois no total (`example.com` puro não tem subdomínio).
/// O rótulo literal `www` nunca identifica um tenant.
pub fn extract_subdomain(host: &str) -> Option<String> {
    if host.is_empty() {
        return None;
    }
    let labels: Vec<&str> = host.split('.').collect();

    let candidate = if host.contains("localhost") {
        if labels.len() > 1 { Some(labels[0]) } else { None }
    } else if labels.len() > 2 {
        Some(labels[0])
    } else {
        None
    };

    candidate
        .filter(|label| !label.is_empty() && *label != "www")
        .map(|label| label.to_string())
}

// ---
// 3. Host Resolver: hostname -> TenantContext
// ---

/// O coração da resolução, genérico sobre os dois lookups para ser
/// testável sem banco. Domínio customizado ativo sempre tem precedência;
/// quando ele casa, o lookup de subdomínio nem chega a rodar. Erro de
/// banco degrada para `None` (a resolução é best-effort no caminho de
/// roteamento), mas é logado, não engolido.
pub async fn resolve_with<CF, CFut, SF, SFut>(
    host_header: &str,
    custom_lookup: CF,
    subdomain_lookup: SF,
) -> TenantContext
where
    CF: FnOnce(String) -> CFut,
    CFut: Future<Output = Result<Option<Uuid>, AppError>>,
    SF: FnOnce(String) -> SFut,
    SFut: Future<Output = Result<Option<Uuid>, AppError>>,
{
    let host = normalize_host(host_header);
    if host.is_empty() {
        return TenantContext::none();
    }

    // 1º caminho: domínio customizado ativo
    match custom_lookup(host.clone()).await {
        Ok(Some(admin_id)) => {
            return TenantContext {
                admin_id: Some(admin_id),
                kind: ResolutionKind::CustomDomain,
                identifier: Some(host),
            };
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(host = %host, "Lookup de domínio customizado falhou, degradando para resolução por subdomínio: {}", e);
        }
    }

    // 2º caminho: subdomínio da plataforma
    let Some(subdomain) = extract_subdomain(&host) else {
        return TenantContext::none();
    };

    match subdomain_lookup(subdomain.clone()).await {
        Ok(Some(admin_id)) => TenantContext {
            admin_id: Some(admin_id),
            kind: ResolutionKind::Subdomain,
            identifier: Some(subdomain),
        },
        Ok(None) => TenantContext::none(),
        Err(e) => {
            tracing::warn!(subdomain = %subdomain, "Lookup de subdomínio falhou, requisição segue sem tenant: {}", e);
            TenantContext::none()
        }
    }
}

#[derive(Clone)]
pub struct HostResolver {
    user_repo: UserRepository,
    domain_repo: DomainRepository,
}

impl HostResolver {
    pub fn new(user_repo: UserRepository, domain_repo: DomainRepository) -> Self {
        Self { user_repo, domain_repo }
    }

    /// Resolve o tenant a partir do cabeçalho Host.
    pub async fn resolve(&self, host_header: &str) -> TenantContext {
        resolve_with(
            host_header,
            |host| async move {
                Ok(self
                    .domain_repo
                    .find_active_by_domain(&host)
                    .await?
                    .map(|record| record.admin_id))
            },
            |subdomain| async move {
                Ok(self
                    .user_repo
                    .find_admin_by_subdomain(&subdomain)
                    .await?
                    .map(|admin| admin.id))
            },
        )
        .await
    }

    /// Resolve um subdomínio já extraído (ou vindo do cabeçalho confiável
    /// da borda). Os dois caminhos produzem contextos idênticos — um
    /// handler não tem como distinguir a origem.
    pub async fn resolve_subdomain(&self, subdomain: &str) -> TenantContext {
        match self.user_repo.find_admin_by_subdomain(subdomain).await {
            Ok(Some(admin)) => TenantContext {
                admin_id: Some(admin.id),
                kind: ResolutionKind::Subdomain,
                identifier: Some(subdomain.to_string()),
            },
            Ok(None) => TenantContext::none(),
            Err(e) => {
                tracing::warn!(subdomain = %subdomain, "Lookup de subdomínio falhou, requisição segue sem tenant: {}", e);
                TenantContext::none()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizacao_remove_porta_e_esquema() {
        assert_eq!(normalize_host("Shop.Example.com:8080"), "shop.example.com");
        assert_eq!(normalize_host("https://shop.example.com/"), "shop.example.com");
        assert_eq!(normalize_host("shop.example.com."), "shop.example.com");
        assert_eq!(normalize_host("localhost:3000"), "localhost");
    }

    #[test]
    fn extracao_de_subdominio_em_producao() {
        assert_eq!(extract_subdomain("shop.example.com"), Some("shop".to_string()));
        // Host "nu" não tem subdomínio
        assert_eq!(extract_subdomain("example.com"), None);
    }

    #[test]
    fn extracao_de_subdominio_em_localhost() {
        assert_eq!(extract_subdomain("test.localhost"), Some("test".to_string()));
        assert_eq!(extract_subdomain("localhost"), None);
    }

    #[test]
    fn www_nunca_identifica_tenant() {
        assert_eq!(extract_subdomain("www.example.com"), None);
        assert_eq!(extract_subdomain("www.localhost"), None);
    }

    #[test]
    fn contexto_sem_tenant_tem_visao_global() {
        let ctx = TenantContext::none();
        assert_eq!(ctx.kind, ResolutionKind::None);
        assert_eq!(ctx.scope(), crate::db::TenantScope::Unscoped);
    }

    #[tokio::test]
    async fn dominio_customizado_tem_precedencia_sobre_subdominio() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let admin_do_dominio = Uuid::new_v4();
        let admin_do_subdominio = Uuid::new_v4();
        let subdominio_consultado = AtomicBool::new(false);

        // "shop.example.com" casa como domínio customizado E tem rótulo
        // de subdomínio válido; o domínio customizado deve ganhar — e o
        // lookup de subdomínio nem deve rodar.
        let ctx = resolve_with(
            "shop.example.com",
            |_host| async move { Ok(Some(admin_do_dominio)) },
            |_sub| {
                subdominio_consultado.store(true, Ordering::SeqCst);
                async move { Ok(Some(admin_do_subdominio)) }
            },
        )
        .await;

        assert_eq!(ctx.kind, ResolutionKind::CustomDomain);
        assert_eq!(ctx.admin_id, Some(admin_do_dominio));
        assert_eq!(ctx.identifier.as_deref(), Some("shop.example.com"));
        assert!(!subdominio_consultado.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn sem_match_de_dominio_cai_para_subdominio() {
        let admin = Uuid::new_v4();

        let ctx = resolve_with(
            "shop.example.com:443",
            |_host| async move { Ok(None) },
            |sub| async move {
                assert_eq!(sub, "shop");
                Ok(Some(admin))
            },
        )
        .await;

        assert_eq!(ctx.kind, ResolutionKind::Subdomain);
        assert_eq!(ctx.admin_id, Some(admin));
        assert_eq!(ctx.identifier.as_deref(), Some("shop"));
    }

    #[tokio::test]
    async fn erro_de_banco_degrada_para_nenhum_tenant() {
        let ctx = resolve_with(
            "example.com",
            |_host| async move { Err(AppError::NotFound) },
            |_sub| async move { panic!("example.com não tem rótulo de subdomínio") },
        )
        .await;

        assert_eq!(ctx.kind, ResolutionKind::None);
        assert_eq!(ctx.admin_id, None);
    }
}
