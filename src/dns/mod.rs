// src/dns/mod.rs

use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::{
    config::{ResolverConfig, ResolverOpts},
    error::ResolveErrorKind,
    TokioAsyncResolver,
};
use thiserror::Error;

// ---
// O adaptador de DNS: a única porta de saída para o DNS público.
// ---
// Falhas viram resultados tipados, nunca panics. O motor de verificação
// precisa distinguir "o registro não existe" (NXDOMAIN / sem registros)
// de "não consegui perguntar" (timeout, rede) — ambos contam como
// checagem não satisfeita, mas a mensagem mostrada ao admin é diferente.
#[derive(Debug, Error)]
pub enum DnsLookupError {
    #[error("registro não encontrado")]
    NotFound,

    #[error("falha temporária na consulta DNS: {0}")]
    Transient(String),
}

#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve_txt(&self, name: &str) -> Result<Vec<String>, DnsLookupError>;
    async fn resolve_cname(&self, name: &str) -> Result<Vec<String>, DnsLookupError>;
}

// Implementação de produção sobre o hickory-resolver, consultando o
// resolvedor público da Cloudflare. O timeout vale por consulta
// individual, não pela sequência de tentativas do motor.
pub struct HickoryDnsResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryDnsResolver {
    pub fn new() -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(5);
        opts.attempts = 2;

        let resolver = TokioAsyncResolver::tokio(ResolverConfig::cloudflare(), opts);
        Self { resolver }
    }
}

impl Default for HickoryDnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn map_resolve_error(e: hickory_resolver::error::ResolveError) -> DnsLookupError {
    match e.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => DnsLookupError::NotFound,
        _ => DnsLookupError::Transient(e.to_string()),
    }
}

#[async_trait]
impl DnsResolver for HickoryDnsResolver {
    async fn resolve_txt(&self, name: &str) -> Result<Vec<String>, DnsLookupError> {
        let lookup = self
            .resolver
            .txt_lookup(name)
            .await
            .map_err(map_resolve_error)?;

        // Um registro TXT pode vir fatiado em várias "character-strings";
        // o valor lógico é a concatenação delas.
        let values = lookup
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|part| String::from_utf8_lossy(part).into_owned())
                    .collect::<String>()
            })
            .collect::<Vec<_>>();

        if values.is_empty() {
            return Err(DnsLookupError::NotFound);
        }
        Ok(values)
    }

    async fn resolve_cname(&self, name: &str) -> Result<Vec<String>, DnsLookupError> {
        let lookup = self
            .resolver
            .lookup(name, hickory_resolver::proto::rr::RecordType::CNAME)
            .await
            .map_err(map_resolve_error)?;

        let values = lookup
            .record_iter()
            .filter_map(|record| record.data().and_then(|d| d.as_cname()))
            .map(|cname| cname.to_string())
            .collect::<Vec<_>>();

        if values.is_empty() {
            return Err(DnsLookupError::NotFound);
        }
        Ok(values)
    }
}
