// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, State},
    http::{header::HOST, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    services::tenancy_service::TenantContext,
};

// Cabeçalho confiável preenchido SOMENTE pela borda (proxy/edge), nunca
// aceito de cliente final — a borda precisa sobrescrevê-lo sempre.
// Carrega um subdomínio já resolvido na camada de cima; passa pelo mesmo
// lookup do Host Resolver, então o contexto resultante é idêntico e um
// handler não distingue a origem.
const EDGE_SUBDOMAIN_HEADER: &str = "x-storefront-subdomain";

/// Camada aplicada a TODAS as rotas tenant-aware: resolve o tenant da
/// requisição e o deixa nos extensions. Requisição sem tenant segue
/// normalmente com contexto `None` (visão global) — quem exige tenant é
/// o extrator RequireTenant.
pub async fn tenant_context(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let edge_subdomain = request
        .headers()
        .get(EDGE_SUBDOMAIN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty());

    let context = match edge_subdomain {
        Some(subdomain) => app_state.host_resolver.resolve_subdomain(&subdomain).await,
        None => {
            let host = request
                .headers()
                .get(HOST)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("");
            app_state.host_resolver.resolve(host).await
        }
    };

    request.extensions_mut().insert(context);
    next.run(request).await
}

// O contexto é um extrator: qualquer handler sob a camada pode pedi-lo.
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<TenantContext>().cloned().ok_or_else(|| {
            AppError::InternalServerError(anyhow::anyhow!(
                "TenantContext ausente: a camada de tenancy não foi aplicada a esta rota"
            ))
        })
    }
}

// Variante "require": rejeita com 403 antes do handler rodar quando
// nenhum tenant resolveu. Para rotas que só fazem sentido dentro de uma
// loja (vitrine pública, criação de pedido).
#[derive(Debug, Clone)]
pub struct RequireTenant {
    pub admin_id: Uuid,
    pub context: TenantContext,
}

impl<S> FromRequestParts<S> for RequireTenant
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = TenantContext::from_request_parts(parts, state).await?;
        let admin_id = context.admin_id.ok_or(AppError::TenantRequired)?;
        Ok(RequireTenant { admin_id, context })
    }
}
