// src/handlers/domains.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::domains::{AddDomainPayload, AddDomainResponse, DomainRecord, VerificationOutcome},
};

// POST /api/domains
#[utoipa::path(
    post,
    path = "/api/domains",
    tag = "Domains",
    request_body = AddDomainPayload,
    responses(
        (status = 201, description = "Domínio cadastrado com as instruções de DNS", body = AddDomainResponse),
        (status = 409, description = "Domínio já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_domain(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<AddDomainPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let response = app_state
        .domain_service
        .add_domain(user.0.id, &payload.domain)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

// GET /api/domains
#[utoipa::path(
    get,
    path = "/api/domains",
    tag = "Domains",
    responses(
        (status = 200, description = "Domínios do admin autenticado", body = Vec<DomainRecord>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_domains(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let domains = app_state.domain_service.list_domains(user.0.id).await?;
    Ok(Json(domains))
}

// POST /api/domains/{id}/verify
//
// Falha de verificação NÃO é erro HTTP: a resposta traz o desfecho com a
// lista legível de problemas e o domínio fica em 'failed', reverificável.
#[utoipa::path(
    post,
    path = "/api/domains/{id}/verify",
    tag = "Domains",
    params(("id" = Uuid, Path, description = "ID do domínio")),
    responses(
        (status = 200, description = "Desfecho da verificação (sucesso ou falha)", body = VerificationOutcome),
        (status = 409, description = "Domínio não está aguardando verificação")
    ),
    security(("api_jwt" = []))
)]
pub async fn verify_domain(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (record, outcome) = app_state
        .domain_service
        .request_verification(user.0.id, id)
        .await?;

    Ok(Json(json!({
        "record": record,
        "verified": outcome.verified,
        "errors": outcome.errors,
    })))
}

// POST /api/domains/{id}/check
#[utoipa::path(
    post,
    path = "/api/domains/{id}/check",
    tag = "Domains",
    params(("id" = Uuid, Path, description = "ID do domínio")),
    responses(
        (status = 200, description = "Pré-checagem sem persistir estado", body = VerificationOutcome)
    ),
    security(("api_jwt" = []))
)]
pub async fn check_domain(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state.domain_service.dry_run_check(user.0.id, id).await?;
    Ok(Json(outcome))
}

// POST /api/domains/{id}/activate
#[utoipa::path(
    post,
    path = "/api/domains/{id}/activate",
    tag = "Domains",
    params(("id" = Uuid, Path, description = "ID do domínio")),
    responses(
        (status = 200, description = "Domínio ativado", body = DomainRecord),
        (status = 409, description = "Domínio não está verificado")
    ),
    security(("api_jwt" = []))
)]
pub async fn activate_domain(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state.domain_service.activate(user.0.id, id).await?;
    Ok(Json(record))
}

// POST /api/domains/{id}/deactivate
#[utoipa::path(
    post,
    path = "/api/domains/{id}/deactivate",
    tag = "Domains",
    params(("id" = Uuid, Path, description = "ID do domínio")),
    responses(
        (status = 200, description = "Domínio desativado", body = DomainRecord),
        (status = 409, description = "Domínio não está ativo")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_domain(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state.domain_service.deactivate(user.0.id, id).await?;
    Ok(Json(record))
}

// DELETE /api/domains/{id}
#[utoipa::path(
    delete,
    path = "/api/domains/{id}",
    tag = "Domains",
    params(("id" = Uuid, Path, description = "ID do domínio")),
    responses(
        (status = 204, description = "Domínio removido"),
        (status = 404, description = "Domínio não encontrado ou de outro admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_domain(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.domain_service.delete(user.0.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
