// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Subdomínio já está em uso")]
    SubdomainTaken,

    #[error("Domínio já cadastrado: {0}")]
    DomainAlreadyExists(String),

    // Tentativa de transição ilegal na máquina de estados do domínio
    #[error("Estado do domínio não permite a operação: {0}")]
    InvalidDomainState(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // Rota que só faz sentido dentro de uma loja, acessada sem tenant resolvido
    #[error("Nenhuma loja corresponde a este endereço")]
    TenantRequired,

    #[error("Recurso não encontrado")]
    NotFound,

    // Variável de ambiente/configuração ausente: fatal para a operação
    // que precisava dela, nunca para o processo.
    #[error("Configuração ausente: {0}")]
    Configuration(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            AppError::SubdomainTaken => {
                (StatusCode::CONFLICT, "Este subdomínio já está em uso.".to_string())
            }
            AppError::DomainAlreadyExists(domain) => (
                StatusCode::CONFLICT,
                format!("O domínio '{}' já está cadastrado.", domain),
            ),
            AppError::InvalidDomainState(msg) => (StatusCode::CONFLICT, msg),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::TenantRequired => (
                StatusCode::FORBIDDEN,
                "Nenhuma loja corresponde a este endereço.".to_string(),
            ),
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, "Recurso não encontrado.".to_string())
            }
            AppError::Configuration(ref what) => {
                // Logamos o que faltou, mas não vazamos o nome da variável.
                tracing::error!("Configuração ausente ou inválida: {}", what);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "O servidor está mal configurado para esta operação.".to_string(),
                )
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
