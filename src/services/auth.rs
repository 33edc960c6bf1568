// src/services/auth.rs

use std::collections::HashSet;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{AuthResponse, Claims, User, UserRole},
};

const TOKEN_TTL_SECS: i64 = 60 * 60 * 24; // 24h

// ---
// 1. Alocador de subdomínios (funções puras)
// ---

/// Slug base: primeiro+último nome em minúsculas, mantendo apenas
/// [a-z0-9]. Pode sair vazio se os nomes não tiverem nenhum caractere
/// alfanumérico — o registro rejeita esse caso com erro de validação.
pub fn derive_base_slug(first_name: &str, last_name: &str) -> String {
    format!("{first_name}{last_name}")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Primeiro slug livre: o base se ninguém o tomou; senão base1, base2, …
/// `taken` é o conjunto de subdomínios existentes com esse prefixo.
pub fn first_free_slug(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    let mut counter = 1u32;
    loop {
        let candidate = format!("{base}{counter}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

// ---
// 2. O serviço de autenticação
// ---
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret }
    }

    async fn allocate_subdomain(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<String, AppError> {
        let base = derive_base_slug(first_name, last_name);
        if base.is_empty() {
            return Err(AppError::ValidationError(slug_validation_error()));
        }

        let taken: HashSet<String> = self
            .user_repo
            .list_subdomains_with_prefix(&base)
            .await?
            .into_iter()
            .collect();

        Ok(first_free_slug(&base, &taken))
    }

    /// Registra um novo admin de loja, alocando o subdomínio na mesma
    /// operação. A pré-checagem do alocador é só conforto de UX: quem
    /// decide corridas é o UNIQUE do banco — e, se perdermos a corrida
    /// do subdomínio, realocamos uma vez e tentamos de novo.
    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<AuthResponse, AppError> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        // Hashing fora do executor async (bcrypt é pesado de CPU)
        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut attempts_left = 2u8;
        let user = loop {
            let subdomain = self.allocate_subdomain(first_name, last_name).await?;

            match self
                .user_repo
                .create_user(
                    email,
                    &hashed_password,
                    first_name,
                    last_name,
                    &subdomain,
                    UserRole::Admin,
                )
                .await
            {
                Ok(user) => break user,
                Err(AppError::DatabaseError(ref db_err))
                    if constraint_contains(db_err, "email") =>
                {
                    return Err(AppError::EmailAlreadyExists);
                }
                Err(AppError::DatabaseError(ref db_err))
                    if constraint_contains(db_err, "subdomain") && attempts_left > 1 =>
                {
                    // Corrida perdida na alocação: outro registro levou o
                    // slug entre a checagem e o INSERT. Realoca.
                    attempts_left -= 1;
                    tracing::warn!(subdomain = %subdomain, "Subdomínio tomado em corrida de alocação, realocando");
                }
                Err(AppError::DatabaseError(ref db_err))
                    if constraint_contains(db_err, "subdomain") =>
                {
                    return Err(AppError::SubdomainTaken);
                }
                Err(e) => return Err(e),
            }
        };

        tracing::info!(user_id = %user.id, subdomain = ?user.subdomain, "Novo admin registrado");

        let token = self.sign_token(&user)?;
        Ok(AuthResponse { token, subdomain: user.subdomain })
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let hash_clone = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify(&password_clone, &hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação: {}", e))??;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.sign_token(&user)?;
        Ok(AuthResponse { token, subdomain: user.subdomain.clone() })
    }

    fn sign_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            iat: now as usize,
            exp: (now + TOKEN_TTL_SECS) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Valida o token e carrega o usuário correspondente.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }
}

fn constraint_contains(err: &sqlx::Error, needle: &str) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some("23505")
                && db_err.constraint().is_some_and(|c| c.contains(needle))
    )
}

fn slug_validation_error() -> validator::ValidationErrors {
    let mut errors = validator::ValidationErrors::new();
    let mut error = validator::ValidationError::new("invalid");
    error.message = Some(std::borrow::Cow::Borrowed(
        "O nome precisa conter ao menos uma letra ou dígito.",
    ));
    errors.add("firstName", error);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_base_normaliza_e_filtra() {
        assert_eq!(derive_base_slug("John", "Doe"), "johndoe");
        assert_eq!(derive_base_slug("Ana Maria", "Souza-Lima"), "anamariasouzalima");
        // Caracteres fora de [a-z0-9] caem, acentuados inclusive
        assert_eq!(derive_base_slug("João", "D'Ávila"), "joodvila");
    }

    #[test]
    fn slug_base_pode_sair_vazio() {
        // Nomes 100% não alfanuméricos produzem base vazia;
        // o registro rejeita esse caso.
        assert_eq!(derive_base_slug("---", "!!!"), "");
    }

    #[test]
    fn alocador_incrementa_ate_achar_livre() {
        let mut taken = HashSet::new();
        assert_eq!(first_free_slug("johndoe", &taken), "johndoe");

        taken.insert("johndoe".to_string());
        assert_eq!(first_free_slug("johndoe", &taken), "johndoe1");

        taken.insert("johndoe1".to_string());
        assert_eq!(first_free_slug("johndoe", &taken), "johndoe2");
    }
}
