// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{AuthResponse, Claims, RegisterUserPayload, User, UserRole},
};

/// Hash bcrypt numa thread de bloqueio, fora do runtime async.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    jwt_ttl_days: i64,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, jwt_ttl_days: i64, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, jwt_ttl_days, pool }
    }

    // Cadastro de funcionário (rota restrita ao OWNER)
    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<User, AppError> {
        let hashed_password = hash_password(&payload.password).await?;
        let role = payload.role.unwrap_or(UserRole::User);

        let user = self
            .user_repo
            .create_user(&self.pool, payload.username.trim(), &hashed_password, payload.full_name.trim(), role)
            .await?;

        tracing::info!("👤 Funcionário '{}' cadastrado ({:?})", user.username, user.role);
        Ok(user)
    }

    pub async fn login_user(&self, username: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_username(username.trim())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(user.id)?;
        Ok(AuthResponse { token, user })
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Usuário removido depois da emissão do token
        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list_users().await
    }

    /// Cria o primeiro OWNER se ainda não existir nenhum.
    pub async fn bootstrap_owner(&self, username: &str, password: &str) -> Result<Option<User>, AppError> {
        if self.user_repo.count_owners().await? > 0 {
            return Ok(None);
        }

        let hashed_password = hash_password(password).await?;
        let owner = self
            .user_repo
            .create_user(&self.pool, username, &hashed_password, username, UserRole::Owner)
            .await?;

        tracing::info!("🔑 OWNER inicial '{}' criado", owner.username);
        Ok(Some(owner))
    }

    pub fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.jwt_ttl_days);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
