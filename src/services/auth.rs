// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{
        normalize_email, AuthResponse, Claims, LoginUserPayload, RegisterUserPayload, User, UserRole,
    },
};

/// Emite e valida os JWT (HS256) da API.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expires_in_days: i64,
}

impl TokenIssuer {
    pub fn new(secret: &str, expires_in_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expires_in_days,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.expires_in_days);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    // Assinatura inválida ou token expirado viram InvalidToken
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tokens: TokenIssuer,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, tokens: TokenIssuer, pool: PgPool) -> Self {
        Self {
            user_repo,
            tokens,
            pool,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub async fn register(&self, payload: RegisterUserPayload) -> Result<AuthResponse, AppError> {
        let user = self
            .create_with_role(&payload.name, &payload.email, &payload.password, UserRole::User)
            .await?;
        let token = self.tokens.issue(&user)?;
        Ok(AuthResponse { user, token })
    }

    pub async fn login(&self, payload: LoginUserPayload) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(&normalize_email(&payload.email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = payload.password;
        let password_hash = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let user = self
            .user_repo
            .touch_last_signed_in(user.id)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let token = self.tokens.issue(&user)?;
        Ok(AuthResponse { user, token })
    }

    /// Perfil do dono do token. Também atualiza o último acesso.
    pub async fn me(&self, claims: &Claims) -> Result<User, AppError> {
        self.user_repo
            .touch_last_signed_in(claims.sub)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário"))
    }

    /// Cria o administrador inicial se o e-mail ainda não existe. Retorna `true` se criou.
    pub async fn ensure_admin(&self, name: &str, email: &str, password: &str) -> Result<bool, AppError> {
        if let Some(existing) = self.user_repo.find_by_email(&normalize_email(email)).await? {
            if existing.role != UserRole::Admin {
                tracing::warn!("⚠️ {} já existe sem papel de administrador", email);
            }
            return Ok(false);
        }

        self.create_with_role(name, email, password, UserRole::Admin).await?;
        Ok(true)
    }

    async fn create_with_role(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, AppError> {
        // Hashing fora do runtime async
        let password = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        self.user_repo
            .create_user(&self.pool, name.trim(), &normalize_email(email), &hashed_password, role)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Maria".into(),
            email: "maria@agencia.com".into(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
            last_signed_in: None,
        }
    }

    #[test]
    fn issued_token_carries_identity_and_role() {
        let issuer = TokenIssuer::new("segredo-de-teste", 7);
        let admin = user(UserRole::Admin);

        let claims = issuer.verify(&issuer.issue(&admin).unwrap()).unwrap();

        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.name, "Maria");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = TokenIssuer::new("um", 7).issue(&user(UserRole::User)).unwrap();
        let err = TokenIssuer::new("outro", 7).verify(&token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = TokenIssuer::new("segredo", -1).issue(&user(UserRole::User)).unwrap();
        assert!(matches!(
            TokenIssuer::new("segredo", 7).verify(&token),
            Err(AppError::InvalidToken)
        ));
    }
}
