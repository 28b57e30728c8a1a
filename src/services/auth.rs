// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{SettingsRepository, TenantRepository, UserRepository},
    models::{
        auth::{AuthResponse, Claims, LoginPayload, Module, PermissionMap, RegisterPayload, User, UserRole},
        settings::{StageScope, UpdateOrganizationRequest},
    },
    services::stage_service::default_stages,
};

// Validade do token emitido no login/cadastro
const TOKEN_TTL_DAYS: i64 = 7;

/// Hash bcrypt fora do runtime assíncrono.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tenant_repo: TenantRepository,
    settings_repo: SettingsRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        tenant_repo: TenantRepository,
        settings_repo: SettingsRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, tenant_repo, settings_repo, jwt_secret, pool }
    }

    /// Cria a organização, o primeiro administrador, as etapas padrão e os
    /// dados da empresa numa única transação.
    pub async fn register(&self, payload: &RegisterPayload) -> Result<AuthResponse, AppError> {
        let hashed_password = hash_password(&payload.password).await?;

        let mut tx = self.pool.begin().await?;

        let tenant = self
            .tenant_repo
            .create_tenant(&mut *tx, payload.organization_name.trim())
            .await?;

        let all_modules: PermissionMap = Module::ALL.iter().map(|m| (*m, true)).collect();
        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                tenant.id,
                payload.name.trim(),
                &payload.email,
                &hashed_password,
                UserRole::Admin,
                &all_modules,
            )
            .await?;

        for scope in [StageScope::Deal, StageScope::Task] {
            for stage in default_stages(tenant.id, scope) {
                self.settings_repo.insert_stage(&mut *tx, tenant.id, scope, &stage).await?;
            }
        }

        let organization = UpdateOrganizationRequest {
            company_name: Some(tenant.name.clone()),
            tax_id: None,
            address: None,
            phone: None,
            email: Some(user.email.clone()),
            logo_url: None,
        };
        self.settings_repo
            .update_settings(&mut *tx, tenant.id, &organization)
            .await?;

        tx.commit().await?;

        tracing::info!("Nova organização '{}' ({}) cadastrada", tenant.name, tenant.id);

        let token = self.create_token(&user)?;
        Ok(AuthResponse { token, user })
    }

    pub async fn login(&self, payload: &LoginPayload) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(&self.pool, &payload.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = payload.password.clone();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&user)?;
        Ok(AuthResponse { token, user })
    }

    /// Decodifica o token e recarrega o perfil: permissões alteradas valem na hora.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_token(token)?;

        let user = self
            .user_repo
            .find_by_id(&self.pool, claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        // Perfil movido de organização invalida tokens antigos
        if user.tenant_id != claims.tenant {
            return Err(AppError::InvalidToken);
        }

        Ok(user)
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims)
    }

    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: user.id,
            tenant: user.tenant_id,
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

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn service() -> AuthService {
        // Pool preguiçoso: os testes de token não tocam no banco
        let pool = PgPool::connect_lazy("postgres://localhost/ancora_test").unwrap();
        AuthService::new(
            UserRepository::new(),
            TenantRepository::new(),
            SettingsRepository::new(),
            "segredo-de-teste".into(),
            pool,
        )
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Ana".into(),
            email: "ana@ancora.dev".into(),
            password_hash: String::new(),
            role: UserRole::Admin,
            permissions: PermissionMap::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn token_carries_user_and_tenant() {
        let service = service();
        let u = user();

        let token = service.create_token(&u).unwrap();
        let claims = service.decode_token(&token).unwrap();

        assert_eq!(claims.sub, u.id);
        assert_eq!(claims.tenant, u.tenant_id);
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let service = service();
        let other = AuthService { jwt_secret: "outro".into(), ..service.clone() };

        let token = other.create_token(&user()).unwrap();
        assert!(matches!(service.decode_token(&token), Err(AppError::InvalidToken)));
        assert!(matches!(service.decode_token("lixo"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn hashed_password_verifies() {
        let hashed = hash_password("segredo123").await.unwrap();
        assert!(verify("segredo123", &hashed).unwrap());
        assert!(!verify("errada", &hashed).unwrap());
    }
}
