// src/models/auth.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    Admin,
    Collaborator,
}

// Módulos da aplicação que podem ser liberados por usuário
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum Module {
    Dashboard,
    Companies,
    Contacts,
    Deals,
    Tasks,
    Finance,
    Notes,
    Settings,
    Exports,
}

impl Module {
    pub const ALL: [Module; 9] = [
        Module::Dashboard,
        Module::Companies,
        Module::Contacts,
        Module::Deals,
        Module::Tasks,
        Module::Finance,
        Module::Notes,
        Module::Settings,
        Module::Exports,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Module::Dashboard => "dashboard",
            Module::Companies => "companies",
            Module::Contacts => "contacts",
            Module::Deals => "deals",
            Module::Tasks => "tasks",
            Module::Finance => "finance",
            Module::Notes => "notes",
            Module::Settings => "settings",
            Module::Exports => "exports",
        }
    }
}

pub type PermissionMap = BTreeMap<Module, bool>;

/// Mapa padrão de um colaborador recém-criado: tudo menos configurações.
pub fn default_collaborator_permissions() -> PermissionMap {
    Module::ALL
        .iter()
        .map(|m| (*m, *m != Module::Settings))
        .collect()
}

// Perfil de usuário (tabela 'profiles')
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,

    #[schema(example = "Ana Souza")]
    pub name: String,

    #[schema(example = "ana@empresa.com.br")]
    pub email: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    pub role: UserRole,

    #[sqlx(json)]
    #[schema(value_type = Object)]
    pub permissions: PermissionMap,

    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Administradores acessam tudo; colaboradores só o que está marcado.
    pub fn can_access(&self, module: Module) -> bool {
        match self.role {
            UserRole::Admin => true,
            UserRole::Collaborator => self.permissions.get(&module).copied().unwrap_or(false),
        }
    }
}

// Cadastro de uma nova organização com o seu primeiro administrador
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ancóra Consultoria")]
    pub organization_name: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ana Souza")]
    pub name: String,

    #[validate(email(message = "invalid_email"))]
    pub email: String,

    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(email(message = "invalid_email"))]
    pub email: String,
    #[validate(length(min = 1, message = "required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,    // ID do usuário
    pub tenant: Uuid, // Organização do usuário
    pub exp: usize,
    pub iat: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole, permissions: PermissionMap) -> User {
        User {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Teste".into(),
            email: "teste@ancora.dev".into(),
            password_hash: String::new(),
            role,
            permissions,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn admin_ignores_permission_map() {
        let u = user(UserRole::Admin, PermissionMap::new());
        assert!(Module::ALL.iter().all(|m| u.can_access(*m)));
    }

    #[test]
    fn collaborator_defaults_to_denied() {
        let mut perms = PermissionMap::new();
        perms.insert(Module::Deals, true);
        let u = user(UserRole::Collaborator, perms);

        assert!(u.can_access(Module::Deals));
        assert!(!u.can_access(Module::Finance));
    }

    #[test]
    fn default_collaborator_map_hides_settings() {
        let u = user(UserRole::Collaborator, default_collaborator_permissions());
        assert!(u.can_access(Module::Companies));
        assert!(!u.can_access(Module::Settings));
    }

    #[test]
    fn permission_map_serializes_with_module_slugs() {
        let json = serde_json::to_value(default_collaborator_permissions()).unwrap();
        assert_eq!(json["finance"], true);
        assert_eq!(json["settings"], false);
    }
}
