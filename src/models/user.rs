//! User model, permissions and bearer-token claims

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Permissions checked by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Permission {
    /// Return Book: view every loan and renew copies
    #[serde(rename = "catalog.can_mark_returned")]
    CanMarkReturned,
}

impl Permission {
    /// Fully qualified name, as carried in tokens
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CanMarkReturned => "catalog.can_mark_returned",
        }
    }

    /// Codename stored in the `permissions` table
    pub fn codename(&self) -> &'static str {
        match self {
            Permission::CanMarkReturned => "can_mark_returned",
        }
    }

    pub fn from_codename(codename: &str) -> Option<Self> {
        match codename {
            "can_mark_returned" => Some(Permission::CanMarkReturned),
            _ => None,
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Library user (patron or librarian)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
    pub permissions: Vec<Permission>,
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Username
    pub sub: String,
    pub user_id: i32,
    #[serde(default)]
    pub is_staff: bool,
    /// Qualified permission names (`catalog.can_mark_returned`)
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.iter().any(|p| p == permission.as_str())
    }
}

/// Identity of whoever issued the request, if anyone
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<UserClaims>);

impl Caller {
    pub fn anonymous() -> Self {
        Caller(None)
    }

    pub fn claims(&self) -> Option<&UserClaims> {
        self.0.as_ref()
    }

    pub fn require_authenticated(&self) -> Result<&UserClaims, AppError> {
        self.0
            .as_ref()
            .ok_or_else(|| AppError::Authentication("Login required".to_string()))
    }

    /// Anonymous callers are denied like any caller lacking the permission
    pub fn require_permission(&self, permission: Permission) -> Result<&UserClaims, AppError> {
        match &self.0 {
            Some(claims) if claims.has_permission(permission) => Ok(claims),
            _ => Err(AppError::Authorization(format!(
                "Permission {} required",
                permission
            ))),
        }
    }

    pub fn require_staff(&self) -> Result<&UserClaims, AppError> {
        let claims = self.require_authenticated()?;
        if claims.is_staff {
            Ok(claims)
        } else {
            Err(AppError::Authorization("Staff access required".to_string()))
        }
    }
}
