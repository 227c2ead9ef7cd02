use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::document::{CollectionMapping, Document, FieldMapping},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Whether a holder of this role may perform an action requiring `required`.
    pub fn grants(&self, required: Role) -> bool {
        self.is_admin() || *self == required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(AppError::BadRequest(format!("Unknown role: {}", other))),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// An account. `password` only ever holds a bcrypt hash; hashing and
/// verification live in `services::password_service`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct User {
    id: Option<Uuid>,
    username: String,
    password: String,
    #[sqlx(try_from = "String")]
    role: Role,
}

impl User {
    pub fn new(
        id: Option<Uuid>,
        username: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            password: password.into(),
            role,
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn set_id(&mut self, id: Option<Uuid>) {
        self.id = id;
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn set_password(&mut self, password_hash: impl Into<String>) {
        self.password = password_hash.into();
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }
}

impl Document for User {
    const MAPPING: CollectionMapping = CollectionMapping {
        collection: "users",
        key: "id",
        fields: &[
            FieldMapping::new("id", "id"),
            FieldMapping::new("username", "username"),
            FieldMapping::new("password", "password"),
            FieldMapping::new("role", "role"),
        ],
    };

    fn id(&self) -> Option<Uuid> {
        self.id
    }
}
