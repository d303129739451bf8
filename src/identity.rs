//! User identity embedded in access tokens by the backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User role. Anything the backend does not call "admin" is a plain user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    pub fn is_admin(self) -> bool {
        match self {
            Role::Admin => true,
            Role::User => false,
        }
    }
}

/// A line in the shopping cart. Only the id is interpreted here; the rest
/// of the backend's fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl CartItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            details: Map::new(),
        }
    }
}

/// A course the user is enrolled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrolledCourse {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl EnrolledCourse {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            details: Map::new(),
        }
    }
}

/// Decoded user object from the `user` claim of an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub cart: Vec<CartItem>,
    #[serde(default)]
    pub enrolled_courses: Vec<EnrolledCourse>,
    /// Fields this server does not interpret (avatar, phone, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            name: name.into(),
            email: None,
            cart: Vec::new(),
            enrolled_courses: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
