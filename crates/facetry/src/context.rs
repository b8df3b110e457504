//! Who is acting, and on behalf of which client.
//!
//! Every client-scoped operation takes a [`ClientContext`]. There is no
//! process-wide "current client".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "super_admin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "member" | "user" => Ok(Role::Member),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContext {
    pub user_id: String,
    pub role: Role,
    client_id: Option<String>,
}

impl ClientContext {
    pub fn new(user_id: impl Into<String>, role: Role, client_id: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            client_id: client_id.filter(|c| !c.trim().is_empty()),
        }
    }

    /// A context acting on `client_id`. Only super admins may switch.
    pub fn impersonate(&self, client_id: impl Into<String>) -> Result<Self, ValidationError> {
        if self.role != Role::SuperAdmin {
            return Err(ValidationError::ImpersonationDenied);
        }
        Ok(Self::new(self.user_id.clone(), self.role, Some(client_id.into())))
    }

    /// The client every data access is scoped to.
    pub fn active_client(&self) -> Result<&str, ValidationError> {
        self.client_id
            .as_deref()
            .ok_or_else(|| ValidationError::MissingClient {
                user_id: self.user_id.clone(),
            })
    }
}
