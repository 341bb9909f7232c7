//! The acting user supplied by access control.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller role. Only [`Role::Admin`] is privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
    Intern,
    /// Any role string access control hands us that we do not recognize.
    Guest,
}

impl Role {
    /// Map a role claim to a role; unrecognized claims are non-privileged.
    #[must_use]
    pub fn from_claim(claim: &str) -> Self {
        match claim.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "employee" => Role::Employee,
            "intern" => Role::Intern,
            _ => Role::Guest,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
            Role::Intern => "intern",
            Role::Guest => "guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and role of the user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    #[must_use]
    pub fn admin(id: impl Into<String>) -> Self {
        Self::new(id, Role::Admin)
    }

    #[must_use]
    pub fn employee(id: impl Into<String>) -> Self {
        Self::new(id, Role::Employee)
    }

    /// Privileged actors bypass approval staging.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.role == Role::Admin
    }
}
