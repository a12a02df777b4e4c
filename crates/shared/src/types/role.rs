//! User roles.

use serde::{Deserialize, Serialize};

/// Role of a user within their holding-company group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Sees and administers every company in the group; approves reports.
    Controller,
    /// Sees only granted companies; submits reports for them.
    Leader,
}

impl UserRole {
    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "controller" => Some(Self::Controller),
            "leader" => Some(Self::Leader),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Controller => "controller",
            Self::Leader => "leader",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
