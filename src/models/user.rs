use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Unregistered,
    Registered,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Unregistered => "UNREGISTERED",
            Role::Registered => "REGISTERED",
            Role::Admin => "ADMIN",
        }
    }

    /// Registered users and admins may book tickets.
    pub fn can_reserve(self) -> bool {
        matches!(self, Role::Registered | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "UNREGISTERED" => Ok(Role::Unregistered),
            "REGISTERED" => Ok(Role::Registered),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// The authenticated caller, as vouched for by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn owns(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_ignores_case() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("Registered".parse::<Role>(), Ok(Role::Registered));
        assert_eq!(" UNREGISTERED ".parse::<Role>(), Ok(Role::Unregistered));
        assert!("guest".parse::<Role>().is_err());
    }

    #[test]
    fn test_unknown_role_keeps_the_raw_value() {
        let err = "guest".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("guest".to_string()));
        assert_eq!(err.to_string(), "unknown role 'guest'");

        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert_eq!(boxed.to_string(), "unknown role 'guest'");
    }

    #[test]
    fn test_only_registered_and_admin_can_reserve() {
        assert!(Role::Admin.can_reserve());
        assert!(Role::Registered.can_reserve());
        assert!(!Role::Unregistered.can_reserve());
    }
}
