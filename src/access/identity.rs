//! The authenticated actor attached to every request.
//!
//! An [`Identity`] is produced once per request by the auth extractor after
//! JWT verification and is immutable for the request's lifetime. Everything
//! downstream (resolvers, policy, services) receives it by reference; nothing
//! in the core ever re-reads the credential.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// System roles. A user holds exactly one role, fixed for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Principal,
    Teacher,
    Parent,
}

impl Role {
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "admin" => Some(Role::Admin),
            "principal" => Some(Role::Principal),
            "teacher" => Some(Role::Teacher),
            "parent" => Some(Role::Parent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Principal => "principal",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
        }
    }
}

/// The verified actor: who is asking, and in what capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Admin or principal: full visibility, moderation rights.
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Principal)
    }

    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }

    pub fn is_parent(&self) -> bool {
        self.role == Role::Parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_roles() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("principal"), Some(Role::Principal));
        assert_eq!(Role::parse("teacher"), Some(Role::Teacher));
        assert_eq!(Role::parse("parent"), Some(Role::Parent));
        assert_eq!(Role::parse("student"), None);
    }

    #[test]
    fn staff_predicate_covers_admin_and_principal() {
        let admin = Identity::new(Uuid::new_v4(), Role::Admin);
        let principal = Identity::new(Uuid::new_v4(), Role::Principal);
        let teacher = Identity::new(Uuid::new_v4(), Role::Teacher);

        assert!(admin.is_staff());
        assert!(principal.is_staff());
        assert!(!teacher.is_staff());
        assert!(teacher.is_teacher());
        assert!(!teacher.is_parent());
    }
}
