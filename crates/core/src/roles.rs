//! Well-known role name constants.
//!
//! These must match the seed data in the `users` table migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_PARENT: &str = "parent";
pub const ROLE_STUDENT: &str = "student";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_TEACHER, ROLE_PARENT, ROLE_STUDENT];

/// Validate that a role string is one of the accepted values.
pub fn validate_role(role: &str) -> Result<(), String> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_accepted() {
        for role in VALID_ROLES {
            assert!(validate_role(role).is_ok());
        }
    }

    #[test]
    fn unknown_role_rejected() {
        let result = validate_role("principal");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid role"));
    }

    #[test]
    fn empty_role_rejected() {
        assert!(validate_role("").is_err());
    }

    #[test]
    fn roles_are_case_sensitive() {
        assert!(validate_role("Admin").is_err());
        assert!(validate_role("TEACHER").is_err());
    }
}
