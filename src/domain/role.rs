use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access: reports and inventory management
    Admin,
    /// Billing only
    Cashier,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Cashier => "cashier",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "cashier" => Some(Role::Cashier),
            _ => None,
        }
    }

    pub fn can_view_reports(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn can_manage_inventory(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whoever is driving the gateway right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub username: String,
    pub role: Role,
}

impl Operator {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self::new(username, Role::Admin)
    }

    pub fn cashier(username: impl Into<String>) -> Self {
        Self::new(username, Role::Cashier)
    }

    pub fn can_view_reports(&self) -> bool {
        self.role.can_view_reports()
    }

    pub fn can_manage_inventory(&self) -> bool {
        self.role.can_manage_inventory()
    }

    /// One-line banner shown when an operator logs in.
    pub fn describe(&self) -> String {
        match self.role {
            Role::Admin => format!("User: {} [ADMIN] - Full Access granted.", self.username),
            Role::Cashier => format!(
                "User: {} [CASHIER] - Limited Access (Billing Only).",
                self.username
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::Admin, Role::Cashier] {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_str("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::from_str("manager"), None);
    }

    #[test]
    fn test_only_admin_sees_reports() {
        assert!(Operator::admin("Lucky").can_view_reports());
        assert!(!Operator::cashier("Bob").can_view_reports());
        assert!(!Operator::cashier("Bob").can_manage_inventory());
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            Operator::admin("Lucky").describe(),
            "User: Lucky [ADMIN] - Full Access granted."
        );
        assert_eq!(
            Operator::cashier("Bob").describe(),
            "User: Bob [CASHIER] - Limited Access (Billing Only)."
        );
    }
}
