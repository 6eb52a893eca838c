use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pii::Masked;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    User,
    Admin,
}

/// The stored login session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
    pub user_type: UserType,
    pub is_logged_in: bool,
    pub last_login: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_record_layout() {
        let json = r#"{
            "name": "Asha",
            "email": "asha@example.com",
            "phone": "+91 8888888888",
            "userType": "user",
            "isLoggedIn": true,
            "lastLogin": "2025-03-01T10:30:00.000Z"
        }"#;
        let user: User = serde_json::from_str(json).expect("Failed to deserialize");

        assert_eq!(user.user_type, UserType::User);
        assert!(!user.is_admin());
        assert_eq!(user.email.0, "asha@example.com");
        // Contact details stay out of debug output
        assert!(!format!("{:?}", user).contains("asha@example.com"));
    }
}
