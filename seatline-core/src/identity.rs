use chrono::{DateTime, Utc};
use seatline_shared::{Masked, User, UserType};
use serde::Deserialize;

use crate::CoreResult;

/// Credentials submitted by the login form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub name: String,
    pub email: String,
    pub password: Masked<String>,
    pub user_type: UserType,
}

/// The login gate the booking flow consults before pricing.
///
/// Implementations own the stored session record; the flow only reads
/// presence and `user_type`.
pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> CoreResult<Option<User>>;

    fn login(&self, request: LoginRequest) -> CoreResult<User>;

    fn logout(&self) -> CoreResult<()>;

    fn require_admin(&self) -> CoreResult<User> {
        match self.current_user()? {
            Some(user) if user.is_admin() => Ok(user),
            Some(_) => Err(crate::CoreError::Forbidden),
            None => Err(crate::CoreError::LoginRequired),
        }
    }
}

/// Build the session record for a mock login.
///
/// Any name, email and password are accepted; this is not a security
/// boundary. The phone number is a canned value per user type.
pub fn mock_login(request: LoginRequest, now: DateTime<Utc>) -> User {
    tracing::info!("Mock login accepted for {:?} user {}", request.user_type, request.name);

    let phone = match request.user_type {
        UserType::Admin => "+91 9999999999",
        UserType::User => "+91 8888888888",
    };

    User {
        name: request.name,
        email: Masked(request.email),
        phone: Masked(phone.to_string()),
        user_type: request.user_type,
        is_logged_in: true,
        last_login: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_login_assigns_canned_phone() {
        let now = Utc::now();
        let admin = mock_login(
            LoginRequest {
                name: "Ravi".to_string(),
                email: "ravi@example.com".to_string(),
                password: Masked("anything".to_string()),
                user_type: UserType::Admin,
            },
            now,
        );

        assert!(admin.is_admin());
        assert!(admin.is_logged_in);
        assert_eq!(admin.phone.expose(), "+91 9999999999");
        assert_eq!(admin.last_login, now);
    }

    #[test]
    fn test_login_request_keeps_password_out_of_debug() {
        let json = r#"{"name":"Asha","email":"a@b.co","password":"hunter2","userType":"user"}"#;
        let request: LoginRequest = serde_json::from_str(json).unwrap();

        assert!(!format!("{:?}", request).contains("hunter2"));
    }
}
