use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::validation::{Field, FieldErrors};

/// Passenger contact details collected by the mocked checkout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"))
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern compiles"))
}

impl ContactDetails {
    /// Check every field and report all failures together.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.add(Field::Name, "Name is required");
        }

        if self.email.trim().is_empty() {
            errors.add(Field::Email, "Email is required");
        } else if !email_pattern().is_match(&self.email) {
            errors.add(Field::Email, "Email is invalid");
        }

        let phone: String = self.phone.chars().filter(|c| !c.is_whitespace()).collect();
        if phone.is_empty() {
            errors.add(Field::Phone, "Phone is required");
        } else if !phone_pattern().is_match(&phone) {
            errors.add(Field::Phone, "Phone must be 10 digits");
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(name: &str, email: &str, phone: &str) -> ContactDetails {
        ContactDetails {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn test_valid_details() {
        assert!(details("Asha", "asha@example.com", "98765 43210").validate().is_ok());
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let errors = details(" ", "", "").validate().unwrap_err();

        assert_eq!(errors.get(Field::Name), Some("Name is required"));
        assert_eq!(errors.get(Field::Email), Some("Email is required"));
        assert_eq!(errors.get(Field::Phone), Some("Phone is required"));
    }

    #[test]
    fn test_malformed_email_and_phone() {
        let errors = details("Asha", "asha-at-example", "12345").validate().unwrap_err();

        assert_eq!(errors.get(Field::Email), Some("Email is invalid"));
        assert_eq!(errors.get(Field::Phone), Some("Phone must be 10 digits"));
        assert!(!errors.contains(Field::Name));
    }
}
