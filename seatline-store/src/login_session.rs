use chrono::Utc;
use seatline_core::identity::{mock_login, AuthProvider, LoginRequest};
use seatline_core::{CoreError, CoreResult};
use seatline_shared::User;
use std::sync::Arc;
use tracing::{error, info};

use crate::kv::KeyValueStore;
use crate::USER_KEY;

/// Login session kept under the `user` key of the shared store.
#[derive(Clone)]
pub struct StoredAuth {
    store: Arc<dyn KeyValueStore>,
}

impl StoredAuth {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl AuthProvider for StoredAuth {
    /// An unparseable record is dropped and treated as logged out.
    fn current_user(&self) -> CoreResult<Option<User>> {
        let Some(raw) = self.store.get(USER_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(user) if user.is_logged_in => Ok(Some(user)),
            Ok(_) => Ok(None),
            Err(e) => {
                error!("Error parsing stored user data: {}", e);
                self.store.remove(USER_KEY)?;
                Ok(None)
            }
        }
    }

    fn login(&self, request: LoginRequest) -> CoreResult<User> {
        let user = mock_login(request, Utc::now());
        let raw = serde_json::to_string(&user)
            .map_err(|e| CoreError::InternalError(format!("Failed to encode user: {}", e)))?;
        self.store.set(USER_KEY, &raw)?;
        Ok(user)
    }

    fn logout(&self) -> CoreResult<()> {
        info!("Clearing stored login session");
        self.store.remove(USER_KEY)?;
        Ok(())
    }
}
