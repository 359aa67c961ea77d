use machines_traits::TokenStore;

use crate::client::ApiClient;
use crate::error::{Result, ViewError};
use crate::route::Route;

/// Phone/password form. Both fields are required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub phone: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(phone: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            password: password.into(),
        }
    }

    /// Exchanges the credentials for a token, stores it and returns the next route.
    pub fn submit(&self, client: &ApiClient, session: &mut dyn TokenStore) -> Result<Route> {
        if self.phone.trim().is_empty() {
            return Err(ViewError::MissingParam("phone"));
        }
        if self.password.is_empty() {
            return Err(ViewError::MissingParam("password"));
        }
        let token = client.login(self.phone.trim(), &self.password)?;
        session
            .save(&token)
            .map_err(|e| ViewError::Session(e.to_string()))?;
        tracing::info!("logged in");
        Ok(Route::Machines)
    }
}

/// Drops the stored token. Returns where to go next.
pub fn logout(session: &mut dyn TokenStore) -> Result<Route> {
    session
        .clear()
        .map_err(|e| ViewError::Session(e.to_string()))?;
    tracing::info!("logged out");
    Ok(Route::Login)
}
