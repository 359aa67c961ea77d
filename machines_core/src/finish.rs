//! QR landing page that ends a parking session.

use machines_traits::TokenStore;

use crate::client::ApiClient;
use crate::error::{Result, ViewError};
use crate::route::{QueryParams, Route};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishOutcome {
    /// The server's confirmation text.
    pub message: String,
    pub next: Route,
}

pub fn finish_session(
    client: &ApiClient,
    session: &dyn TokenStore,
    params: &QueryParams,
) -> Result<FinishOutcome> {
    let Some(token) = session.load() else {
        return Err(ViewError::LoginRequired);
    };
    let key = params.non_empty("key").ok_or(ViewError::MissingParam("key"))?;
    let parking = params
        .non_empty("parking_name")
        .ok_or(ViewError::MissingParam("parking_name"))?;
    let message = client.finish_session(&token, key, parking)?;
    tracing::info!(parking, "session finished");
    Ok(FinishOutcome {
        message,
        next: Route::Machines,
    })
}
