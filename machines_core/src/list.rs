//! Read-only list of every machine.

use machines_traits::TokenStore;

use crate::client::ApiClient;
use crate::error::{Result, ViewError};
use crate::model::Machine;
use crate::route::Route;
use crate::status::{StatusBadge, status_badge};

/// One line of the list, already resolved for display.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineRow {
    pub id: String,
    pub badge: StatusBadge,
    pub voltage: f64,
    pub ip_addr: String,
    /// Where selecting the row leads.
    pub link: Route,
}

#[derive(Debug, Clone)]
pub struct MachinesView {
    machines: Vec<Machine>,
}

impl MachinesView {
    pub fn open(client: &ApiClient, session: &dyn TokenStore) -> Result<Self> {
        let Some(token) = session.load() else {
            return Err(ViewError::LoginRequired);
        };
        let machines = client.machines(&token).map_err(|e| {
            tracing::warn!(detail = %e.detail(), "failed to fetch machines: {e}");
            ViewError::LoadFailed(e)
        })?;
        tracing::debug!(count = machines.len(), "machines loaded");
        Ok(Self { machines })
    }

    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    pub fn rows(&self) -> Vec<MachineRow> {
        self.machines
            .iter()
            .map(|m| MachineRow {
                id: m.id.clone(),
                badge: status_badge(m.state),
                voltage: m.voltage,
                ip_addr: m.ip_addr.clone(),
                link: Route::machine(&m.id),
            })
            .collect()
    }
}
