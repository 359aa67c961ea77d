//! Single-machine view: status display plus the command panel.
//!
//! The view owns a local copy of the machine. Commands update that copy
//! optimistically; nothing else writes to it.

use machines_traits::TokenStore;

use crate::client::ApiClient;
use crate::command::{Command, ControlPanel};
use crate::dispatch::CommandDispatcher;
use crate::error::{Result, ViewError};
use crate::model::{Machine, MachineState};
use crate::route::QueryParams;
use crate::status::{StatusBadge, status_badge};

/// Everything a front-end needs to draw the view once.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailModel {
    pub machine: Machine,
    pub badge: StatusBadge,
    pub panel: ControlPanel,
    /// Message of the last failed command, cleared by the next success.
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct MachineView {
    client: ApiClient,
    token: String,
    machine: Machine,
    error: Option<String>,
}

impl MachineView {
    /// Loads the machine named by the `id` query parameter.
    ///
    /// Checks run in order and each stops before any request: no session
    /// token, then no (or empty) id.
    pub fn open(client: &ApiClient, session: &dyn TokenStore, params: &QueryParams) -> Result<Self> {
        let Some(token) = session.load() else {
            tracing::debug!("no session token, redirecting to login");
            return Err(ViewError::LoginRequired);
        };
        let Some(id) = params.non_empty("id") else {
            return Err(ViewError::MissingMachineId);
        };
        let machine = client.machine(&token, id).map_err(|e| {
            tracing::warn!(machine = id, detail = %e.detail(), "failed to fetch machine: {e}");
            ViewError::LoadFailed(e)
        })?;
        tracing::debug!(machine = %machine.id, state = %machine.state, "machine loaded");
        Ok(Self {
            client: client.clone(),
            token,
            machine,
            error: None,
        })
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn state(&self) -> MachineState {
        self.machine.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn badge(&self) -> StatusBadge {
        status_badge(self.machine.state)
    }

    pub fn panel(&self) -> ControlPanel {
        ControlPanel::for_state(self.machine.state)
    }

    /// Presses the button for `command`.
    ///
    /// A disabled button sends nothing. A failed request leaves the state as
    /// it was and keeps the message for display.
    pub fn press(&mut self, command: Command) -> Result<MachineState> {
        if !self.panel().is_enabled(command) {
            return Err(ViewError::CommandDisabled {
                command,
                state: self.machine.state,
            });
        }
        let dispatcher = CommandDispatcher::new(&self.client, &self.token);
        match dispatcher.dispatch(command, &mut self.machine) {
            Ok(_) => {
                self.error = None;
                if self.client.settings().refresh_after_command {
                    self.refresh_after(command);
                }
                Ok(self.machine.state)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(ViewError::Api(e))
            }
        }
    }

    pub fn start(&mut self) -> Result<MachineState> {
        self.press(Command::Start)
    }

    pub fn pause(&mut self) -> Result<MachineState> {
        self.press(Command::Pause)
    }

    pub fn resume(&mut self) -> Result<MachineState> {
        self.press(Command::Resume)
    }

    pub fn finish(&mut self) -> Result<MachineState> {
        self.press(Command::Finish)
    }

    /// Re-reads the machine from the backend, replacing the local copy.
    pub fn refresh(&mut self) -> Result<()> {
        let machine = self
            .client
            .machine(&self.token, &self.machine.id)
            .map_err(ViewError::LoadFailed)?;
        self.machine = machine;
        Ok(())
    }

    fn refresh_after(&mut self, command: Command) {
        let optimistic = self.machine.state;
        match self.refresh() {
            Ok(()) if self.machine.state != optimistic => {
                tracing::info!(
                    machine = %self.machine.id,
                    %command,
                    assumed = %optimistic,
                    actual = %self.machine.state,
                    "server state differs from assumed state"
                );
            }
            Ok(()) => {}
            Err(e) => {
                tracing::warn!(machine = %self.machine.id, "refresh after {command} failed: {e}");
            }
        }
    }

    pub fn model(&self) -> DetailModel {
        DetailModel {
            machine: self.machine.clone(),
            badge: self.badge(),
            panel: self.panel(),
            error: self.error.clone(),
        }
    }
}
