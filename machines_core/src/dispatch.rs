//! Sends one command and applies its optimistic local transition.

use crate::client::ApiClient;
use crate::command::Command;
use crate::error::ApiError;
use crate::model::{Machine, MachineState};

/// Issues commands for one session. Holds no state of its own; the machine
/// passed to `dispatch` is the only thing it writes.
#[derive(Debug, Clone, Copy)]
pub struct CommandDispatcher<'a> {
    client: &'a ApiClient,
    token: &'a str,
}

impl<'a> CommandDispatcher<'a> {
    pub fn new(client: &'a ApiClient, token: &'a str) -> Self {
        Self { client, token }
    }

    /// POSTs the command for `machine.id`. On success sets `machine.state`
    /// to the command's target and returns it; on failure leaves it untouched.
    ///
    /// The reply body is logged and otherwise ignored.
    pub fn dispatch(&self, command: Command, machine: &mut Machine) -> Result<MachineState, ApiError> {
        tracing::info!(machine = %machine.id, %command, "dispatching command");
        match self.client.send_command(self.token, &machine.id, command) {
            Ok(reply) => {
                tracing::debug!(
                    machine = %machine.id,
                    %command,
                    status = reply.status,
                    body = %String::from_utf8_lossy(&reply.body),
                    "command accepted"
                );
                let target = command.target_state();
                machine.state = target;
                Ok(target)
            }
            Err(e) => {
                tracing::warn!(
                    machine = %machine.id,
                    %command,
                    detail = %e.detail(),
                    "command failed: {e}"
                );
                Err(e)
            }
        }
    }

    pub fn start(&self, machine: &mut Machine) -> Result<MachineState, ApiError> {
        self.dispatch(Command::Start, machine)
    }

    pub fn pause(&self, machine: &mut Machine) -> Result<MachineState, ApiError> {
        self.dispatch(Command::Pause, machine)
    }

    pub fn resume(&self, machine: &mut Machine) -> Result<MachineState, ApiError> {
        self.dispatch(Command::Resume, machine)
    }

    pub fn finish(&self, machine: &mut Machine) -> Result<MachineState, ApiError> {
        self.dispatch(Command::Finish, machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::ScriptedBackend;

    fn machine(state: MachineState) -> Machine {
        Machine {
            id: "m1".into(),
            state,
            voltage: 12.0,
            ip_addr: "10.0.0.5".into(),
            parking_id: None,
        }
    }

    #[test]
    fn body_never_drives_state() {
        let backend = ScriptedBackend::new();
        // Body claims a different state; it must be ignored.
        backend.push_json(200, r#"{"state":1}"#);
        let client = ApiClient::new(backend.clone(), Default::default());
        let mut m = machine(MachineState::Free);
        let s = CommandDispatcher::new(&client, "tok").start(&mut m).unwrap();
        assert_eq!(s, MachineState::InUse);
        assert_eq!(m.state, MachineState::InUse);
    }

    #[test]
    fn failure_leaves_state_untouched() {
        let backend = ScriptedBackend::new();
        backend.push_json(409, r#"{"error":"busy"}"#);
        let client = ApiClient::new(backend.clone(), Default::default());
        let mut m = machine(MachineState::InUse);
        let err = CommandDispatcher::new(&client, "tok").pause(&mut m).unwrap_err();
        assert_eq!(err.to_string(), "busy");
        assert_eq!(m.state, MachineState::InUse);
    }

    #[test]
    fn dispatcher_does_not_gate_on_local_state() {
        let backend = ScriptedBackend::new();
        backend.push_json(200, "{}");
        let client = ApiClient::new(backend.clone(), Default::default());
        let mut m = machine(MachineState::Free);
        CommandDispatcher::new(&client, "tok").finish(&mut m).unwrap();
        assert_eq!(backend.requests().len(), 1);
        assert_eq!(m.state, MachineState::Free);
    }
}
