//! The four remote commands and the heuristic button panel that gates them.
//!
//! Intended transitions, decided by the server:
//!
//! ```text
//! start:  Free    -> InUse
//! pause:  InUse   -> Stopped
//! resume: Stopped -> InUse
//! finish: InUse   -> Free
//! ```
//!
//! The panel only enables or disables buttons from the local (possibly stale)
//! state; it does not enforce the transitions above.

use crate::model::MachineState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    Pause,
    Resume,
    Finish,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::Start,
        Command::Pause,
        Command::Resume,
        Command::Finish,
    ];

    /// Backend endpoint the command is POSTed to.
    pub fn endpoint(self) -> &'static str {
        match self {
            Command::Start => "/unlock_machine",
            Command::Pause => "/stop_machine",
            Command::Resume => "/unstop_machine",
            Command::Finish => "/lock_machine",
        }
    }

    /// State the view assumes once the backend accepted the command.
    pub fn target_state(self) -> MachineState {
        match self {
            Command::Start => MachineState::InUse,
            Command::Pause => MachineState::Stopped,
            Command::Resume => MachineState::InUse,
            Command::Finish => MachineState::Free,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Finish => "finish",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    pub command: Command,
    pub enabled: bool,
}

/// Three buttons: start, pause-or-resume, finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlPanel {
    pub start: Button,
    pub middle: Button,
    pub finish: Button,
}

impl ControlPanel {
    pub fn for_state(state: MachineState) -> Self {
        let middle = match state {
            MachineState::Stopped => Button {
                command: Command::Resume,
                enabled: true,
            },
            MachineState::Free => Button {
                command: Command::Pause,
                enabled: false,
            },
            _ => Button {
                command: Command::Pause,
                enabled: true,
            },
        };
        Self {
            start: Button {
                command: Command::Start,
                enabled: state != MachineState::InUse,
            },
            middle,
            finish: Button {
                command: Command::Finish,
                enabled: state == MachineState::InUse,
            },
        }
    }

    pub fn buttons(&self) -> [Button; 3] {
        [self.start, self.middle, self.finish]
    }

    /// A command whose button is not shown counts as disabled.
    pub fn is_enabled(&self, command: Command) -> bool {
        self.buttons()
            .iter()
            .any(|b| b.command == command && b.enabled)
    }

    pub fn enabled_commands(&self) -> Vec<Command> {
        self.buttons()
            .iter()
            .filter(|b| b.enabled)
            .map(|b| b.command)
            .collect()
    }
}
