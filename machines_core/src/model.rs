//! Wire model shared by every view.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lock/use state of a machine as reported by the backend.
///
/// Wire encoding is an integer: `0` free, `1` stopped, `2` in use. Any other
/// value is kept as `Unknown` so the status display can fall back instead of
/// the whole payload failing to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachineState {
    Free,
    Stopped,
    InUse,
    Unknown(i64),
}

impl MachineState {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => MachineState::Free,
            1 => MachineState::Stopped,
            2 => MachineState::InUse,
            other => MachineState::Unknown(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            MachineState::Free => 0,
            MachineState::Stopped => 1,
            MachineState::InUse => 2,
            MachineState::Unknown(code) => code,
        }
    }
}

impl std::fmt::Display for MachineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MachineState::Free => f.write_str("free"),
            MachineState::Stopped => f.write_str("stopped"),
            MachineState::InUse => f.write_str("in use"),
            MachineState::Unknown(code) => write!(f, "in unknown state {code}"),
        }
    }
}

impl Serialize for MachineState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for MachineState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(MachineState::from_code)
    }
}

/// A piece of shared equipment. The client only ever holds a transient,
/// possibly stale copy; the backend owns the real one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: String,
    pub state: MachineState,
    pub voltage: f64,
    #[serde(rename = "ipAddr")]
    pub ip_addr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_id: Option<i64>,
}
