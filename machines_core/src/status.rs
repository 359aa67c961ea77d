//! Status display: state to color/label.

use crate::model::MachineState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Green,
    Red,
    Yellow,
    Gray,
}

impl StatusColor {
    pub fn name(self) -> &'static str {
        match self {
            StatusColor::Green => "green",
            StatusColor::Red => "red",
            StatusColor::Yellow => "yellow",
            StatusColor::Gray => "gray",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub color: StatusColor,
    pub label: &'static str,
}

/// Pure mapping; anything outside the three known states renders gray.
pub fn status_badge(state: MachineState) -> StatusBadge {
    match state {
        MachineState::Free => StatusBadge {
            color: StatusColor::Green,
            label: "Free",
        },
        MachineState::InUse => StatusBadge {
            color: StatusColor::Red,
            label: "In use",
        },
        MachineState::Stopped => StatusBadge {
            color: StatusColor::Yellow,
            label: "Stopped",
        },
        MachineState::Unknown(_) => StatusBadge {
            color: StatusColor::Gray,
            label: "Unknown state",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_state_has_its_badge() {
        assert_eq!(status_badge(MachineState::Free).color, StatusColor::Green);
        assert_eq!(status_badge(MachineState::Free).label, "Free");
        assert_eq!(status_badge(MachineState::InUse).color, StatusColor::Red);
        assert_eq!(status_badge(MachineState::Stopped).color, StatusColor::Yellow);
        let unknown = status_badge(MachineState::Unknown(-1));
        assert_eq!(unknown.color, StatusColor::Gray);
        assert_eq!(unknown.label, "Unknown state");
    }
}
