//! Master command opcodes (frame word 0)

use serde::{Deserialize, Serialize};

/// Board-level control action carried in frame word 0.
///
/// The command set is fixed and closed; unknown raw values decode to `None`
/// via [`MasterCommand::from_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum MasterCommand {
    /// Release torque on every servo.
    TorqueAllOff = 0,
    /// Zero the estimated yaw axis at its current value.
    UpdateYawCenter = 10002,
    /// Enter servo trim mode.
    EnterTrimMode = 10003,
    /// Clear the IDs of servos flagged with communication errors.
    ClearServoErrorId = 10004,
    /// Board transmits on its own schedule; the host waits to receive.
    BoardTransmitActive = 10005,
    /// Board waits for the host and replies; the host transmits on schedule.
    BoardTransmitPassive = 10006,
    /// Reset the board's frame-management timer to the current time.
    ResetMrdTimer = 10007,
}

impl MasterCommand {
    /// Raw wire value for word 0.
    pub const fn raw(self) -> u16 {
        self as u16
    }

    /// Decode a raw word 0 value; returns `None` for codes outside the
    /// closed command set.
    pub const fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(MasterCommand::TorqueAllOff),
            10002 => Some(MasterCommand::UpdateYawCenter),
            10003 => Some(MasterCommand::EnterTrimMode),
            10004 => Some(MasterCommand::ClearServoErrorId),
            10005 => Some(MasterCommand::BoardTransmitActive),
            10006 => Some(MasterCommand::BoardTransmitPassive),
            10007 => Some(MasterCommand::ResetMrdTimer),
            _ => None,
        }
    }
}

impl From<MasterCommand> for u16 {
    fn from(command: MasterCommand) -> u16 {
        command.raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [MasterCommand; 7] = [
        MasterCommand::TorqueAllOff,
        MasterCommand::UpdateYawCenter,
        MasterCommand::EnterTrimMode,
        MasterCommand::ClearServoErrorId,
        MasterCommand::BoardTransmitActive,
        MasterCommand::BoardTransmitPassive,
        MasterCommand::ResetMrdTimer,
    ];

    #[test]
    fn raw_round_trip() {
        for command in ALL {
            assert_eq!(MasterCommand::from_raw(command.raw()), Some(command));
        }
    }

    #[test]
    fn known_wire_values() {
        assert_eq!(MasterCommand::TorqueAllOff.raw(), 0);
        assert_eq!(MasterCommand::UpdateYawCenter.raw(), 10002);
        assert_eq!(MasterCommand::ResetMrdTimer.raw(), 10007);
    }

    #[test]
    fn unknown_codes_rejected() {
        assert_eq!(MasterCommand::from_raw(1), None);
        assert_eq!(MasterCommand::from_raw(10001), None);
        assert_eq!(MasterCommand::from_raw(10008), None);
        assert_eq!(MasterCommand::from_raw(u16::MAX), None);
    }
}
