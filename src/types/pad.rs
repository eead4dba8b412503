//! Controller input snapshot and button bit layout

use serde::{Deserialize, Serialize};

/// Bit masks for the packed button word (frame word 15).
///
/// The layout is a fixed peer contract; the values are the wire bits, not
/// an internal convention.
pub mod pad_buttons {
    pub const SELECT: u16 = 0x0001;
    pub const R3: u16 = 0x0002;
    pub const L3: u16 = 0x0004;
    pub const START: u16 = 0x0008;
    pub const UP: u16 = 0x0010;
    pub const RIGHT: u16 = 0x0020;
    pub const DOWN: u16 = 0x0040;
    pub const LEFT: u16 = 0x0080;
    pub const L2: u16 = 0x0100;
    pub const R2: u16 = 0x0200;
    pub const L1: u16 = 0x0400;
    pub const R1: u16 = 0x0800;
    pub const B: u16 = 0x1000;
    pub const D: u16 = 0x2000;
    pub const A: u16 = 0x4000;
    pub const C: u16 = 0x8000;
}

/// Immutable snapshot of a controller's state.
///
/// One boolean per physical button plus four signed 8-bit analog pairs.
/// Pass by reference into the packing path; the snapshot itself holds no
/// behaviour beyond [`PadState::button_bits`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadState {
    pub select: bool,
    pub start: bool,
    pub up: bool,
    pub right: bool,
    pub down: bool,
    pub left: bool,
    pub l1: bool,
    pub l2: bool,
    pub l3: bool,
    pub r1: bool,
    pub r2: bool,
    pub r3: bool,
    pub a: bool,
    pub b: bool,
    pub c: bool,
    pub d: bool,

    /// Left stick horizontal axis.
    pub left_stick_h: i8,
    /// Left stick vertical axis.
    pub left_stick_v: i8,
    /// Right stick horizontal axis.
    pub right_stick_h: i8,
    /// Right stick vertical axis.
    pub right_stick_v: i8,
    /// Left analog trigger.
    pub left_analog: i8,
    /// Right analog trigger.
    pub right_analog: i8,
}

impl PadState {
    /// Pack the 16 button booleans into the wire bitmask for word 15.
    pub fn button_bits(&self) -> u16 {
        let mut bits = 0u16;
        if self.select {
            bits |= pad_buttons::SELECT;
        }
        if self.r3 {
            bits |= pad_buttons::R3;
        }
        if self.l3 {
            bits |= pad_buttons::L3;
        }
        if self.start {
            bits |= pad_buttons::START;
        }
        if self.up {
            bits |= pad_buttons::UP;
        }
        if self.right {
            bits |= pad_buttons::RIGHT;
        }
        if self.down {
            bits |= pad_buttons::DOWN;
        }
        if self.left {
            bits |= pad_buttons::LEFT;
        }
        if self.l2 {
            bits |= pad_buttons::L2;
        }
        if self.r2 {
            bits |= pad_buttons::R2;
        }
        if self.l1 {
            bits |= pad_buttons::L1;
        }
        if self.r1 {
            bits |= pad_buttons::R1;
        }
        if self.b {
            bits |= pad_buttons::B;
        }
        if self.d {
            bits |= pad_buttons::D;
        }
        if self.a {
            bits |= pad_buttons::A;
        }
        if self.c {
            bits |= pad_buttons::C;
        }
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_neutral() {
        let pad = PadState::default();
        assert_eq!(pad.button_bits(), 0);
        assert_eq!(pad.left_stick_h, 0);
        assert_eq!(pad.right_analog, 0);
    }

    #[test]
    fn select_and_r1_only() {
        let pad = PadState { select: true, r1: true, ..PadState::default() };
        assert_eq!(pad.button_bits(), 1 + 2048);
    }

    #[test]
    fn all_buttons_fill_the_word() {
        let pad = PadState {
            select: true,
            start: true,
            up: true,
            right: true,
            down: true,
            left: true,
            l1: true,
            l2: true,
            l3: true,
            r1: true,
            r2: true,
            r3: true,
            a: true,
            b: true,
            c: true,
            d: true,
            ..PadState::default()
        };
        assert_eq!(pad.button_bits(), u16::MAX);
    }

    #[test]
    fn bits_are_disjoint() {
        use pad_buttons::*;
        let all = [SELECT, R3, L3, START, UP, RIGHT, DOWN, LEFT, L2, R2, L1, R1, B, D, A, C];
        let mut seen = 0u16;
        for bit in all {
            assert_eq!(seen & bit, 0, "bit {bit:#06x} overlaps");
            seen |= bit;
        }
        assert_eq!(seen, u16::MAX);
    }
}
