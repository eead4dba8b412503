//! Core value types for the Meridim protocol.
//!
//! - [`MasterCommand`] is the closed opcode set for frame word 0
//! - [`PadState`] is an immutable controller snapshot with the wire bit
//!   layout in [`pad_buttons`]
//! - [`seq_after`] and [`next_sequence`] hold the modulo-60000 counter
//!   arithmetic used for freshness arbitration between the two ends of a link

mod master_command;
mod pad;
mod sequence;

pub use master_command::MasterCommand;
pub use pad::{PadState, pad_buttons};
pub use sequence::{SEQUENCE_MODULUS, next_sequence, seq_after};
