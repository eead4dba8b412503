//! Meridim frame codec.
//!
//! A frame is a fixed-length sequence of 90 unsigned 16-bit words exchanged
//! as a single 180-byte UDP datagram. The final word is a two's-complement
//! checksum chosen so that the 16-bit sum of all 90 words is zero; a
//! datagram of any other length or failing that invariant is rejected. The
//! byte order on the wire is little-endian, fixed by the peer contract.
//!
//! The codec is stateless: every transform here reads and writes only the
//! frame it is given.
//!
//! ## Usage Example
//!
//! ```rust
//! use meridim::{Frame, MasterCommand};
//!
//! let mut frame = Frame::new();
//! frame.set_master_command(MasterCommand::TorqueAllOff);
//! frame.set_acceleration(12, -34, 56);
//! frame.finalize();
//!
//! let bytes = frame.encode();
//! let decoded = Frame::decode(&bytes).expect("checksum holds");
//! assert_eq!(decoded.acceleration(), [12, -34, 56]);
//! ```

use crate::error::{MeridimError, Result};
use crate::types::{MasterCommand, PadState};

/// Number of 16-bit words in a frame.
pub const FRAME_WORDS: usize = 90;

/// Wire size of a frame in bytes.
pub const FRAME_BYTES: usize = FRAME_WORDS * 2;

/// Number of entries in the motion command table (words 20..80).
pub const MOTION_ENTRIES: usize = 30;

/// Number of free-form user data slots (words 80..88).
pub const USER_DATA_SLOTS: usize = 8;

/// Fixed word offsets of the frame layout.
mod offset {
    pub const MASTER_COMMAND: usize = 0;
    pub const SEQUENCE: usize = 1;
    pub const ACCELERATION: usize = 2;
    pub const GYRO: usize = 5;
    pub const MAGNET: usize = 8;
    pub const TEMPERATURE: usize = 11;
    pub const ORIENTATION: usize = 12;
    pub const BUTTONS: usize = 15;
    pub const LEFT_STICK: usize = 16;
    pub const RIGHT_STICK: usize = 17;
    pub const ANALOG_PAIR: usize = 18;
    pub const MOTION_FRAMES: usize = 19;
    pub const MOTION_TABLE: usize = 20;
    pub const USER_DATA: usize = 80;
    pub const ERROR_CODE: usize = 88;
    pub const CHECKSUM: usize = 89;
}

/// Pack two 8-bit values into one word, first in the high byte.
const fn pack_bytes(high: u8, low: u8) -> u16 {
    ((high as u16) << 8) | (low as u16)
}

/// The 90-word Meridim protocol frame.
///
/// Field setters write typed values into their fixed offsets, masking to
/// the field width; they never fail except for index-style inputs
/// ([`Frame::set_motion_entry`], [`Frame::set_user_data`]). Getters
/// reinterpret the stored words, so a decoded peer frame is inspectable
/// with the same surface used to author an outbound one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    words: [u16; FRAME_WORDS],
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    /// Create a zero-filled frame.
    pub const fn new() -> Self {
        Self { words: [0; FRAME_WORDS] }
    }

    /// Construct a frame directly from its 90 words, without checksum
    /// validation. Intended for tests and for rebuilding a frame whose
    /// words were already validated.
    pub const fn from_words(words: [u16; FRAME_WORDS]) -> Self {
        Self { words }
    }

    /// Raw word at `index`. Panics if `index >= 90`; offsets used by the
    /// typed accessors are all in range by construction.
    pub fn word(&self, index: usize) -> u16 {
        self.words[index]
    }

    /// All 90 words in wire order.
    pub fn words(&self) -> &[u16; FRAME_WORDS] {
        &self.words
    }

    // --- field setters -----------------------------------------------------

    /// Set the master command (word 0).
    pub fn set_master_command(&mut self, command: MasterCommand) {
        self.words[offset::MASTER_COMMAND] = command.raw();
    }

    /// Set the sequence number (word 1). Values are masked into the
    /// modulo-60000 range by the link layer before they reach the frame.
    pub fn set_sequence(&mut self, sequence: u16) {
        self.words[offset::SEQUENCE] = sequence;
    }

    /// Set the accelerometer triple (words 2..5).
    pub fn set_acceleration(&mut self, x: i16, y: i16, z: i16) {
        self.set_triple(offset::ACCELERATION, x, y, z);
    }

    /// Set the gyroscope triple (words 5..8).
    pub fn set_gyro(&mut self, x: i16, y: i16, z: i16) {
        self.set_triple(offset::GYRO, x, y, z);
    }

    /// Set the magnetometer triple (words 8..11).
    pub fn set_magnet(&mut self, x: i16, y: i16, z: i16) {
        self.set_triple(offset::MAGNET, x, y, z);
    }

    /// Set the temperature reading (word 11).
    pub fn set_temperature(&mut self, temperature: i16) {
        self.words[offset::TEMPERATURE] = temperature as u16;
    }

    /// Set the orientation estimate (words 12..15).
    pub fn set_orientation(&mut self, roll: i16, pitch: i16, yaw: i16) {
        self.set_triple(offset::ORIENTATION, roll, pitch, yaw);
    }

    /// Pack a controller snapshot into words 15..19: the button bitmask,
    /// both sticks (horizontal axis in the high byte), and the analog
    /// trigger pair (right trigger in the high byte).
    pub fn set_pad(&mut self, pad: &PadState) {
        self.words[offset::BUTTONS] = pad.button_bits();
        self.words[offset::LEFT_STICK] = pack_bytes(pad.left_stick_h as u8, pad.left_stick_v as u8);
        self.words[offset::RIGHT_STICK] =
            pack_bytes(pad.right_stick_h as u8, pad.right_stick_v as u8);
        self.words[offset::ANALOG_PAIR] = pack_bytes(pad.right_analog as u8, pad.left_analog as u8);
    }

    /// Set the motion frame counts (word 19): total frames in the high
    /// byte, stop frames in the low byte.
    pub fn set_motion_frames(&mut self, frames: u8, stop_frames: u8) {
        self.words[offset::MOTION_FRAMES] = pack_bytes(frames, stop_frames);
    }

    /// Write one motion command table entry (two words starting at
    /// `20 + 2 * index`): the packed sub-command pair, then the signed value.
    ///
    /// # Errors
    ///
    /// Returns [`MeridimError::MotionIndex`] when `index >= 30`. An index
    /// out of range is a programming mistake, not a transport fault.
    pub fn set_motion_entry(&mut self, index: usize, cmd_a: u8, cmd_b: u8, value: i16) -> Result<()> {
        if index >= MOTION_ENTRIES {
            return Err(MeridimError::motion_index(index));
        }
        let base = offset::MOTION_TABLE + index * 2;
        self.words[base] = pack_bytes(cmd_a, cmd_b);
        self.words[base + 1] = value as u16;
        Ok(())
    }

    /// Write one user data slot (words 80..88). Returns false without
    /// touching the frame when `index >= 8`; user data indices may come
    /// from loosely validated external input, so an invalid index is a
    /// reported no-op rather than an error.
    pub fn set_user_data(&mut self, index: usize, value: i16) -> bool {
        if index >= USER_DATA_SLOTS {
            return false;
        }
        self.words[offset::USER_DATA + index] = value as u16;
        true
    }

    /// OR `bits` into the error-code word (word 88). Accumulated bits are
    /// never cleared automatically; see [`Frame::clear_error_bits`].
    pub fn set_error_bits(&mut self, bits: u16) {
        self.words[offset::ERROR_CODE] |= bits;
    }

    /// Reset the error-code word to zero.
    pub fn clear_error_bits(&mut self) {
        self.words[offset::ERROR_CODE] = 0;
    }

    fn set_triple(&mut self, base: usize, a: i16, b: i16, c: i16) {
        self.words[base] = a as u16;
        self.words[base + 1] = b as u16;
        self.words[base + 2] = c as u16;
    }

    // --- field getters -----------------------------------------------------

    /// Raw master command word.
    pub fn master_command_raw(&self) -> u16 {
        self.words[offset::MASTER_COMMAND]
    }

    /// Decoded master command, if word 0 holds a known opcode.
    pub fn master_command(&self) -> Option<MasterCommand> {
        MasterCommand::from_raw(self.master_command_raw())
    }

    /// Sequence number (word 1).
    pub fn sequence(&self) -> u16 {
        self.words[offset::SEQUENCE]
    }

    /// Accelerometer triple.
    pub fn acceleration(&self) -> [i16; 3] {
        self.triple(offset::ACCELERATION)
    }

    /// Gyroscope triple.
    pub fn gyro(&self) -> [i16; 3] {
        self.triple(offset::GYRO)
    }

    /// Magnetometer triple.
    pub fn magnet(&self) -> [i16; 3] {
        self.triple(offset::MAGNET)
    }

    /// Temperature reading.
    pub fn temperature(&self) -> i16 {
        self.words[offset::TEMPERATURE] as i16
    }

    /// Orientation estimate (roll, pitch, yaw).
    pub fn orientation(&self) -> [i16; 3] {
        self.triple(offset::ORIENTATION)
    }

    /// Packed button bitmask (word 15).
    pub fn button_bits(&self) -> u16 {
        self.words[offset::BUTTONS]
    }

    /// Left stick axes as (horizontal, vertical).
    pub fn left_stick(&self) -> (i8, i8) {
        Self::unpack_signed(self.words[offset::LEFT_STICK])
    }

    /// Right stick axes as (horizontal, vertical).
    pub fn right_stick(&self) -> (i8, i8) {
        Self::unpack_signed(self.words[offset::RIGHT_STICK])
    }

    /// Analog trigger pair as (right, left), matching the wire packing.
    pub fn analog_pair(&self) -> (i8, i8) {
        Self::unpack_signed(self.words[offset::ANALOG_PAIR])
    }

    /// Motion frame counts as (frames, stop_frames).
    pub fn motion_frames(&self) -> (u8, u8) {
        let word = self.words[offset::MOTION_FRAMES];
        ((word >> 8) as u8, (word & 0xFF) as u8)
    }

    /// Read one motion command table entry as (cmd_a, cmd_b, value).
    ///
    /// # Errors
    ///
    /// Returns [`MeridimError::MotionIndex`] when `index >= 30`.
    pub fn motion_entry(&self, index: usize) -> Result<(u8, u8, i16)> {
        if index >= MOTION_ENTRIES {
            return Err(MeridimError::motion_index(index));
        }
        let base = offset::MOTION_TABLE + index * 2;
        let packed = self.words[base];
        Ok(((packed >> 8) as u8, (packed & 0xFF) as u8, self.words[base + 1] as i16))
    }

    /// Read one user data slot, or `None` when `index >= 8`.
    pub fn user_data(&self, index: usize) -> Option<i16> {
        if index >= USER_DATA_SLOTS {
            return None;
        }
        Some(self.words[offset::USER_DATA + index] as i16)
    }

    /// Accumulated error-code bitmask (word 88).
    pub fn error_bits(&self) -> u16 {
        self.words[offset::ERROR_CODE]
    }

    /// Stored checksum word (word 89).
    pub fn checksum(&self) -> u16 {
        self.words[offset::CHECKSUM]
    }

    fn triple(&self, base: usize) -> [i16; 3] {
        [self.words[base] as i16, self.words[base + 1] as i16, self.words[base + 2] as i16]
    }

    fn unpack_signed(word: u16) -> (i8, i8) {
        ((word >> 8) as u8 as i8, (word & 0xFF) as u8 as i8)
    }

    // --- checksum and wire form ---------------------------------------------

    /// Compute the checksum for words 0..89: the two's complement of their
    /// 16-bit modular sum, so that adding it back closes the sum to zero.
    pub fn compute_checksum(&self) -> u16 {
        let sum = self.words[..offset::CHECKSUM]
            .iter()
            .fold(0u16, |acc, &word| acc.wrapping_add(word));
        sum.wrapping_neg()
    }

    /// Write the checksum into word 89, producing a transmittable frame.
    pub fn finalize(&mut self) {
        self.words[offset::CHECKSUM] = self.compute_checksum();
    }

    /// Modular sum of all 90 words; zero for a valid frame.
    fn word_sum(words: &[u16; FRAME_WORDS]) -> u16 {
        words.iter().fold(0u16, |acc, &word| acc.wrapping_add(word))
    }

    /// Check the checksum invariant over all 90 words.
    pub fn validate(words: &[u16; FRAME_WORDS]) -> bool {
        Self::word_sum(words) == 0
    }

    /// Whether this frame currently satisfies the checksum invariant.
    pub fn is_valid(&self) -> bool {
        Self::validate(&self.words)
    }

    /// Encode the frame into its 180-byte little-endian wire form.
    pub fn encode(&self) -> [u8; FRAME_BYTES] {
        let mut bytes = [0u8; FRAME_BYTES];
        for (chunk, word) in bytes.chunks_exact_mut(2).zip(self.words.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// Decode a received datagram payload.
    ///
    /// # Errors
    ///
    /// - [`MeridimError::LengthMismatch`] when the payload is not exactly
    ///   180 bytes
    /// - [`MeridimError::Checksum`] when the 16-bit sum of the 90 words is
    ///   nonzero
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != FRAME_BYTES {
            return Err(MeridimError::length_mismatch(bytes.len()));
        }
        let mut words = [0u16; FRAME_WORDS];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(2)) {
            *word = u16::from_le_bytes([chunk[0], chunk[1]]);
        }
        let sum = Self::word_sum(&words);
        if sum != 0 {
            return Err(MeridimError::checksum(sum));
        }
        Ok(Self { words })
    }
}
