//! Link state: the outbound/inbound frame pair and freshness arbitration.
//!
//! A link owns two frames. The outbound frame is authored locally through
//! the field-setter surface and lives for the lifetime of the link; the
//! inbound frame is replaced wholesale each time a validated datagram
//! arrives. Sequence numbers advance independently on both ends, so the
//! next outgoing number is derived from whichever counter is fresher under
//! the modulo-60000 rule, and a peer that has advanced past us takes over
//! the outbound frame entirely (a board-driven session overriding a stale
//! host-authored frame).
//!
//! `LinkState` is plain owned state. The transport wraps it in a mutex so
//! that setter calls and receive-driven adoption never interleave.

use tracing::debug;

use crate::error::Result;
use crate::frame::Frame;
use crate::types::{MasterCommand, PadState, next_sequence, seq_after};

/// Lifecycle phase of a link.
///
/// A link becomes [`LinkPhase::Active`] on its first successful send or
/// receive and stays there; the protocol has no teardown negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPhase {
    /// No frame has been sent or received yet.
    Idle,
    /// The duplex channel is live.
    Active,
}

/// The two frame buffers of one link plus the sequence-merge policy.
#[derive(Debug, Clone)]
pub struct LinkState {
    outbound: Frame,
    inbound: Frame,
    has_received: bool,
    phase: LinkPhase,
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkState {
    /// Create a link with a zero-filled outbound frame.
    pub fn new() -> Self {
        Self {
            outbound: Frame::new(),
            inbound: Frame::new(),
            has_received: false,
            phase: LinkPhase::Idle,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> LinkPhase {
        self.phase
    }

    /// The locally authored frame as it stands (checksum not yet assigned).
    pub fn outbound(&self) -> &Frame {
        &self.outbound
    }

    /// The last validated frame received from the peer, if any.
    pub fn inbound(&self) -> Option<&Frame> {
        self.has_received.then_some(&self.inbound)
    }

    // --- field-setter surface over the outbound frame -----------------------

    /// Set the master command on the outbound frame.
    pub fn set_master_command(&mut self, command: MasterCommand) {
        self.outbound.set_master_command(command);
    }

    /// Set the accelerometer triple on the outbound frame.
    pub fn set_acceleration(&mut self, x: i16, y: i16, z: i16) {
        self.outbound.set_acceleration(x, y, z);
    }

    /// Set the gyroscope triple on the outbound frame.
    pub fn set_gyro(&mut self, x: i16, y: i16, z: i16) {
        self.outbound.set_gyro(x, y, z);
    }

    /// Set the magnetometer triple on the outbound frame.
    pub fn set_magnet(&mut self, x: i16, y: i16, z: i16) {
        self.outbound.set_magnet(x, y, z);
    }

    /// Set the temperature reading on the outbound frame.
    pub fn set_temperature(&mut self, temperature: i16) {
        self.outbound.set_temperature(temperature);
    }

    /// Set the orientation estimate on the outbound frame.
    pub fn set_orientation(&mut self, roll: i16, pitch: i16, yaw: i16) {
        self.outbound.set_orientation(roll, pitch, yaw);
    }

    /// Pack a controller snapshot into the outbound frame.
    pub fn set_pad(&mut self, pad: &PadState) {
        self.outbound.set_pad(pad);
    }

    /// Set the motion frame counts on the outbound frame.
    pub fn set_motion_frames(&mut self, frames: u8, stop_frames: u8) {
        self.outbound.set_motion_frames(frames, stop_frames);
    }

    /// Write one motion command table entry on the outbound frame.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MeridimError::MotionIndex`] when `index >= 30`.
    pub fn set_motion_entry(&mut self, index: usize, cmd_a: u8, cmd_b: u8, value: i16) -> Result<()> {
        self.outbound.set_motion_entry(index, cmd_a, cmd_b, value)
    }

    /// Write one user data slot on the outbound frame; false when
    /// `index >= 8` (no-op).
    pub fn set_user_data(&mut self, index: usize, value: i16) -> bool {
        self.outbound.set_user_data(index, value)
    }

    /// OR error bits into the outbound frame's error word.
    pub fn error_code_set(&mut self, bits: u16) {
        self.outbound.set_error_bits(bits);
    }

    /// Clear the outbound frame's error word.
    pub fn error_code_clear(&mut self) {
        self.outbound.clear_error_bits();
    }

    // --- freshness arbitration ----------------------------------------------

    /// Record a validated frame from the peer.
    ///
    /// The inbound buffer is replaced unconditionally. If the peer's
    /// sequence number is fresher than the outbound one, the outbound frame
    /// becomes a copy of the peer's: the side that advanced further is
    /// authoritative for the next transmission. Returns whether that
    /// adoption happened.
    pub fn on_receive(&mut self, frame: Frame) -> bool {
        self.inbound = frame;
        self.has_received = true;
        self.phase = LinkPhase::Active;

        let adopted = seq_after(frame.sequence(), self.outbound.sequence());
        if adopted {
            debug!(
                inbound_seq = frame.sequence(),
                outbound_seq = self.outbound.sequence(),
                "peer frame is fresher, adopting it as outbound"
            );
            self.outbound = frame;
        }
        adopted
    }

    /// Assign the next sequence number, finalize the checksum, and return
    /// the frame to transmit. The assigned sequence and checksum persist in
    /// the outbound buffer so subsequent sends keep advancing from it.
    ///
    /// Preparing a frame does not activate the link; the transition to
    /// [`LinkPhase::Active`] happens on the first successful send
    /// ([`LinkState::mark_active`], called by the transport once the write
    /// went out) or on the first validated receive.
    pub fn prepare_send(&mut self) -> Frame {
        let local = self.outbound.sequence();
        let remote = if self.has_received { self.inbound.sequence() } else { local };
        self.outbound.set_sequence(next_sequence(local, remote));
        self.outbound.finalize();
        self.outbound
    }

    /// Record a successful send, activating the link.
    pub fn mark_active(&mut self) {
        self.phase = LinkPhase::Active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer_frame(sequence: u16) -> Frame {
        let mut frame = Frame::new();
        frame.set_sequence(sequence);
        frame.set_temperature(21);
        frame.finalize();
        frame
    }

    #[test]
    fn starts_idle_with_zeroed_outbound() {
        let link = LinkState::new();
        assert_eq!(link.phase(), LinkPhase::Idle);
        assert_eq!(link.outbound().sequence(), 0);
        assert!(link.inbound().is_none());
    }

    #[test]
    fn prepare_send_increments_and_persists() {
        let mut link = LinkState::new();
        let first = link.prepare_send();
        assert_eq!(first.sequence(), 1);
        assert!(first.is_valid());

        let second = link.prepare_send();
        assert_eq!(second.sequence(), 2);
    }

    #[test]
    fn activation_waits_for_a_confirmed_send() {
        let mut link = LinkState::new();
        // preparing a frame is not a successful send yet
        link.prepare_send();
        assert_eq!(link.phase(), LinkPhase::Idle);

        link.mark_active();
        assert_eq!(link.phase(), LinkPhase::Active);
    }

    #[test]
    fn fresher_peer_frame_is_adopted() {
        let mut link = LinkState::new();
        link.set_temperature(-5);
        link.prepare_send(); // outbound at seq 1

        assert!(link.on_receive(peer_frame(100)));

        // outbound is now the peer's frame, including its payload
        assert_eq!(link.outbound().sequence(), 100);
        assert_eq!(link.outbound().temperature(), 21);

        // and the next send advances from the adopted counter
        let sent = link.prepare_send();
        assert_eq!(sent.sequence(), 101);
    }

    #[test]
    fn stale_peer_frame_only_updates_inbound() {
        let mut link = LinkState::new();
        link.set_temperature(-5);
        for _ in 0..10 {
            link.prepare_send();
        }
        assert_eq!(link.outbound().sequence(), 10);

        assert!(!link.on_receive(peer_frame(4)));
        assert_eq!(link.outbound().sequence(), 10);
        assert_eq!(link.outbound().temperature(), -5);
        assert_eq!(link.inbound().map(Frame::sequence), Some(4));

        // stale remote counter does not slow the outbound one down
        assert_eq!(link.prepare_send().sequence(), 11);
    }

    #[test]
    fn adoption_across_the_wrap_boundary() {
        let mut link = LinkState::new();
        // walk the outbound counter up to just below the wrap; each hop
        // stays within the half-range freshness window
        assert!(link.on_receive(peer_frame(29_000)));
        assert!(link.on_receive(peer_frame(57_000)));
        assert!(link.on_receive(peer_frame(59_998)));
        assert_eq!(link.prepare_send().sequence(), 59_999);

        // peer wrapped already; 2 is fresher than 59999
        assert!(link.on_receive(peer_frame(2)));
        assert_eq!(link.prepare_send().sequence(), 3);
    }

    #[test]
    fn receive_alone_activates_the_link() {
        let mut link = LinkState::new();
        link.on_receive(peer_frame(1));
        assert_eq!(link.phase(), LinkPhase::Active);
    }

    #[test]
    fn error_word_accumulates_through_the_link() {
        let mut link = LinkState::new();
        link.error_code_set(0x0001);
        link.error_code_set(0x0040);
        assert_eq!(link.outbound().error_bits(), 0x0041);
        link.error_code_clear();
        assert_eq!(link.outbound().error_bits(), 0);
    }

    #[test]
    fn setter_surface_reaches_the_outbound_frame() {
        let mut link = LinkState::new();
        link.set_master_command(MasterCommand::ResetMrdTimer);
        link.set_acceleration(1, 2, 3);
        link.set_motion_frames(8, 2);
        assert!(link.set_user_data(3, -7));
        assert!(!link.set_user_data(8, -7));
        link.set_motion_entry(5, 9, 10, -11).expect("index 5 in range");
        assert!(link.set_motion_entry(30, 0, 0, 0).is_err());

        let out = link.outbound();
        assert_eq!(out.master_command(), Some(MasterCommand::ResetMrdTimer));
        assert_eq!(out.acceleration(), [1, 2, 3]);
        assert_eq!(out.motion_frames(), (8, 2));
        assert_eq!(out.user_data(3), Some(-7));
        assert_eq!(out.motion_entry(5).expect("in range"), (9, 10, -11));
    }
}
