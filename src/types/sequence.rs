//! Modulo-60000 sequence counter arithmetic

/// Sequence numbers live in `[0, SEQUENCE_MODULUS)` and wrap to 0.
pub const SEQUENCE_MODULUS: u16 = 60000;

const HALF_RANGE: u16 = SEQUENCE_MODULUS / 2;

/// Compare sequence counters with wraparound using the half-range rule.
/// Returns true if `a` is considered fresher than `b`.
///
/// Near the wrap boundary a naive `>` inverts the order (59999 vs 0), so
/// freshness is defined by the modular distance instead: `a` is fresher
/// when stepping forward from `b` reaches `a` in fewer than half the range.
pub fn seq_after(a: u16, b: u16) -> bool {
    if a == b {
        return false;
    }
    // widen before adding the modulus; a + 60000 overflows u16
    let distance = (a as u32 + SEQUENCE_MODULUS as u32 - b as u32) % SEQUENCE_MODULUS as u32;
    distance < HALF_RANGE as u32
}

/// Next outgoing sequence number given the local counter and the last
/// counter observed from the peer.
///
/// Takes whichever of the two counters is fresher under [`seq_after`] and
/// increments it, wrapping 59999 back to 0. Basing the increment on the
/// fresher of the two guarantees the link never transmits a sequence number
/// the peer has already seen, even when the local counter fell behind
/// across a dropped round-trip.
pub fn next_sequence(local: u16, remote: u16) -> u16 {
    let base = if seq_after(remote, local) { remote } else { local };
    if base >= SEQUENCE_MODULUS - 1 { 0 } else { base + 1 }
}
