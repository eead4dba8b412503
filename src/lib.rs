//! Async Rust implementation of the Meridim frame protocol.
//!
//! Meridim exchanges control and telemetry between a host controller and a
//! remote servo/sensor board as fixed-length 90-word datagrams over UDP.
//! This crate provides the bit-exact frame codec, the stateful link that
//! arbitrates between locally authored and peer-received frames, and a
//! cancellable transport loop over tokio UDP sockets.
//!
//! # Features
//!
//! - **Bit-exact codec**: 180-byte little-endian wire form with a
//!   two's-complement checksum over all 90 words
//! - **Freshness arbitration**: modulo-60000 sequence counters merged with
//!   half-range wraparound comparison, so whichever end advanced further
//!   drives the next transmission
//! - **Fault tolerance**: truncated or corrupt datagrams are dropped where
//!   they arrive and never escalate
//! - **Cancellable I/O**: one receive loop per link, stopped through a
//!   cancellation token rather than an unbounded blocking read
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use meridim::{Meridim, MasterCommand, PadState};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> meridim::Result<()> {
//!     let transport = Meridim::bind("0.0.0.0:22222".parse().unwrap()).await?;
//!     transport.start()?;
//!
//!     let pad = PadState { select: true, ..PadState::default() };
//!     transport.with_link(|link| {
//!         link.set_master_command(MasterCommand::BoardTransmitPassive);
//!         link.set_pad(&pad);
//!     });
//!     transport.send_once("192.168.1.42:22224".parse().unwrap()).await?;
//!
//!     let mut frames = Box::pin(transport.subscribe());
//!     while let Some(frame) = frames.next().await {
//!         println!("board error bits: {:#06x}", frame.error_bits());
//!     }
//!     Ok(())
//! }
//! ```

mod error;
pub mod frame;
pub mod link;
pub mod socket;
pub mod transport;
pub mod types;

// Core exports
pub use error::{MeridimError, Result};
pub use frame::{FRAME_BYTES, FRAME_WORDS, Frame, MOTION_ENTRIES, USER_DATA_SLOTS};
pub use link::{LinkPhase, LinkState};
pub use socket::DatagramSocket;
pub use transport::{BOARD_PORT, HOST_PORT, Transport};
pub use types::{MasterCommand, PadState, SEQUENCE_MODULUS, next_sequence, pad_buttons, seq_after};

/// Unified entry point for Meridim links.
///
/// A thin factory over [`Transport`]; construct a transport directly via
/// [`Transport::new`] when driving it with a custom [`DatagramSocket`].
///
/// # Examples
///
/// ```rust,no_run
/// use meridim::Meridim;
///
/// #[tokio::main]
/// async fn main() -> meridim::Result<()> {
///     let transport = Meridim::bind("0.0.0.0:22222".parse().unwrap()).await?;
///     transport.start()?;
///     // drive the link...
///     transport.stop();
///     Ok(())
/// }
/// ```
pub struct Meridim;

impl Meridim {
    /// Bind a UDP socket and return a transport ready to send and receive.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn bind(addr: std::net::SocketAddr) -> Result<Transport<tokio::net::UdpSocket>> {
        Transport::bind(addr).await
    }
}
