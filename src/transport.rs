//! Transport loop: datagram I/O lifecycle over a [`DatagramSocket`].
//!
//! A [`Transport`] owns the socket, the shared [`LinkState`] behind a
//! mutex, and one cancellable receive loop. Outbound sends are issued on
//! demand through [`Transport::send_once`]; the receive loop runs as a
//! spawned task that decodes arriving datagrams, feeds the link state, and
//! publishes validated frames on a watch channel. Malformed datagrams
//! (wrong length, bad checksum) are dropped where they arrive — recovery is
//! the peer's next scheduled transmission, never a retry from this layer.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use futures::{Stream, StreamExt};

use crate::error::{MeridimError, Result};
use crate::frame::Frame;
use crate::link::{LinkPhase, LinkState};
use crate::socket::DatagramSocket;

/// Default port a board listens on (host sends here).
pub const BOARD_PORT: u16 = 22224;

/// Default port a host listens on (board sends here).
pub const HOST_PORT: u16 = 22222;

/// Receive buffer size; anything longer than a frame is a discard, so the
/// buffer only needs enough headroom to tell "too long" from "exact".
const RECV_BUF_LEN: usize = 512;

/// Consecutive socket errors tolerated before the receive loop gives up.
const MAX_SOCKET_ERRORS: u32 = 10;

/// One Meridim link over a datagram socket.
///
/// ## Usage Example
///
/// ```rust,no_run
/// use meridim::{Meridim, MasterCommand};
/// use std::net::SocketAddr;
///
/// #[tokio::main]
/// async fn main() -> meridim::Result<()> {
///     let transport = Meridim::bind("0.0.0.0:22222".parse().unwrap()).await?;
///     transport.start()?;
///
///     transport.with_link(|link| link.set_master_command(MasterCommand::TorqueAllOff));
///     let board: SocketAddr = "192.168.1.42:22224".parse().unwrap();
///     let sent = transport.send_once(board).await?;
///     println!("sent frame #{}", sent.sequence());
///
///     transport.stop();
///     Ok(())
/// }
/// ```
pub struct Transport<S: DatagramSocket> {
    socket: Arc<S>,
    state: Arc<Mutex<LinkState>>,
    // token for the current receive-loop run; replaced on each start()
    cancel: Mutex<CancellationToken>,
    // true while a receive loop is running; cleared by the loop on exit
    receiving: Arc<AtomicBool>,
    inbound_tx: watch::Sender<Option<Frame>>,
    // keeps the watch channel alive even with no subscribers
    inbound_rx: watch::Receiver<Option<Frame>>,
}

impl Transport<tokio::net::UdpSocket> {
    /// Bind a UDP socket and wrap it in a transport.
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = tokio::net::UdpSocket::bind(addr)
            .await
            .map_err(|e| MeridimError::socket("bind", e))?;
        info!(%addr, "bound Meridim UDP transport");
        Ok(Self::new(socket))
    }
}

impl<S: DatagramSocket> Transport<S> {
    /// Create a transport over an already-constructed socket.
    pub fn new(socket: S) -> Self {
        let (inbound_tx, inbound_rx) = watch::channel(None);
        Self {
            socket: Arc::new(socket),
            state: Arc::new(Mutex::new(LinkState::new())),
            cancel: Mutex::new(CancellationToken::new()),
            receiving: Arc::new(AtomicBool::new(false)),
            inbound_tx,
            inbound_rx,
        }
    }

    /// Run a closure against the link state under the lock.
    ///
    /// This is the mutual-exclusion boundary between the caller's field
    /// setters and the receive loop's adoption rule; keep the closure short
    /// and never await inside it.
    pub fn with_link<R>(&self, f: impl FnOnce(&mut LinkState) -> R) -> R {
        f(&mut self.lock_state())
    }

    /// Current link phase.
    pub fn phase(&self) -> LinkPhase {
        self.lock_state().phase()
    }

    /// Copy of the last validated frame received from the peer, if any.
    pub fn latest_inbound(&self) -> Option<Frame> {
        self.lock_state().inbound().copied()
    }

    /// Address the underlying socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Assign the next sequence number, finalize the checksum, and transmit
    /// the outbound frame to `dest`. Returns the frame actually sent.
    /// Never waits for a reply.
    pub async fn send_once(&self, dest: SocketAddr) -> Result<Frame> {
        // sequence assignment + finalize happen atomically under the lock;
        // only the actual socket write awaits
        let frame = self.lock_state().prepare_send();
        self.socket.send_to(&frame.encode(), dest).await?;
        // the link activates on the first send that actually went out
        self.lock_state().mark_active();
        trace!(seq = frame.sequence(), %dest, "sent frame");
        Ok(frame)
    }

    /// Spawn the receive loop.
    ///
    /// At most one loop runs per transport; it runs until
    /// [`Transport::stop`] is called or the socket fails
    /// [`MAX_SOCKET_ERRORS`] times in a row. Once the previous loop has
    /// exited, the transport can be started again.
    ///
    /// # Errors
    ///
    /// Returns [`MeridimError::ReceiverRunning`] while a loop is running,
    /// including the window between [`Transport::stop`] and the loop
    /// observing the cancellation.
    pub fn start(&self) -> Result<()> {
        if self.receiving.swap(true, Ordering::SeqCst) {
            return Err(MeridimError::ReceiverRunning);
        }

        // fresh token per run so a restart is not born cancelled
        let cancel = CancellationToken::new();
        *self.lock_cancel() = cancel.clone();

        let socket = Arc::clone(&self.socket);
        let state = Arc::clone(&self.state);
        let inbound_tx = self.inbound_tx.clone();
        let receiving = Arc::clone(&self.receiving);

        tokio::spawn(async move {
            Self::receive_loop(socket, state, cancel, inbound_tx).await;
            receiving.store(false, Ordering::SeqCst);
        });
        Ok(())
    }

    /// Request the receive loop to exit after its current wait. Idempotent;
    /// harmless when no loop is running.
    pub fn stop(&self) {
        self.lock_cancel().cancel();
    }

    /// Stream of validated inbound frames.
    ///
    /// Subscribing is cheap and can be done repeatedly; each subscriber
    /// observes frames accepted after it subscribed (watch semantics:
    /// latest-wins, no backlog).
    pub fn subscribe(&self) -> impl Stream<Item = Frame> + Send + 'static {
        WatchStream::new(self.inbound_rx.clone()).filter_map(|opt| async move { opt })
    }

    /// Receive loop task: decode datagrams, feed the link state, publish.
    async fn receive_loop(
        socket: Arc<S>,
        state: Arc<Mutex<LinkState>>,
        cancel: CancellationToken,
        inbound_tx: watch::Sender<Option<Frame>>,
    ) {
        info!("receive loop started");
        let mut buf = [0u8; RECV_BUF_LEN];
        let mut accepted = 0u64;
        let mut discarded = 0u64;
        let mut socket_errors = 0u32;

        loop {
            // suspension happens only here, at the wait for the next
            // datagram; decode and state mutation below never await
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("receive loop cancelled");
                    break;
                }
                result = socket.recv_from(&mut buf) => result,
            };

            let (len, peer) = match result {
                Ok(received) => {
                    socket_errors = 0;
                    received
                }
                Err(e) => {
                    socket_errors += 1;
                    error!("socket error ({}/{}): {}", socket_errors, MAX_SOCKET_ERRORS, e);
                    if socket_errors >= MAX_SOCKET_ERRORS {
                        error!("too many socket errors, stopping receive loop");
                        break;
                    }
                    // 50ms, 100ms, 200ms, ...
                    let backoff =
                        std::time::Duration::from_millis(50 * (1 << socket_errors.min(5)));
                    tokio::time::sleep(backoff).await;
                    continue;
                }
            };

            let frame = match Frame::decode(&buf[..len]) {
                Ok(frame) => frame,
                Err(e) => {
                    discarded += 1;
                    debug!(%peer, len, discarded, "discarding datagram: {}", e);
                    continue;
                }
            };

            accepted += 1;
            let adopted = {
                let mut link = state.lock().unwrap_or_else(PoisonError::into_inner);
                link.on_receive(frame)
            };
            trace!(seq = frame.sequence(), %peer, accepted, adopted, "accepted frame");

            if inbound_tx.send(Some(frame)).is_err() {
                debug!("all inbound receivers dropped, stopping receive loop");
                break;
            }
        }

        info!("receive loop ended (accepted {}, discarded {})", accepted, discarded);
    }

    fn lock_state(&self) -> MutexGuard<'_, LinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_cancel(&self) -> MutexGuard<'_, CancellationToken> {
        self.cancel.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: DatagramSocket> Drop for Transport<S> {
    fn drop(&mut self) {
        debug!("dropping transport");
        self.lock_cancel().cancel();
    }
}
