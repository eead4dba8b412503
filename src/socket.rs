//! Datagram socket abstraction.
//!
//! The transport loop is written against this seam rather than against
//! `tokio::net::UdpSocket` directly, so tests can drive it with an
//! in-memory socket and inject malformed datagrams deterministically.

use std::net::SocketAddr;

use crate::error::{MeridimError, Result};

/// Async datagram I/O as the transport consumes it.
///
/// Implementations are expected to be cancel-safe in `recv_from`: the
/// transport races it against a cancellation token and may drop the future
/// between datagrams.
#[async_trait::async_trait]
pub trait DatagramSocket: Send + Sync + 'static {
    /// Send `payload` to `dest`, returning the number of bytes written.
    async fn send_to(&self, payload: &[u8], dest: SocketAddr) -> Result<usize>;

    /// Wait for the next datagram, filling `buf` and returning the payload
    /// length and the sender's address.
    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)>;

    /// Address this socket is bound to.
    fn local_addr(&self) -> Result<SocketAddr>;
}

#[async_trait::async_trait]
impl DatagramSocket for tokio::net::UdpSocket {
    async fn send_to(&self, payload: &[u8], dest: SocketAddr) -> Result<usize> {
        tokio::net::UdpSocket::send_to(self, payload, dest)
            .await
            .map_err(|e| MeridimError::socket("send_to", e))
    }

    async fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        tokio::net::UdpSocket::recv_from(self, buf)
            .await
            .map_err(|e| MeridimError::socket("recv_from", e))
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        tokio::net::UdpSocket::local_addr(self).map_err(|e| MeridimError::socket("local_addr", e))
    }
}
