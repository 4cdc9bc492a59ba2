//! One-shot network exchanges with a single name server
//!
//! Every attempt opens a fresh socket, sends one encoded message, reads one
//! response and closes. There is no connection reuse; the failover
//! controller retries elsewhere on failure.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use derive_more::{Display, Error, From};

use crate::dns::protocol::Proto;

#[derive(Debug, Display, From, Error)]
pub enum TransportError {
    Io(std::io::Error),
    Timeout,
    UnresolvedServer,
}

type Result<T> = std::result::Result<T, TransportError>;

/// Read timeouts surface as `WouldBlock` or `TimedOut` depending on
/// platform; fold both into the typed timeout error.
fn map_io(e: std::io::Error) -> TransportError {
    match e.kind() {
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => TransportError::Timeout,
        _ => TransportError::Io(e),
    }
}

/// The seam between the failover controller and the network. Implemented
/// for real sockets below and by stubs in tests.
pub trait Exchange: Send + Sync {
    fn exchange(
        &self,
        server: &str,
        port: u16,
        proto: Proto,
        message: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>>;
}

/// Socket-backed transport for both UDP and TCP.
pub struct NetTransport;

impl Exchange for NetTransport {
    fn exchange(
        &self,
        server: &str,
        port: u16,
        proto: Proto,
        message: &[u8],
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        match proto {
            Proto::Udp => exchange_udp(server, port, message, timeout),
            Proto::Tcp => exchange_tcp(server, port, message, timeout),
        }
    }
}

/// Send one datagram and wait for a single reply.
pub fn exchange_udp(server: &str, port: u16, message: &[u8], timeout: Duration) -> Result<Vec<u8>> {
    let socket = UdpSocket::bind(("0.0.0.0", 0))?;
    socket.set_read_timeout(Some(timeout))?;

    socket.send_to(message, (server, port))?;

    let mut res_buffer = [0u8; 4096];
    let (len, _) = socket.recv_from(&mut res_buffer).map_err(map_io)?;

    Ok(res_buffer[..len].to_vec())
}

/// Connect, write the framed message, perform a single read and close.
pub fn exchange_tcp(server: &str, port: u16, message: &[u8], timeout: Duration) -> Result<Vec<u8>> {
    let addr = (server, port)
        .to_socket_addrs()?
        .next()
        .ok_or(TransportError::UnresolvedServer)?;

    let mut stream = TcpStream::connect_timeout(&addr, timeout).map_err(map_io)?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;

    stream.write_all(message).map_err(map_io)?;
    stream.flush().map_err(map_io)?;

    let mut res_buffer = [0u8; 4096];
    let len = stream.read(&mut res_buffer).map_err(map_io)?;

    Ok(res_buffer[..len].to_vec())
}
