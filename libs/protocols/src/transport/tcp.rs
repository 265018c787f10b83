//! TCP transport.

use super::{check_peer, deliver, Transport, TransportError};
use basic_types::PartyRole;
use encoding::{
    frame::{read_frame, write_frame},
    TensorCodec,
};
use math_lib::{RingElement, Tensor};
use std::{
    io::{BufReader, BufWriter},
    net::{SocketAddr, TcpListener, TcpStream},
    thread,
    time::Duration,
};
use tracing::{debug, info, trace, warn};

/// How the connecting party retries while its peer isn't listening yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// The number of attempts after the first one.
    pub retries: u32,

    /// The delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { retries: 10, delay: Duration::from_millis(500) }
    }
}

/// A transport over a single TCP connection.
///
/// The primary party listens and the secondary party connects.
pub struct TcpTransport {
    role: PartyRole,
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    codec: TensorCodec,
}

impl TcpTransport {
    /// Listens on `address` and accepts a single connection from the peer.
    pub fn listen(role: PartyRole, address: SocketAddr) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(address)?;
        info!("{role} listening on {}", listener.local_addr()?);
        Self::accept(role, &listener)
    }

    /// Accepts a single connection on an already bound listener.
    pub fn accept(role: PartyRole, listener: &TcpListener) -> Result<Self, TransportError> {
        let (stream, peer_address) = listener.accept()?;
        info!("{role} accepted peer connection from {peer_address}");
        Self::from_stream(role, stream)
    }

    /// Connects to the peer listening on `address`.
    pub fn connect(role: PartyRole, address: SocketAddr, retry: RetryPolicy) -> Result<Self, TransportError> {
        let mut attempt = 0;
        loop {
            match TcpStream::connect(address) {
                Ok(stream) => {
                    info!("{role} connected to peer at {address}");
                    return Self::from_stream(role, stream);
                }
                Err(e) if attempt < retry.retries => {
                    attempt += 1;
                    warn!("{role} failed to connect to {address} (attempt {attempt}): {e}");
                    thread::sleep(retry.delay);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Sets the maximum time a receive blocks before failing, `None` blocks forever.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), TransportError> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        Ok(())
    }

    fn from_stream(role: PartyRole, stream: TcpStream) -> Result<Self, TransportError> {
        stream.set_nodelay(true)?;
        let reader = BufReader::new(stream.try_clone()?);
        let writer = BufWriter::new(stream);
        Ok(Self { role, reader, writer, codec: TensorCodec })
    }
}

impl Transport for TcpTransport {
    fn send<T: RingElement>(&mut self, peer: PartyRole, tensor: &Tensor<T>) -> Result<(), TransportError> {
        check_peer(self.role, peer)?;
        let message = self.codec.encode(tensor)?;
        trace!("{} sending {} bytes to {peer}", self.role, message.len());
        write_frame(&mut self.writer, &message)?;
        Ok(())
    }

    fn recv<T: RingElement>(&mut self, peer: PartyRole, tensor: &mut Tensor<T>) -> Result<(), TransportError> {
        check_peer(self.role, peer)?;
        let limit = TensorCodec::encoded_size::<T>(tensor.shape());
        let message = read_frame(&mut self.reader, limit)
            .inspect_err(|e| debug!("{} failed to read frame from {peer}: {e}", self.role))?;
        trace!("{} received {} bytes from {peer}", self.role, message.len());
        deliver(self.codec.decode(&message)?, tensor)
    }
}
