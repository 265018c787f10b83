//! Point to point transports between the two parties.
//!
//! Transports are blocking, ordered and reliable. Messages carry no sequence number, so both parties
//! must send and receive in the same order.

pub mod channel;
pub mod tcp;

pub use channel::ChannelTransport;
pub use tcp::{RetryPolicy, TcpTransport};

use basic_types::PartyRole;
use encoding::{frame::FrameError, DecodeError, EncodeError};
use math_lib::{RingElement, Tensor};
use std::io;

/// A blocking channel to the peer party.
pub trait Transport {
    /// Sends a tensor to `peer`.
    fn send<T: RingElement>(&mut self, peer: PartyRole, tensor: &Tensor<T>) -> Result<(), TransportError>;

    /// Receives a tensor from `peer` into `tensor`.
    ///
    /// The received tensor must have the same shape as `tensor`, whose elements and scaling factor are
    /// overwritten.
    fn recv<T: RingElement>(&mut self, peer: PartyRole, tensor: &mut Tensor<T>) -> Result<(), TransportError>;
}

/// An error sending or receiving a tensor.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An IO error.
    #[error("io: {0}")]
    Io(#[from] io::Error),

    /// The outgoing tensor couldn't be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The incoming tensor couldn't be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The peer went away.
    #[error("peer disconnected")]
    Disconnected,

    /// A party tried to talk to itself.
    #[error("party {0} cannot address itself")]
    SelfAddressed(PartyRole),

    /// The peer sent a tensor of an unexpected shape.
    #[error("expected a tensor of shape {expected:?}, received {received:?}")]
    ShapeMismatch {
        /// The shape of the receive buffer.
        expected: Vec<usize>,
        /// The shape sent by the peer.
        received: Vec<usize>,
    },
}

impl From<FrameError> for TransportError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => Self::Disconnected,
            FrameError::Io(e) => Self::Io(e),
            e @ FrameError::TooLarge { .. } => Self::Io(io::Error::new(io::ErrorKind::InvalidData, e)),
        }
    }
}

/// Checks that a message is addressed to the other party.
pub(crate) fn check_peer(own: PartyRole, peer: PartyRole) -> Result<(), TransportError> {
    if own == peer {
        Err(TransportError::SelfAddressed(own))
    } else {
        Ok(())
    }
}

/// Moves a received tensor into the receive buffer, checking its shape.
pub(crate) fn deliver<T: RingElement>(received: Tensor<T>, tensor: &mut Tensor<T>) -> Result<(), TransportError> {
    if received.shape() != tensor.shape() {
        return Err(TransportError::ShapeMismatch {
            expected: tensor.shape().to_vec(),
            received: received.shape().to_vec(),
        });
    }
    *tensor = received;
    Ok(())
}
