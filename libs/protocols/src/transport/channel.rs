//! In-process transport.

use super::{check_peer, deliver, Transport, TransportError};
use basic_types::PartyRole;
use encoding::TensorCodec;
use math_lib::{RingElement, Tensor};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::trace;

/// One endpoint of a pair of in-process channels.
///
/// Tensors travel encoded, exactly as they would over a socket.
pub struct ChannelTransport {
    role: PartyRole,
    sender: UnboundedSender<Vec<u8>>,
    receiver: UnboundedReceiver<Vec<u8>>,
    codec: TensorCodec,
}

impl ChannelTransport {
    /// Constructs two connected endpoints, for the primary and the secondary party respectively.
    ///
    /// Receiving blocks the calling thread, so endpoints must not be used from within an async runtime.
    pub fn pair() -> (ChannelTransport, ChannelTransport) {
        let (primary_sender, secondary_receiver) = unbounded_channel();
        let (secondary_sender, primary_receiver) = unbounded_channel();
        let codec = TensorCodec;
        let primary =
            ChannelTransport { role: PartyRole::Primary, sender: primary_sender, receiver: primary_receiver, codec };
        let secondary = ChannelTransport {
            role: PartyRole::Secondary,
            sender: secondary_sender,
            receiver: secondary_receiver,
            codec,
        };
        (primary, secondary)
    }

    /// The role this endpoint belongs to.
    pub fn role(&self) -> PartyRole {
        self.role
    }
}

impl Transport for ChannelTransport {
    fn send<T: RingElement>(&mut self, peer: PartyRole, tensor: &Tensor<T>) -> Result<(), TransportError> {
        check_peer(self.role, peer)?;
        let message = self.codec.encode(tensor)?;
        trace!("{} sending {} bytes to {peer}", self.role, message.len());
        self.sender.send(message).map_err(|_| TransportError::Disconnected)
    }

    fn recv<T: RingElement>(&mut self, peer: PartyRole, tensor: &mut Tensor<T>) -> Result<(), TransportError> {
        check_peer(self.role, peer)?;
        let message = self.receiver.blocking_recv().ok_or(TransportError::Disconnected)?;
        trace!("{} received {} bytes from {peer}", self.role, message.len());
        deliver(self.codec.decode(&message)?, tensor)
    }
}
