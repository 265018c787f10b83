//! Secret shared fixed-point tensors.
//!
//! A [`FixedPointTensor`] is one party's additive share of a plaintext tensor whose elements are scaled
//! by `2^N`. The two parties' shares add up to the plaintext modulo `2^BITS`, and each share on its own is
//! uniformly random.
//!
//! Operations never allocate their results: a [`FixedPointTensor`] borrows its share and every operation
//! writes into a caller provided output buffer. Linear operations are local. Multiplications consume a
//! Beaver triplet and one round trip to the peer, so both parties must invoke the same operations on
//! tensors of the same shapes in the same order.
//!
//! Violated preconditions such as mismatched shapes are programming errors and panic. Failures of the
//! transport or the triplet source are returned as [`ProtocolError`].

mod division;
mod exponential;
mod linear;
mod matmul;
mod multiplication;
mod reveal;

#[cfg(test)]
mod test;

use crate::{
    context::PartyContext,
    transport::{Transport, TransportError},
    triplets::TripletError,
};
use math_lib::{RingElement, Tensor};

/// The default number of fractional bits.
pub const DEFAULT_FRACTIONAL_BITS: u32 = 16;

/// An error during an interactive protocol.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The transport failed.
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    /// The triplet source failed.
    #[error("triplets: {0}")]
    Triplet(#[from] TripletError),
}

/// One party's share of a fixed-point tensor with `N` fractional bits.
#[derive(Clone, Copy, Debug)]
pub struct FixedPointTensor<'a, T, const N: u32> {
    share: &'a Tensor<T>,
}

impl<'a, T: RingElement, const N: u32> FixedPointTensor<'a, T, N> {
    /// Wraps this party's share.
    pub fn new(share: &'a Tensor<T>) -> Self {
        Self { share }
    }

    /// This party's share.
    pub fn local_share(&self) -> &'a Tensor<T> {
        self.share
    }

    /// The shape of the shared tensor.
    pub fn shape(&self) -> &'a [usize] {
        self.share.shape()
    }

    /// The number of elements in the shared tensor.
    pub fn numel(&self) -> usize {
        self.share.numel()
    }
}

/// Sends `local` to the peer and receives the peer's tensor of the same shape.
///
/// The primary party sends first and the secondary party receives first, so the exchange completes over
/// transports that block on send as well as on receive.
pub(crate) fn exchange<T, Tr, Tp>(ctx: &mut PartyContext<Tr, Tp>, local: &Tensor<T>) -> Result<Tensor<T>, ProtocolError>
where
    T: RingElement,
    Tr: Transport,
{
    let peer = ctx.peer();
    let mut remote = Tensor::zeros(local.shape());
    if ctx.role().is_primary() {
        ctx.transport_mut().send(peer, local)?;
        ctx.transport_mut().recv(peer, &mut remote)?;
    } else {
        ctx.transport_mut().recv(peer, &mut remote)?;
        ctx.transport_mut().send(peer, local)?;
    }
    Ok(remote)
}
