//! Sharing and revealing.

use super::{FixedPointTensor, ProtocolError};
use crate::{
    context::{PartyContext, Seed},
    transport::Transport,
};
use basic_types::PartyRole;
use math_lib::{RingElement, Tensor};
use tracing::debug;

impl<'a, T: RingElement, const N: u32> FixedPointTensor<'a, T, N> {
    /// Splits a plaintext tensor into two additive shares.
    ///
    /// The first share is drawn from the context's private stream reseeded with `seed`, or with a fresh
    /// seed from the operating system if `seed` is [`Seed::ZERO`]. The second share is the plaintext minus
    /// the first one. Nothing is sent: the owner hands the shares out. With a pre-agreed non-zero seed the
    /// peer can instead derive the first share itself, see [`FixedPointTensor::share_from_seed`].
    ///
    /// Both shares take the plaintext's scaling factor.
    pub fn share<Tr, Tp>(
        ctx: &mut PartyContext<Tr, Tp>,
        plaintext: &Tensor<T>,
        shares: [&mut Tensor<T>; 2],
        seed: Seed,
    ) {
        let [share0, share1] = shares;
        assert_eq!(share0.shape(), plaintext.shape(), "share: first output shape mismatch");
        let seed = if seed.is_zero() { Seed::from_entropy() } else { seed };
        ctx.set_random_seed(seed);
        ctx.gen_random_private(share0);
        share0.set_scaling_factor(plaintext.scaling_factor());
        plaintext.sub(share0, share1);
        debug!("{} shared {} elements", ctx.role(), plaintext.numel());
    }

    /// Derives the first share of a tensor shared by the peer with [`FixedPointTensor::share`] and the
    /// pre-agreed `seed`.
    ///
    /// The output takes scaling factor `N`.
    pub fn share_from_seed<Tr, Tp>(ctx: &mut PartyContext<Tr, Tp>, seed: Seed, out: &mut Tensor<T>) {
        assert!(!seed.is_zero(), "share_from_seed: the zero seed can't be reproduced by the peer");
        ctx.set_random_seed(seed);
        ctx.gen_random_private(out);
        out.set_scaling_factor(N);
    }

    /// Reveals the plaintext to `target`.
    ///
    /// If this party is `target` the peer's share is received and the plaintext is written to `out`, with
    /// scaling factor `N`. Otherwise this party's share is sent and `out` is left untouched.
    pub fn reveal_to_one<Tr, Tp>(
        &self,
        ctx: &mut PartyContext<Tr, Tp>,
        target: PartyRole,
        out: &mut Tensor<T>,
    ) -> Result<(), ProtocolError>
    where
        Tr: Transport,
    {
        let peer = ctx.peer();
        if ctx.role() == target {
            let mut remote = Tensor::zeros(self.shape());
            ctx.transport_mut().recv(peer, &mut remote)?;
            self.share.add(&remote, out);
            out.set_scaling_factor(N);
            debug!("{target} revealed {} elements", self.numel());
        } else {
            ctx.transport_mut().send(peer, self.share)?;
        }
        Ok(())
    }

    /// Reveals the plaintext to both parties, first to the primary then to the secondary party.
    pub fn reveal<Tr, Tp>(&self, ctx: &mut PartyContext<Tr, Tp>, out: &mut Tensor<T>) -> Result<(), ProtocolError>
    where
        Tr: Transport,
    {
        for target in PartyRole::ALL {
            self.reveal_to_one(ctx, target, out)?;
        }
        Ok(())
    }
}
