//! Exponential approximation.

use super::{multiplication::multiply_shares, FixedPointTensor, ProtocolError};
use crate::{context::PartyContext, transport::Transport, triplets::TripletSource};
use math_lib::{RingElement, Tensor};
use tracing::debug;

impl<'a, T: RingElement, const N: u32> FixedPointTensor<'a, T, N> {
    /// Writes a share of an approximation of `e^self` into `out`.
    ///
    /// This computes `(1 + x / 2^iterations)^(2^iterations)` by scaling locally and then squaring
    /// `iterations` times, each squaring being one secure multiplication. The approximation improves with
    /// `iterations` for inputs of small magnitude, but every squaring also roughly doubles the truncation
    /// error accumulated so far.
    ///
    /// Each squaring is subject to the magnitude limit documented on [`FixedPointTensor::mul`], so the
    /// intermediate powers and the result must stay well below `2^15` over `i64` with `N = 16`.
    ///
    /// # Panics
    ///
    /// If `iterations` is larger than `N`.
    pub fn exp<Tr, Tp>(
        &self,
        ctx: &mut PartyContext<Tr, Tp>,
        iterations: u32,
        out: &mut Tensor<T>,
    ) -> Result<(), ProtocolError>
    where
        Tr: Transport,
        Tp: TripletSource,
    {
        assert!(iterations <= N, "exp: {iterations} iterations exceed the {N} fractional bits");
        debug!("{} computing exp with {iterations} iterations", ctx.role());
        let shape = self.shape();
        let scale = Tensor::filled(shape, T::one().unsigned_shl(N - iterations)).with_scaling_factor(N);
        let one = Tensor::filled(shape, T::one().unsigned_shl(N)).with_scaling_factor(N);

        let mut staged = Tensor::zeros(shape);
        self.mul_public(ctx, &scale, &mut staged);
        FixedPointTensor::<T, N>::new(&staged).add_public(ctx, &one, out);
        for _ in 0..iterations {
            out.copy_into(&mut staged);
            multiply_shares::<T, Tr, Tp, N>(ctx, &staged, &staged, out)?;
        }
        Ok(())
    }
}
