//! Secure multiplication using Beaver triplets.
//!
//! Given shares of `x`, `y` and a triplet `(a, b, c = a ⊙ b)`, the parties open the masked values
//! `e = x - a` and `f = y - b`. Since `x ⊙ y = e ⊙ f + e ⊙ b + f ⊙ a + c`, each party computes its share
//! of the product locally as `f ⊙ a + e ⊙ b + c`, with the primary party also adding the public `e ⊙ f`.
//!
//! The product carries `2N` fractional bits. It is accumulated in the ring and truncated by `N` bits once,
//! after every term has been added, using the share truncation rule in [`math_lib::truncation`].

use super::{exchange, FixedPointTensor, ProtocolError};
use crate::{context::PartyContext, transport::Transport, triplets::TripletSource};
use math_lib::{ProductAccumulator, RingElement, Tensor};
use tracing::debug;

impl<'a, T: RingElement, const N: u32> FixedPointTensor<'a, T, N> {
    /// Writes a share of `self ⊙ rhs` into `out`.
    ///
    /// Consumes one triplet of shape `[3, ...shape]` and one round trip.
    ///
    /// # Magnitude limit
    ///
    /// The truncated value is the raw product `v = x * y * 2^2N`, which must satisfy `|v| < 2^(BITS - 2)`.
    /// Within that range each element is off by at most one unit in the last place, except with
    /// probability `|v| / 2^BITS` when the plaintext is off by `2^(BITS - 2N)` instead. Over `i64` with
    /// `N = 16` that is about one element in 4300 for products of magnitude `10^6`, and products of
    /// magnitude `2^30` and beyond are not representable.
    pub fn mul<Tr, Tp>(
        &self,
        ctx: &mut PartyContext<Tr, Tp>,
        rhs: &FixedPointTensor<'_, T, N>,
        out: &mut Tensor<T>,
    ) -> Result<(), ProtocolError>
    where
        Tr: Transport,
        Tp: TripletSource,
    {
        self.check_shape(rhs.shape(), "mul");
        multiply_shares::<T, Tr, Tp, N>(ctx, self.share, rhs.share, out)
    }

    /// Writes a share of `self ⊙ rhs` into `out`, where `rhs` is a public fixed-point tensor.
    ///
    /// This is local: each party scales its own share and truncates it. The magnitude
    /// limit documented on [`FixedPointTensor::mul`] applies.
    pub fn mul_public<Tr, Tp>(&self, ctx: &PartyContext<Tr, Tp>, rhs: &Tensor<T>, out: &mut Tensor<T>) {
        self.check_shape(rhs.shape(), "mul_public");
        let mut product = ProductAccumulator::zeros(self.shape());
        product.mul_accumulate(self.share, rhs);
        product.truncate_into(N, ctx.role(), out);
    }
}

/// Runs the multiplication protocol over two raw shares of the same shape.
pub(crate) fn multiply_shares<T, Tr, Tp, const N: u32>(
    ctx: &mut PartyContext<Tr, Tp>,
    lhs: &Tensor<T>,
    rhs: &Tensor<T>,
    out: &mut Tensor<T>,
) -> Result<(), ProtocolError>
where
    T: RingElement,
    Tr: Transport,
    Tp: TripletSource,
{
    let shape = lhs.shape();
    assert_eq!(shape, rhs.shape(), "mul: operand shape mismatch");
    assert_eq!(shape, out.shape(), "mul: output shape mismatch");
    debug!("{} multiplying {} elements", ctx.role(), lhs.numel());

    let mut triplet_shape = Vec::with_capacity(shape.len().saturating_add(1));
    triplet_shape.push(3);
    triplet_shape.extend_from_slice(shape);
    let mut triplet = Tensor::zeros(&triplet_shape);
    ctx.triplets_mut().get_triplet(&mut triplet)?;
    let [a, b, c] = split_leading::<T, 3>(&triplet);

    let mut e_local = Tensor::zeros(shape);
    let mut f_local = Tensor::zeros(shape);
    lhs.sub(&a, &mut e_local);
    rhs.sub(&b, &mut f_local);

    let remote = exchange(ctx, &Tensor::stack(&[&e_local, &f_local]))?;
    let [e_remote, f_remote] = split_leading::<T, 2>(&remote);
    let mut e = Tensor::zeros(shape);
    let mut f = Tensor::zeros(shape);
    e_local.add(&e_remote, &mut e);
    f_local.add(&f_remote, &mut f);

    let mut product = ProductAccumulator::zeros(shape);
    product.mul_accumulate(&f, &a);
    product.mul_accumulate(&e, &b);
    product.accumulate(&c);
    if ctx.role().is_primary() {
        product.mul_accumulate(&e, &f);
    }
    product.truncate_into(N, ctx.role(), out);
    Ok(())
}

/// Splits a tensor with a leading axis of `K` into its `K` parts.
fn split_leading<T: RingElement, const K: usize>(tensor: &Tensor<T>) -> [Tensor<T>; K] {
    match <[Tensor<T>; K]>::try_from(tensor.unstack()) {
        Ok(parts) => parts,
        Err(parts) => unreachable!("expected {K} parts, got {}", parts.len()),
    }
}
