//! Division by a public divisor.

use super::FixedPointTensor;
use crate::context::PartyContext;
use math_lib::{fixed, RingElement, Tensor};

impl<'a, T: RingElement, const N: u32> FixedPointTensor<'a, T, N> {
    /// Writes a share of `self / divisor` into `out`, where `divisor` is a public fixed-point tensor with
    /// `N` fractional bits.
    ///
    /// This multiplies by the public reciprocal, so it is local. The reciprocal of a raw divisor `d` is
    /// encoded as `round(2^2N / d)` which carries `log2(2^N / |d|)` significant bits: precision degrades as
    /// the divisor grows, and divisors above `2^N` in magnitude have a reciprocal of zero. The product of
    /// `self` and the reciprocal is subject to the magnitude limit documented on
    /// [`FixedPointTensor::mul`], so small divisors shrink the range of `self` that divides reliably.
    ///
    /// # Panics
    ///
    /// If any divisor is zero or its reciprocal doesn't fit the ring.
    pub fn div<Tr, Tp>(&self, ctx: &PartyContext<Tr, Tp>, divisor: &Tensor<T>, out: &mut Tensor<T>) {
        self.check_shape(divisor.shape(), "div");
        let mut reciprocals = divisor.clone();
        for value in reciprocals.data_mut() {
            *value = reciprocal::<T, N>(*value);
        }
        reciprocals.set_scaling_factor(N);
        self.mul_public(ctx, &reciprocals, out);
    }
}

fn reciprocal<T: RingElement, const N: u32>(raw: T) -> T {
    assert!(!raw.is_zero(), "div: division by zero");
    let reciprocal = fixed::encode::<T>(1.0 / fixed::decode(raw, N), N);
    assert!(reciprocal.is_ok(), "div: the reciprocal of {raw:?} does not fit the ring");
    reciprocal.unwrap_or_default()
}
