//! Local linear operations.

use super::FixedPointTensor;
use crate::context::PartyContext;
use math_lib::{RingElement, Tensor};

impl<'a, T: RingElement, const N: u32> FixedPointTensor<'a, T, N> {
    /// Writes a share of `self + rhs` into `out`.
    pub fn add(&self, rhs: &FixedPointTensor<'_, T, N>, out: &mut Tensor<T>) {
        self.check_shape(rhs.shape(), "add");
        self.share.add(rhs.share, out);
    }

    /// Writes a share of `self - rhs` into `out`.
    pub fn sub(&self, rhs: &FixedPointTensor<'_, T, N>, out: &mut Tensor<T>) {
        self.check_shape(rhs.shape(), "sub");
        self.share.sub(rhs.share, out);
    }

    /// Writes a share of `self + rhs` into `out`, where `rhs` is public.
    ///
    /// Only the primary party adds `rhs`, the secondary party copies its share.
    pub fn add_public<Tr, Tp>(&self, ctx: &PartyContext<Tr, Tp>, rhs: &Tensor<T>, out: &mut Tensor<T>) {
        self.check_shape(rhs.shape(), "add_public");
        if ctx.role().is_primary() {
            self.share.add(rhs, out);
        } else {
            self.share.copy_into(out);
        }
    }

    /// Writes a share of `self - rhs` into `out`, where `rhs` is public.
    ///
    /// Only the primary party subtracts `rhs`, the secondary party copies its share.
    pub fn sub_public<Tr, Tp>(&self, ctx: &PartyContext<Tr, Tp>, rhs: &Tensor<T>, out: &mut Tensor<T>) {
        self.check_shape(rhs.shape(), "sub_public");
        if ctx.role().is_primary() {
            self.share.sub(rhs, out);
        } else {
            self.share.copy_into(out);
        }
    }

    /// Writes a share of `-self` into `out`.
    pub fn negative(&self, out: &mut Tensor<T>) {
        self.share.negative(out);
    }

    /// Writes a share of the sum of all elements into `out`, which must hold exactly one element.
    pub fn sum(&self, out: &mut Tensor<T>) {
        assert_eq!(out.numel(), 1, "sum: output must have exactly one element, got shape {:?}", out.shape());
        let total = self.share.data().iter().fold(T::zero(), |total, value| total.wrapping_add(value));
        for target in out.data_mut() {
            *target = total;
        }
        out.set_scaling_factor(N);
    }

    pub(crate) fn check_shape(&self, other: &[usize], operation: &str) {
        assert_eq!(self.shape(), other, "{operation}: operand shape mismatch");
    }
}
