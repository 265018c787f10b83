//! Elementwise operations writing into caller-provided buffers.
//!
//! Every operation asserts that its operands and output have the same number of elements. The output
//! takes the scaling factor of the left operand.

use super::Tensor;
use crate::ring::RingElement;

impl<T: RingElement> Tensor<T> {
    /// Writes `self + rhs` into `out`.
    pub fn add(&self, rhs: &Tensor<T>, out: &mut Tensor<T>) {
        self.zip_into(rhs, out, "add", |l, r| l.wrapping_add(r));
    }

    /// Writes `self - rhs` into `out`.
    pub fn sub(&self, rhs: &Tensor<T>, out: &mut Tensor<T>) {
        self.zip_into(rhs, out, "sub", |l, r| l.wrapping_sub(r));
    }

    /// Writes `-self` into `out`.
    pub fn negative(&self, out: &mut Tensor<T>) {
        self.map_into(out, "negative", |value| value.wrapping_neg());
    }

    /// Copies the elements and scaling factor of `self` into `out`.
    pub fn copy_into(&self, out: &mut Tensor<T>) {
        self.map_into(out, "copy", |value| value);
    }

    fn map_into(&self, out: &mut Tensor<T>, operation: &str, op: impl Fn(T) -> T) {
        assert_eq!(self.numel(), out.numel(), "{operation}: output has {} elements, expected {}", out.numel(), self.numel());
        for (target, value) in out.data_mut().iter_mut().zip(self.data()) {
            *target = op(*value);
        }
        out.set_scaling_factor(self.scaling_factor());
    }

    fn zip_into(&self, rhs: &Tensor<T>, out: &mut Tensor<T>, operation: &str, op: impl Fn(&T, &T) -> T) {
        assert_eq!(self.numel(), rhs.numel(), "{operation}: operands have {} and {} elements", self.numel(), rhs.numel());
        assert_eq!(self.numel(), out.numel(), "{operation}: output has {} elements, expected {}", out.numel(), self.numel());
        for ((target, l), r) in out.data_mut().iter_mut().zip(self.data()).zip(rhs.data()) {
            *target = op(l, r);
        }
        out.set_scaling_factor(self.scaling_factor());
    }
}
