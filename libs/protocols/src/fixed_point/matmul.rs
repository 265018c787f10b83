//! Secure matrix multiplication.

use super::{multiplication::multiply_shares, FixedPointTensor, ProtocolError};
use crate::{context::PartyContext, transport::Transport, triplets::TripletSource};
use math_lib::{RingElement, Tensor};
use tracing::debug;

impl<'a, T: RingElement, const N: u32> FixedPointTensor<'a, T, N> {
    /// Writes a share of the matrix product `self · rhs` into `out`.
    ///
    /// For `self` of shape `[a, b]` and `rhs` of shape `[b, c]`, `self` is broadcast along the output's
    /// columns and `rhs` transposed is broadcast along the output's rows, giving two `[a, c, b]` tensors.
    /// These are multiplied elementwise with a single `[3, a, c, b]` triplet and one round trip, and the
    /// products are summed along the last axis.
    ///
    /// Every product `lhs[i, k] * rhs[k, j]` is truncated on its own, so each output element is off by up
    /// to `b` units in the last place, and each product is subject to the
    /// magnitude limit documented on [`FixedPointTensor::mul`].
    pub fn mat_mul<Tr, Tp>(
        &self,
        ctx: &mut PartyContext<Tr, Tp>,
        rhs: &FixedPointTensor<'_, T, N>,
        out: &mut Tensor<T>,
    ) -> Result<(), ProtocolError>
    where
        Tr: Transport,
        Tp: TripletSource,
    {
        let (rows, inner) = matrix_dimensions(self.shape(), "lhs");
        let (rhs_rows, cols) = matrix_dimensions(rhs.shape(), "rhs");
        assert_eq!(inner, rhs_rows, "mat_mul: lhs has {inner} columns but rhs has {rhs_rows} rows");
        assert_eq!(out.shape(), &[rows, cols], "mat_mul: output must have shape [{rows}, {cols}]");
        debug!("{} multiplying [{rows}, {inner}] by [{inner}, {cols}]", ctx.role());

        let lhs_tiled = self.share.tile(cols).permute(&[1, 0, 2]);
        let rhs_tiled = rhs.share.transpose().tile(rows);
        let mut products = Tensor::zeros(&[rows, cols, inner]);
        multiply_shares::<T, Tr, Tp, N>(ctx, &lhs_tiled, &rhs_tiled, &mut products)?;
        products.sum_last_axis().copy_into(out);
        Ok(())
    }
}

fn matrix_dimensions(shape: &[usize], operand: &str) -> (usize, usize) {
    assert_eq!(shape.len(), 2, "mat_mul: {operand} must be a matrix, got shape {shape:?}");
    (shape.first().copied().unwrap_or_default(), shape.last().copied().unwrap_or_default())
}
