//! Tensor.

use crate::{fixed::FixedPointError, ring::RingElement};
use thiserror::Error;

/// A dense, row-major tensor of ring elements.
///
/// Besides its shape and elements, a tensor carries the number of fractional bits its elements are
/// scaled by. Nothing in this type enforces that operands of an operation share a scaling factor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tensor<T> {
    shape: Vec<usize>,
    data: Vec<T>,
    scaling_factor: u32,
}

impl<T: RingElement> Tensor<T> {
    /// Constructs a tensor from its shape and row-major elements.
    pub fn new(shape: Vec<usize>, data: Vec<T>) -> Result<Self, TensorError> {
        let numel = shape.iter().try_fold(1usize, |acc, dim| acc.checked_mul(*dim)).ok_or(TensorError::Overflow)?;
        if numel != data.len() {
            return Err(TensorError::Build(data.len(), numel));
        }
        Ok(Self { shape, data, scaling_factor: 0 })
    }

    /// A tensor filled with zeros.
    pub fn zeros(shape: &[usize]) -> Self {
        Self::filled(shape, T::zero())
    }

    /// A tensor filled with `value`.
    pub fn filled(shape: &[usize], value: T) -> Self {
        let numel = shape.iter().product();
        Self { shape: shape.to_vec(), data: vec![value; numel], scaling_factor: 0 }
    }

    /// Sets the scaling factor, builder style.
    pub fn with_scaling_factor(mut self, scaling_factor: u32) -> Self {
        self.scaling_factor = scaling_factor;
        self
    }

    /// The shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The number of elements.
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// The elements, in row-major order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// The elements, in row-major order.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the tensor, returning its elements.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// The number of fractional bits the elements are scaled by.
    pub fn scaling_factor(&self) -> u32 {
        self.scaling_factor
    }

    /// Sets the number of fractional bits the elements are scaled by.
    pub fn set_scaling_factor(&mut self, scaling_factor: u32) {
        self.scaling_factor = scaling_factor;
    }

    /// Changes the shape without moving any element.
    pub fn reshape(&mut self, shape: &[usize]) {
        let numel: usize = shape.iter().product();
        assert_eq!(numel, self.numel(), "cannot reshape {:?} into {shape:?}", self.shape);
        self.shape = shape.to_vec();
    }

    /// Copies rows `begin..end` of the leading axis into a new tensor.
    #[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
    pub fn slice(&self, begin: usize, end: usize) -> Tensor<T> {
        let rows = self.shape.first().copied().unwrap_or_default();
        assert!(begin <= end && end <= rows, "slice {begin}..{end} out of range for {:?}", self.shape);
        let row_size = self.shape[1..].iter().product::<usize>();
        let mut shape = self.shape.clone();
        shape[0] = end - begin;
        let data = self.data[begin * row_size..end * row_size].to_vec();
        Tensor { shape, data, scaling_factor: self.scaling_factor }
    }

    /// Reorders the axes: axis `i` of the output is axis `axes[i]` of this tensor.
    #[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
    pub fn permute(&self, axes: &[usize]) -> Tensor<T> {
        let rank = self.shape.len();
        assert_eq!(axes.len(), rank, "permutation {axes:?} does not match rank {rank}");
        let mut seen = vec![false; rank];
        for &axis in axes {
            assert!(axis < rank && !seen[axis], "invalid permutation {axes:?}");
            seen[axis] = true;
        }

        let strides = row_major_strides(&self.shape);
        let shape: Vec<usize> = axes.iter().map(|axis| self.shape[*axis]).collect();
        let source_strides: Vec<usize> = axes.iter().map(|axis| strides[*axis]).collect();
        let mut data = Vec::with_capacity(self.numel());
        let mut index = vec![0usize; rank];
        for _ in 0..self.numel() {
            let offset: usize = index.iter().zip(&source_strides).map(|(i, stride)| i * stride).sum();
            data.push(self.data[offset]);
            for dim in (0..rank).rev() {
                index[dim] += 1;
                if index[dim] < shape[dim] {
                    break;
                }
                index[dim] = 0;
            }
        }
        Tensor { shape, data, scaling_factor: self.scaling_factor }
    }

    /// Transposes a matrix.
    pub fn transpose(&self) -> Tensor<T> {
        assert_eq!(self.shape.len(), 2, "transpose expects a matrix, got shape {:?}", self.shape);
        self.permute(&[1, 0])
    }

    /// Repeats this tensor `times` times along a new leading axis.
    pub fn tile(&self, times: usize) -> Tensor<T> {
        let mut shape = Vec::with_capacity(self.shape.len().saturating_add(1));
        shape.push(times);
        shape.extend_from_slice(&self.shape);
        let data = std::iter::repeat(self.data.iter().copied()).take(times).flatten().collect();
        Tensor { shape, data, scaling_factor: self.scaling_factor }
    }

    /// Stacks equally shaped tensors along a new leading axis.
    ///
    /// The result takes the scaling factor of the first part.
    pub fn stack(parts: &[&Tensor<T>]) -> Tensor<T> {
        let Some(first) = parts.first() else {
            unreachable!("cannot stack an empty list of tensors");
        };
        let mut shape = Vec::with_capacity(first.shape.len().saturating_add(1));
        shape.push(parts.len());
        shape.extend_from_slice(&first.shape);
        let mut data = Vec::with_capacity(first.numel().saturating_mul(parts.len()));
        for part in parts {
            assert_eq!(part.shape, first.shape, "cannot stack tensors of different shapes");
            data.extend_from_slice(&part.data);
        }
        Tensor { shape, data, scaling_factor: first.scaling_factor }
    }

    /// Splits this tensor along its leading axis, the inverse of [`Tensor::stack`].
    pub fn unstack(&self) -> Vec<Tensor<T>> {
        let Some((_, inner)) = self.shape.split_first() else {
            unreachable!("cannot unstack a scalar");
        };
        let inner_numel = inner.iter().product::<usize>();
        if inner_numel == 0 {
            let rows = self.shape.first().copied().unwrap_or_default();
            return vec![Tensor::zeros(inner).with_scaling_factor(self.scaling_factor); rows];
        }
        self.data
            .chunks_exact(inner_numel)
            .map(|chunk| Tensor { shape: inner.to_vec(), data: chunk.to_vec(), scaling_factor: self.scaling_factor })
            .collect()
    }

    /// Sums (wrapping) along the trailing axis, removing it.
    pub fn sum_last_axis(&self) -> Tensor<T> {
        let Some((last, leading)) = self.shape.split_last() else {
            unreachable!("cannot sum the last axis of a scalar");
        };
        let shape = leading.to_vec();
        let data = if *last == 0 {
            vec![T::zero(); shape.iter().product()]
        } else {
            self.data.chunks_exact(*last).map(|row| row.iter().fold(T::zero(), |acc, x| acc.wrapping_add(x))).collect()
        };
        Tensor { shape, data, scaling_factor: self.scaling_factor }
    }
}

#[allow(clippy::arithmetic_side_effects, clippy::indexing_slicing)]
fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for dim in (0..shape.len().saturating_sub(1)).rev() {
        strides[dim] = strides[dim + 1] * shape[dim + 1];
    }
    strides
}

/// An error building a tensor.
#[derive(Error, Debug, PartialEq)]
pub enum TensorError {
    /// The shape's element count overflows.
    #[error("shape element count overflows")]
    Overflow,

    /// The data length doesn't match the shape.
    #[error("error building tensor, given data has {0} entries which does not match the shape's {1}")]
    Build(usize, usize),

    /// A value could not be encoded as fixed point.
    #[error(transparent)]
    FixedPoint(#[from] FixedPointError),
}
