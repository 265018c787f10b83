//! Dense tensors of ring elements.

pub mod ops;
pub mod tensor;

pub use tensor::{Tensor, TensorError};
