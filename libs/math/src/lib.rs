//! Ring arithmetic, fixed-point encoding and tensors for two-party additive secret sharing.
#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::iterator_step_by_zero,
    clippy::invalid_regex,
    clippy::string_slice,
    clippy::unimplemented,
    clippy::todo
)]
#![allow(clippy::module_inception)]

pub mod fixed;
pub mod ring;
pub mod serde;
pub mod tensor;
pub mod truncation;

pub use fixed::FixedPointError;
pub use ring::RingElement;
pub use tensor::{Tensor, TensorError};
pub use truncation::ProductAccumulator;
