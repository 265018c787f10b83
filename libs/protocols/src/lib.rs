//! Two-party protocols over additively secret shared fixed-point tensors.

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

pub mod context;
pub mod fixed_point;
pub mod transport;
pub mod triplets;

#[cfg(any(test, feature = "validation"))]
pub mod simulator;

pub use context::{PartyContext, Seed};
pub use fixed_point::{FixedPointTensor, ProtocolError};
