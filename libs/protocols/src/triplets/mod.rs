//! Sources of Beaver triplets.
//!
//! A triplet is a tensor of shape `[3, ...shape]` holding this party's shares of `a`, `b` and
//! `c = a ⊙ b`, in that order along the leading axis. Every triplet must be used exactly once and both
//! parties must request triplets of the same shapes in the same order.

pub mod dealer;

pub use dealer::SeededDealer;

use math_lib::{RingElement, Tensor};

/// Provides this party's share of fresh Beaver triplets.
pub trait TripletSource {
    /// Fills `triplet`, a tensor of shape `[3, ...shape]`, with this party's share of a fresh triplet.
    fn get_triplet<T: RingElement>(&mut self, triplet: &mut Tensor<T>) -> Result<(), TripletError>;
}

/// An error producing a triplet.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TripletError {
    /// The requested tensor's leading axis isn't 3.
    #[error("triplet tensors must have shape [3, ...], got {0:?}")]
    InvalidShape(Vec<usize>),
}
