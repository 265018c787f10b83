//! A trusted dealer simulated from a shared seed.

use super::{TripletError, TripletSource};
use crate::context::Seed;
use basic_types::PartyRole;
use math_lib::{RingElement, Tensor};
use rand_chacha::ChaCha20Rng;
use tracing::debug;

/// The ChaCha stream used for triplet generation.
const DEALER_STREAM: u64 = 1;

/// A triplet source where both parties replay the same dealer from a common seed.
///
/// For every element the dealer draws `a` and `b`, computes `c = a * b` and splits each of them with a
/// fresh mask: the primary party takes the mask and the secondary party takes the value minus the mask.
/// Since both parties run the full dealer, either of them could recompute the other's shares. This is
/// only suitable for simulations and tests.
pub struct SeededDealer {
    role: PartyRole,
    rng: ChaCha20Rng,
    issued: u64,
}

impl SeededDealer {
    /// Constructs a dealer for `role`, both parties must use the same `seed`.
    pub fn new(role: PartyRole, seed: Seed) -> Self {
        Self { role, rng: seed.rng(DEALER_STREAM), issued: 0 }
    }

    /// The number of triplet elements issued so far.
    pub fn issued(&self) -> u64 {
        self.issued
    }

    fn split<T: RingElement>(&mut self, value: T) -> T {
        let mask = T::random(&mut self.rng);
        if self.role.is_primary() {
            mask
        } else {
            value.wrapping_sub(&mask)
        }
    }
}

impl TripletSource for SeededDealer {
    fn get_triplet<T: RingElement>(&mut self, triplet: &mut Tensor<T>) -> Result<(), TripletError> {
        if triplet.shape().first() != Some(&3) {
            return Err(TripletError::InvalidShape(triplet.shape().to_vec()));
        }
        let count = triplet.numel() / 3;
        let (a_shares, rest) = triplet.data_mut().split_at_mut(count);
        let (b_shares, c_shares) = rest.split_at_mut(count);
        for ((a_share, b_share), c_share) in a_shares.iter_mut().zip(b_shares).zip(c_shares) {
            let a = T::random(&mut self.rng);
            let b = T::random(&mut self.rng);
            let c = a.wrapping_mul(&b);
            *a_share = self.split(a);
            *b_share = self.split(b);
            *c_share = self.split(c);
        }
        self.issued = self.issued.saturating_add(count as u64);
        debug!("{} drew a triplet of {count} elements, {} issued so far", self.role, self.issued);
        Ok(())
    }
}
