//! Elements of the ring Z/2^k.
//!
//! Shares live in a power-of-two ring so every party can add, subtract and multiply them with plain
//! wrapping machine arithmetic.

use crate::serde::Serde;
use num_traits::{PrimInt, WrappingAdd, WrappingMul, WrappingNeg, WrappingSub};
use rand::Rng;
use std::fmt::Debug;

/// A two's-complement integer used as an element of Z/2^BITS.
///
/// All arithmetic is wrapping: overflow is reduction modulo 2^BITS, which is what makes additive sharing
/// work. Signed representatives are used so that small negative plaintexts decode naturally.
pub trait RingElement:
    PrimInt + WrappingAdd + WrappingSub + WrappingMul + WrappingNeg + Default + Debug + Send + Sync + Serde + 'static
{
    /// The number of bits in this ring.
    const BITS: u32;

    /// Converts a float into the nearest ring element, if it is representable.
    fn from_f64_rounded(value: f64) -> Option<Self>;

    /// Converts this element, interpreted as a signed integer, into a float.
    fn as_f64(self) -> f64;

    /// Draws a uniformly random ring element.
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

macro_rules! impl_ring_element {
    ($type:ty) => {
        impl RingElement for $type {
            const BITS: u32 = <$type>::BITS;

            #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
            fn from_f64_rounded(value: f64) -> Option<Self> {
                let rounded = value.round();
                // The upper bound is exclusive: `MAX as f64` rounds up to 2^(BITS-1).
                if rounded.is_finite() && rounded >= <$type>::MIN as f64 && rounded < -(<$type>::MIN as f64) {
                    Some(rounded as $type)
                } else {
                    None
                }
            }

            #[allow(clippy::cast_precision_loss)]
            fn as_f64(self) -> f64 {
                self as f64
            }

            fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
                rng.gen::<$type>()
            }
        }
    };
}

impl_ring_element!(i32);
impl_ring_element!(i64);
