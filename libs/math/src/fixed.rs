//! Fixed-point encoding.
//!
//! A real value `x` is represented by the ring element `round(x * 2^bits)`.

use crate::{
    ring::RingElement,
    tensor::{Tensor, TensorError},
};
use thiserror::Error;

/// An error encoding a fixed-point value.
#[derive(Error, Debug, PartialEq)]
pub enum FixedPointError {
    /// The value can't be represented in the ring at this precision.
    #[error("{value} does not fit a {ring_bits}-bit ring with {bits} fractional bits")]
    Overflow {
        /// The value being encoded.
        value: f64,
        /// The number of fractional bits.
        bits: u32,
        /// The ring size.
        ring_bits: u32,
    },

    /// The precision leaves no room for the integer part.
    #[error("{bits} fractional bits is too many for a {ring_bits}-bit ring")]
    Precision {
        /// The number of fractional bits.
        bits: u32,
        /// The ring size.
        ring_bits: u32,
    },
}

/// Encodes `value` with `bits` fractional bits, rounding to nearest.
pub fn encode<T: RingElement>(value: f64, bits: u32) -> Result<T, FixedPointError> {
    if bits >= T::BITS {
        return Err(FixedPointError::Precision { bits, ring_bits: T::BITS });
    }
    let scaled = value * f64::from(bits).exp2();
    T::from_f64_rounded(scaled).ok_or(FixedPointError::Overflow { value, bits, ring_bits: T::BITS })
}

/// Decodes a raw element with `bits` fractional bits.
pub fn decode<T: RingElement>(raw: T, bits: u32) -> f64 {
    raw.as_f64() / f64::from(bits).exp2()
}

impl<T: RingElement> Tensor<T> {
    /// Encodes real values into a tensor with `bits` fractional bits.
    pub fn from_f64s(shape: Vec<usize>, values: &[f64], bits: u32) -> Result<Self, TensorError> {
        let data = values.iter().map(|value| encode(*value, bits)).collect::<Result<Vec<T>, _>>()?;
        Ok(Tensor::new(shape, data)?.with_scaling_factor(bits))
    }

    /// Decodes this tensor's elements using its scaling factor.
    pub fn to_f64s(&self) -> Vec<f64> {
        let bits = self.scaling_factor();
        self.data().iter().map(|raw| decode(*raw, bits)).collect()
    }
}
