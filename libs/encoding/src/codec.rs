//! Tensor encoding.

use bincode::Options;
use math_lib::{RingElement, Tensor};

/// A codec for share tensors.
///
/// Each message is prefixed with a byte that indicates the message's encoding and a byte holding the
/// element width in bytes, followed by the tensor itself. The width byte lets a receiver reject a tensor
/// sent by a peer running over a different ring instead of misreading it.
#[derive(Clone, Copy, Default, Debug)]
pub struct TensorCodec;

impl TensorCodec {
    /// Options for bincode.
    pub fn bincode_options() -> impl bincode::Options {
        bincode::options()
            // Elements are uniformly random, varints would only make them larger.
            .with_fixint_encoding()
            .with_little_endian()
    }

    /// Encode a tensor into a byte sequence.
    pub fn encode<T: RingElement>(&self, tensor: &Tensor<T>) -> Result<Vec<u8>, EncodeError> {
        let mut bytes = vec![Encoding::Bincode as u8, element_width::<T>()];
        Self::bincode_options().serialize_into(&mut bytes, tensor)?;
        Ok(bytes)
    }

    /// The total encoded size of a tensor of `shape`, including the header.
    ///
    /// Receivers know the shape they expect, so this bounds what they accept from the peer.
    pub fn encoded_size<T: RingElement>(shape: &[usize]) -> u64 {
        let rank = u64::try_from(shape.len()).unwrap_or(u64::MAX);
        let numel = shape.iter().try_fold(1u64, |acc, dim| acc.checked_mul(u64::try_from(*dim).ok()?));
        // Both vectors carry a u64 length prefix, the scaling factor is a u32.
        let shape_size = rank.saturating_mul(8).saturating_add(8);
        let data_size = numel.unwrap_or(u64::MAX).saturating_mul(u64::from(element_width::<T>())).saturating_add(8);
        HEADER_SIZE.saturating_add(shape_size).saturating_add(data_size).saturating_add(4)
    }

    /// Decode a tensor from a byte sequence.
    pub fn decode<T: RingElement>(&self, data: &[u8]) -> Result<Tensor<T>, DecodeError> {
        let [encoding, width, body @ ..] = data else {
            return Err(DecodeError::Truncated);
        };
        if *encoding != Encoding::Bincode as u8 {
            return Err(DecodeError::UnknownEncoding(*encoding));
        }
        if *width != element_width::<T>() {
            return Err(DecodeError::ElementWidth { expected: element_width::<T>(), received: *width });
        }
        let tensor: Tensor<T> = Self::bincode_options().deserialize(body)?;
        // Rebuilding validates the shape against the element count.
        let scaling_factor = tensor.scaling_factor();
        let shape = tensor.shape().to_vec();
        Tensor::new(shape, tensor.into_data())
            .map(|tensor| tensor.with_scaling_factor(scaling_factor))
            .map_err(|e| DecodeError::Malformed(e.to_string()))
    }
}

const HEADER_SIZE: u64 = 2;

#[allow(clippy::cast_possible_truncation)]
fn element_width<T: RingElement>() -> u8 {
    (T::BITS / 8) as u8
}

#[repr(u8)]
enum Encoding {
    Bincode = 0,
}

/// An error during tensor encoding.
#[derive(Debug, thiserror::Error)]
#[error("encoding: {0}")]
pub struct EncodeError(#[from] Box<bincode::ErrorKind>);

/// An error during tensor decoding.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The message is shorter than its header.
    #[error("decoding: message truncated")]
    Truncated,

    /// The encoding byte is unknown.
    #[error("decoding: unknown encoding: {0}")]
    UnknownEncoding(u8),

    /// The peer encoded elements of a different width.
    #[error("decoding: expected {expected}-byte elements, received {received}-byte elements")]
    ElementWidth {
        /// Our element width.
        expected: u8,
        /// The peer's element width.
        received: u8,
    },

    /// The body is not a valid tensor.
    #[error("decoding: malformed tensor: {0}")]
    Malformed(String),

    /// Bincode failed.
    #[error("decoding: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
}
