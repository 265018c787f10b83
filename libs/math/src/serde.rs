//! Conditional serde bounds.
//!
//! Generic code that must be serializable when the `serde` feature is on names [`Serde`] as a bound
//! instead of repeating the `cfg` at every use site.

/// Serializable and deserializable, when the `serde` feature is enabled.
#[cfg(feature = "serde")]
pub trait Serde: serde::Serialize + serde::de::DeserializeOwned {}

#[cfg(feature = "serde")]
impl<T: serde::Serialize + serde::de::DeserializeOwned> Serde for T {}

/// Serializable and deserializable, when the `serde` feature is enabled.
#[cfg(not(feature = "serde"))]
pub trait Serde {}

#[cfg(not(feature = "serde"))]
impl<T> Serde for T {}
