//! Cauchy Reed-Solomon erasure coding over GF(2^w) using bit-matrices.
//!
//! Given `k` data devices, the code computes `m` coding devices so that any
//! `m` of the `k + m` devices can be lost and rebuilt from the survivors.
//!
//! The pipeline is:
//! - [`build_generator_matrix`] builds an `m x k` Cauchy matrix over GF(2^w).
//! - [`expand_to_bitmatrix`] turns every field element into a `w x w`
//!   binary block, so multiplication becomes XOR of bit-planes.
//! - [`encode`] XORs data bit-planes into coding bit-planes.
//! - [`decode`] inverts the bit-matrix rows of `k` survivors over GF(2) to
//!   rebuild erased data devices, then re-encodes erased coding devices.
//!
//! [`CauchyCode`] and [`Stripe`] wrap these for callers that want a session
//! object owning the matrices and an arena owning the device buffers.
//!
//! # Examples
//!
//! ```rust
//! use cauchy_erasure::{CauchyCode, CodingConfig, ErasureSet, Stripe};
//!
//! let config = CodingConfig::new(4, 2, 4, 8).unwrap();
//! let code = CauchyCode::new(config).unwrap();
//!
//! let mut stripe = Stripe::new(&config, 1).unwrap();
//! for i in 0..config.k() {
//!     for (n, byte) in stripe.device_mut(i).unwrap().iter_mut().enumerate() {
//!         *byte = (i * 31 + n) as u8;
//!     }
//! }
//! stripe.encode(&code).unwrap();
//! let original = stripe.device(0).unwrap().to_vec();
//!
//! // Lose data device 0 and coding device 1.
//! stripe.erase(0).unwrap();
//! stripe.erase(5).unwrap();
//! let erasures = ErasureSet::new([0, 5], 4, 2).unwrap();
//! stripe.decode(&code, &erasures).unwrap();
//!
//! assert_eq!(stripe.device(0).unwrap(), &original[..]);
//! ```

pub mod bitmatrix;
pub mod cauchy;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod galois;
pub mod stripe;

#[cfg(test)]
mod tests;

pub use bitmatrix::{expand_to_bitmatrix, BitMatrix};
pub use cauchy::{build_generator_matrix, GeneratorMatrix};
pub use config::{min_word_size, CodingConfig, WORD_SIZE};
pub use decode::{decode, make_decoding_bitmatrix, DecodingMatrix, ErasureSet};
pub use encode::encode;
pub use error::{Error, Result};
pub use galois::{field_divide, field_inverse, field_multiply, Field};
pub use stripe::{CauchyCode, Stripe};
