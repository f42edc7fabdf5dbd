//! # Morton Codec
//!
//! Bit-interleaving spatial codec between quantized 3D integer
//! coordinates and Z-order codes. See [`codec`] for the algorithm and
//! bit-budget details.

mod codec;

pub use codec::{
    decode32, decode64, decode64_x4, encode32, encode32_unchecked, encode64, encode64_unchecked,
    encode64_x4, MAX_COMPONENT_32, MAX_COMPONENT_64,
};
