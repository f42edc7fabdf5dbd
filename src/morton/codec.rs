//! # Morton (Z-Order) Coordinate Codec
//!
//! This module provides the bijective mapping between an unsigned 3D
//! coordinate and a single sortable integer code. Interleaving the bits of
//! the three components produces the Z-order curve: numeric proximity of
//! codes approximates 3D spatial proximity, so codes double as stable,
//! comparison-sortable octree-node identifiers.
//!
//! ## Bit Budgets
//!
//! | Code width | Bits per component | Component bound (inclusive) |
//! |------------|--------------------|-----------------------------|
//! | `u32`      | 10                 | `0x3FF` (1023)              |
//! | `u64`      | 21                 | `0x1F_FFFF` (2097151)       |
//!
//! ## Algorithm
//!
//! Encoding spreads each component's bits to every third position with a
//! fixed sequence of shift/mask steps ("magic bits"), then ORs the three
//! spread values at lane offsets 0, 1 and 2. Decoding mirrors the sequence
//! to compact every third bit back into a contiguous integer. Both
//! directions are branch-free integer arithmetic with no allocation.
//!
//! ```text
//! code bit:   ... z2 y2 x2 z1 y1 x1 z0 y0 x0
//! lane:            2  1  0  2  1  0  2  1  0
//! ```
//!
//! ## Bounds Checking
//!
//! `encode32` / `encode64` reject out-of-range components with
//! [`StoreError::Overflow`]. The `_unchecked` variants debug-assert the
//! bound only, for callers whose quantizer already guarantees the range.
//! Decoding is total: every code maps to some coordinate.
//!
//! ## Batched Variants
//!
//! `encode64_x4` / `decode64_x4` apply the identical scalar algorithm
//! lane-wise to four coordinates at once. They exist purely for
//! throughput on hot encode loops and have no semantic difference.
//!
//! ## Thread Safety
//!
//! All functions are pure and stateless, making them inherently
//! thread-safe.

use eyre::{ensure, Result};

use crate::error::StoreError;

/// Largest legal component value for a 32-bit code (10 bits).
pub const MAX_COMPONENT_32: u32 = 0x3FF;

/// Largest legal component value for a 64-bit code (21 bits).
pub const MAX_COMPONENT_64: u32 = 0x1F_FFFF;

/// Spreads the low 10 bits of `v` to every third bit of a 30-bit value.
#[inline(always)]
fn spread_bits_32(v: u32) -> u32 {
    let mut x = v & MAX_COMPONENT_32;
    x = (x | (x << 16)) & 0xFF00_00FF;
    x = (x | (x << 8)) & 0x0300_F00F;
    x = (x | (x << 4)) & 0x030C_30C3;
    x = (x | (x << 2)) & 0x0924_9249;
    x
}

/// Compacts every third bit of `v` back into a 10-bit value.
#[inline(always)]
fn compact_bits_32(v: u32) -> u32 {
    let mut x = v & 0x0924_9249;
    x = (x | (x >> 2)) & 0x030C_30C3;
    x = (x | (x >> 4)) & 0x0300_F00F;
    x = (x | (x >> 8)) & 0xFF00_00FF;
    x = (x | (x >> 16)) & MAX_COMPONENT_32;
    x
}

/// Spreads the low 21 bits of `v` to every third bit of a 63-bit value.
#[inline(always)]
fn spread_bits_64(v: u32) -> u64 {
    let mut x = v as u64 & MAX_COMPONENT_64 as u64;
    x = (x | (x << 32)) & 0x001F_0000_0000_FFFF;
    x = (x | (x << 16)) & 0x001F_0000_FF00_00FF;
    x = (x | (x << 8)) & 0x100F_00F0_0F00_F00F;
    x = (x | (x << 4)) & 0x10C3_0C30_C30C_30C3;
    x = (x | (x << 2)) & 0x1249_2492_4924_9249;
    x
}

/// Compacts every third bit of `v` back into a 21-bit value.
#[inline(always)]
fn compact_bits_64(v: u64) -> u32 {
    let mut x = v & 0x1249_2492_4924_9249;
    x = (x | (x >> 2)) & 0x10C3_0C30_C30C_30C3;
    x = (x | (x >> 4)) & 0x100F_00F0_0F00_F00F;
    x = (x | (x >> 8)) & 0x001F_0000_FF00_00FF;
    x = (x | (x >> 16)) & 0x001F_0000_0000_FFFF;
    x = (x | (x >> 32)) & MAX_COMPONENT_64 as u64;
    x as u32
}

#[inline]
fn check_component(component: &'static str, value: u32, max: u32) -> Result<()> {
    ensure!(
        value <= max,
        StoreError::Overflow {
            component,
            value,
            max,
        }
    );
    Ok(())
}

/// Encode a 3D coordinate into a 32-bit Morton code.
///
/// Each component may use at most 10 bits; larger values fail with
/// [`StoreError::Overflow`]. `encode32(0, 0, 0) == 0` and the bound
/// values are legal, inclusive.
pub fn encode32(x: u32, y: u32, z: u32) -> Result<u32> {
    check_component("x", x, MAX_COMPONENT_32)?;
    check_component("y", y, MAX_COMPONENT_32)?;
    check_component("z", z, MAX_COMPONENT_32)?;
    Ok(encode32_unchecked(x, y, z))
}

/// Encode without the range check. Debug builds still assert the bound.
#[inline(always)]
pub fn encode32_unchecked(x: u32, y: u32, z: u32) -> u32 {
    debug_assert!(x <= MAX_COMPONENT_32 && y <= MAX_COMPONENT_32 && z <= MAX_COMPONENT_32);
    spread_bits_32(x) | (spread_bits_32(y) << 1) | (spread_bits_32(z) << 2)
}

/// Decode a 32-bit Morton code back into its 3D coordinate.
#[inline(always)]
pub fn decode32(code: u32) -> (u32, u32, u32) {
    (
        compact_bits_32(code),
        compact_bits_32(code >> 1),
        compact_bits_32(code >> 2),
    )
}

/// Encode a 3D coordinate into a 64-bit Morton code.
///
/// Each component may use at most 21 bits; larger values fail with
/// [`StoreError::Overflow`].
pub fn encode64(x: u32, y: u32, z: u32) -> Result<u64> {
    check_component("x", x, MAX_COMPONENT_64)?;
    check_component("y", y, MAX_COMPONENT_64)?;
    check_component("z", z, MAX_COMPONENT_64)?;
    Ok(encode64_unchecked(x, y, z))
}

/// Encode without the range check. Debug builds still assert the bound.
#[inline(always)]
pub fn encode64_unchecked(x: u32, y: u32, z: u32) -> u64 {
    debug_assert!(x <= MAX_COMPONENT_64 && y <= MAX_COMPONENT_64 && z <= MAX_COMPONENT_64);
    spread_bits_64(x) | (spread_bits_64(y) << 1) | (spread_bits_64(z) << 2)
}

/// Decode a 64-bit Morton code back into its 3D coordinate.
#[inline(always)]
pub fn decode64(code: u64) -> (u32, u32, u32) {
    (
        compact_bits_64(code),
        compact_bits_64(code >> 1),
        compact_bits_64(code >> 2),
    )
}

/// Encode four coordinates lane-wise.
///
/// Identical results to four `encode64` calls; the fixed-count loop lets
/// the compiler vectorize the spread sequence across lanes.
pub fn encode64_x4(xs: &[u32; 4], ys: &[u32; 4], zs: &[u32; 4]) -> Result<[u64; 4]> {
    for lane in 0..4 {
        check_component("x", xs[lane], MAX_COMPONENT_64)?;
        check_component("y", ys[lane], MAX_COMPONENT_64)?;
        check_component("z", zs[lane], MAX_COMPONENT_64)?;
    }
    let mut codes = [0u64; 4];
    for lane in 0..4 {
        codes[lane] = encode64_unchecked(xs[lane], ys[lane], zs[lane]);
    }
    Ok(codes)
}

/// Decode four codes lane-wise. Total, like `decode64`.
pub fn decode64_x4(codes: &[u64; 4]) -> ([u32; 4], [u32; 4], [u32; 4]) {
    let mut xs = [0u32; 4];
    let mut ys = [0u32; 4];
    let mut zs = [0u32; 4];
    for lane in 0..4 {
        let (x, y, z) = decode64(codes[lane]);
        xs[lane] = x;
        ys[lane] = y;
        zs[lane] = z;
    }
    (xs, ys, zs)
}
