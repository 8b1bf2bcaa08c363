//! Compressed bitmap for `u32`.
//!
//! A value is split into a 16-bit key and 16 low bits; the low bits of each
//! key live in a block that switches between a sorted `u16` sequence and a
//! flat 1024-word bitmap, whichever is cheaper for its current weight.

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

#[macro_use]
mod macros;

mod block;
mod io;
mod key_map;
mod map;
mod pair;
mod prim;

#[cfg(test)]
mod tests;

pub(crate) const SEQ_MAX_LEN: usize = 4096;
pub(crate) const ARR_MAX_LEN: usize = 1024;
pub(crate) const U64_BITS: usize = 64;
pub(crate) const OUT_OF_BOUNDS: &str = "index out of bounds";

pub(crate) static TRUE: &bool = &true;
pub(crate) static FALSE: &bool = &false;

pub use crate::io::{ReadFrom, WriteTo};
pub use crate::map::{and, and_not, flip, or, xor, BitMap, Bits};
pub use crate::pair::Assign;
