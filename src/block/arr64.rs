use std::hash::{Hash, Hasher};
use std::io;
use std::iter::FromIterator;
use std::fmt;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::io::{ReadFrom, WriteTo};
use crate::pair::Assign;
use crate::{ARR_MAX_LEN, U64_BITS};

use super::Seq16;

/// Dense block; a flat bitmap over all 2^16 positions with a cached weight.
#[derive(Clone)]
pub(crate) struct Arr64 {
    pub(crate) weight: u32,
    pub(crate) boxarr: Box<[u64; ARR_MAX_LEN]>,
}

impl fmt::Debug for Arr64 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Arr64({:?})", self.weight)
    }
}

impl PartialEq for Arr64 {
    fn eq(&self, that: &Arr64) -> bool {
        self.weight == that.weight && self.boxarr[..] == that.boxarr[..]
    }
}
impl Eq for Arr64 {}

impl Hash for Arr64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.boxarr[..].hash(state);
    }
}

impl Default for Arr64 {
    fn default() -> Self {
        let weight = 0;
        let boxarr = Box::new([0; ARR_MAX_LEN]);
        Arr64 { weight, boxarr }
    }
}

#[inline]
fn bitmask(bit: u16) -> (usize, u64) {
    let key = bit as usize / U64_BITS;
    let mask = 1u64 << (bit as usize % U64_BITS);
    (key, mask)
}

impl Arr64 {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn check(&self, key: usize, mask: u64) -> bool {
        self.boxarr.get(key).map_or(false, |&word| word & mask != 0)
    }

    #[inline]
    pub fn contains(&self, bit: u16) -> bool {
        let (key, mask) = bitmask(bit);
        self.check(key, mask)
    }

    #[inline]
    pub fn insert(&mut self, bit: u16) -> bool {
        let (key, mask) = bitmask(bit);
        if self.check(key, mask) {
            false
        } else {
            self.boxarr[key] |= mask;
            self.weight += 1;
            true
        }
    }

    #[inline]
    pub fn remove(&mut self, bit: u16) -> bool {
        let (key, mask) = bitmask(bit);
        if self.check(key, mask) {
            self.boxarr[key] &= !mask;
            self.weight -= 1;
            true
        } else {
            false
        }
    }

    /// Set every bit in the inclusive range.
    pub fn insert_range(&mut self, lo: u16, hi: u16) {
        self.update(lo, hi, |word, mask| word | mask);
    }

    /// Complement every bit in the inclusive range.
    pub fn flip_range(&mut self, lo: u16, hi: u16) {
        self.update(lo, hi, |word, mask| word ^ mask);
    }

    /// Combine with `that` word by word, recomputing the weight as it goes.
    fn zip_words<F>(&mut self, that: &Arr64, f: F)
    where
        F: Fn(u64, u64) -> u64,
    {
        let mut weight = 0;
        for (word, &other) in self.boxarr.iter_mut().zip(that.boxarr.iter()) {
            *word = f(*word, other);
            weight += word.count_ones();
        }
        self.weight = weight;
    }

    /// Apply `f` to the masked part of every word the range touches,
    /// keeping the weight coherent.
    fn update<F>(&mut self, lo: u16, hi: u16, f: F)
    where
        F: Fn(u64, u64) -> u64,
    {
        debug_assert!(lo <= hi);
        let s = lo as usize;
        let e = hi as usize + 1;
        let sw = s / U64_BITS;
        let ew = (e - 1) / U64_BITS;

        let head = !0u64 << (s % U64_BITS);
        let last = !0u64 >> ((U64_BITS - e % U64_BITS) % U64_BITS);

        for (i, word) in self.boxarr[sw..=ew].iter_mut().enumerate() {
            let mut mask = !0u64;
            if i == 0 {
                mask &= head;
            }
            if i == ew - sw {
                mask &= last;
            }
            self.weight -= word.count_ones();
            *word = f(*word, mask);
            self.weight += word.count_ones();
        }
    }
}

impl<'a> From<&'a Seq16> for Arr64 {
    fn from(seq: &'a Seq16) -> Self {
        let mut arr = Arr64::new();
        for &bit in &seq.vector {
            arr.insert(bit);
        }
        arr
    }
}

impl FromIterator<u16> for Arr64 {
    fn from_iter<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        let mut arr = Arr64::new();
        for bit in iterable {
            arr.insert(bit);
        }
        arr
    }
}

impl<'a> Assign<&'a Arr64> for Arr64 {
    fn and_assign(&mut self, that: &'a Arr64) {
        self.zip_words(that, |word, other| word & other);
    }

    fn or_assign(&mut self, that: &'a Arr64) {
        self.zip_words(that, |word, other| word | other);
    }

    fn and_not_assign(&mut self, that: &'a Arr64) {
        self.zip_words(that, |word, other| word & !other);
    }

    fn xor_assign(&mut self, that: &'a Arr64) {
        self.zip_words(that, |word, other| word ^ other);
    }
}

impl<W: io::Write> WriteTo<W> for Arr64 {
    fn write_to(&self, w: &mut W) -> io::Result<()> {
        for &word in self.boxarr.iter() {
            w.write_u64::<LittleEndian>(word)?;
        }
        Ok(())
    }
}

impl<R: io::Read> ReadFrom<R> for Arr64 {
    fn read_from(&mut self, r: &mut R) -> io::Result<()> {
        self.weight = 0;
        for word in self.boxarr.iter_mut() {
            *word = r.read_u64::<LittleEndian>()?;
            self.weight += word.count_ones();
        }
        Ok(())
    }
}
