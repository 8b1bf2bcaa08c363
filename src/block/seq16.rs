use std::cmp;
use std::io;
use std::iter::FromIterator;

use crate::io::{ReadFrom, WriteTo};
use crate::pair::{self, Assign};
use crate::SEQ_MAX_LEN;

use super::Arr64;

/// Sparse block; a sorted sequence of bits with no duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct Seq16 {
    pub(crate) vector: Vec<u16>,
}

impl Seq16 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        let vector = Vec::with_capacity(cmp::min(cap, SEQ_MAX_LEN));
        Seq16 { vector }
    }

    /// Position of `bit`, or the position it would be inserted at.
    pub fn search(&self, bit: u16) -> Result<usize, usize> {
        self.vector.binary_search(&bit)
    }

    pub fn contains(&self, bit: u16) -> bool {
        self.search(bit).is_ok()
    }

    pub fn insert(&mut self, bit: u16) -> bool {
        match self.search(bit) {
            Ok(_) => false,
            Err(i) => {
                self.vector.insert(i, bit);
                true
            }
        }
    }

    pub fn remove(&mut self, bit: u16) -> bool {
        match self.search(bit) {
            Ok(i) => {
                self.vector.remove(i);
                true
            }
            Err(_) => false,
        }
    }

    /// Positions of the values inside `lo..=hi`, as a half-open index range.
    pub fn bounds(&self, lo: u16, hi: u16) -> (usize, usize) {
        let i = match self.search(lo) {
            Ok(i) | Err(i) => i,
        };
        let j = match self.search(hi) {
            Ok(j) => j + 1,
            Err(j) => j,
        };
        (i, j)
    }
}

impl<'a> From<&'a Arr64> for Seq16 {
    fn from(arr: &'a Arr64) -> Self {
        let mut seq = Seq16::with_capacity(arr.weight as usize);
        seq.vector.extend(arr.iter());
        seq
    }
}

impl From<Vec<u16>> for Seq16 {
    fn from(vector: Vec<u16>) -> Self {
        let mut vector = vector;
        vector.sort_unstable();
        vector.dedup();
        assert!(vector.len() <= super::Block::CAPACITY);
        Seq16 { vector }
    }
}

impl FromIterator<u16> for Seq16 {
    fn from_iter<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        Seq16::from(iterable.into_iter().collect::<Vec<u16>>())
    }
}

impl<'a> Assign<&'a Seq16> for Seq16 {
    fn and_assign(&mut self, seq16: &'a Seq16) {
        let vector =
            pair::intersection(self.vector.iter().cloned(), seq16.vector.iter().cloned())
                .collect();
        self.vector = vector;
    }

    fn or_assign(&mut self, seq16: &'a Seq16) {
        let vector = pair::union(self.vector.iter().cloned(), seq16.vector.iter().cloned())
            .collect();
        self.vector = vector;
    }

    fn and_not_assign(&mut self, seq16: &'a Seq16) {
        let vector =
            pair::difference(self.vector.iter().cloned(), seq16.vector.iter().cloned())
                .collect();
        self.vector = vector;
    }

    fn xor_assign(&mut self, seq16: &'a Seq16) {
        let vector = pair::symmetric_difference(
            self.vector.iter().cloned(),
            seq16.vector.iter().cloned(),
        )
        .collect();
        self.vector = vector;
    }
}

impl<W: io::Write> WriteTo<W> for Seq16 {
    fn write_to(&self, w: &mut W) -> io::Result<()> {
        self.vector.write_to(w)
    }
}

impl<R: io::Read> ReadFrom<R> for Seq16 {
    /// Reads as many values as the vector already holds.
    fn read_from(&mut self, r: &mut R) -> io::Result<()> {
        self.vector.read_from(r)
    }
}
