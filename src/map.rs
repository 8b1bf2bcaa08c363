use std::cmp::Ordering::{Equal as EQ, Greater as GT, Less as LT};
use std::io;
use std::iter::FromIterator;
use std::ops::{Index, Range};
use std::{fmt, slice};

use log::trace;

use crate::block::{self, Block};
use crate::io::{read_from, WriteTo};
use crate::key_map::{KeyMap, Keyed};
use crate::pair::Assign;
use crate::prim::{Merge, Split};
use crate::{FALSE, OUT_OF_BOUNDS, TRUE};

/// Compressed bitmap for `u32`.
///
/// # Examples
///
/// ```rust
/// use roaring32::BitMap;
///
/// let mut bits = BitMap::new();
/// bits.insert(1);
/// bits.insert(1 << 16);
/// bits.insert(1 << 30);
/// assert!(bits.contains(1 << 16));
/// assert_eq!(bits.count1(), 3);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitMap {
    pub(crate) keymap: KeyMap,
}

impl BitMap {
    /// Create an empty bitmap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to an empty bitmap, releasing every block.
    pub fn clear(&mut self) {
        self.keymap = KeyMap::new();
    }

    pub fn is_empty(&self) -> bool {
        self.keymap.len() == 0
    }

    /// Return `true` if the value exists.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roaring32::BitMap;
    ///
    /// let mut bits = BitMap::new();
    /// bits.insert(1);
    /// assert!(!bits.contains(0));
    /// assert!(bits.contains(1));
    /// assert!(!bits.contains(2));
    /// ```
    pub fn contains(&self, x: u32) -> bool {
        let (key, low) = x.split();
        self.keymap
            .search(key)
            .map(|i| self.keymap.entries[i].block.contains(low))
            .unwrap_or(false)
    }

    /// Return `true` if the value didn't exist and was inserted successfully.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roaring32::BitMap;
    ///
    /// let mut bits = BitMap::new();
    /// assert!(bits.insert(3));
    /// assert!(!bits.insert(3));
    /// assert!(bits.contains(3));
    /// ```
    pub fn insert(&mut self, x: u32) -> bool {
        let (key, low) = x.split();
        match self.keymap.search(key) {
            Ok(i) => self.keymap.entries[i].block.insert(low),
            Err(i) => {
                let mut block = Block::new();
                block.insert(low);
                self.keymap.insert_at(i, key, block);
                true
            }
        }
    }

    /// Return `true` if the value existed and was removed successfully.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roaring32::BitMap;
    ///
    /// let mut bits = BitMap::new();
    /// assert!(bits.insert(3));
    /// assert!(bits.remove(3));
    /// assert!(!bits.remove(3));
    /// assert_eq!(bits.count1(), 0);
    /// ```
    pub fn remove(&mut self, x: u32) -> bool {
        let (key, low) = x.split();
        match self.keymap.search(key) {
            Ok(i) => {
                let removed = self.keymap.entries[i].block.remove(low);
                if self.keymap.entries[i].block.is_empty() {
                    self.keymap.remove_at(i);
                }
                removed
            }
            Err(_) => false,
        }
    }

    /// Count of the enabled bits.
    pub fn count1(&self) -> u64 {
        self.keymap
            .entries
            .iter()
            .map(|e| u64::from(e.block.count1()))
            .sum()
    }

    /// Count of the disabled bits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roaring32::BitMap;
    ///
    /// assert_eq!(BitMap::new().count0(), 1 << 32);
    /// ```
    pub fn count0(&self) -> u64 {
        (1u64 << 32) - self.count1()
    }

    /// Ascending iterator over the enabled bits. Calling it again restarts
    /// from the smallest value.
    ///
    /// The iterator borrows the bitmap, so the bitmap cannot change while
    /// one is alive.
    pub fn bits(&self) -> Bits<'_> {
        Bits {
            entries: self.keymap.entries.iter(),
            curr: None,
        }
    }

    /// The enabled bits, ascending.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let bits = roaring32::bitmap![3, 1, 1 << 20];
    /// assert_eq!(bits.to_vec(), vec![1, 3, 1 << 20]);
    /// ```
    pub fn to_vec(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.count1() as usize);
        for e in &self.keymap.entries {
            e.block.fill(&mut out, u32::from(e.key) << 16);
        }
        out
    }

    /// Approximate memory usage in bytes.
    pub fn mem_size(&self) -> usize {
        8 + self
            .keymap
            .entries
            .iter()
            .map(|e| 2 + e.block.mem_size())
            .sum::<usize>()
    }

    /// Recover allocated but unused memory.
    pub fn shrink_to_fit(&mut self) {
        self.keymap.shrink_to_fit();
    }

    /// Complement the bits in `range`, in place.
    ///
    /// Does nothing when the range is empty. The universe is `[0, 1 << 32)`;
    /// an end past it panics.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roaring32::BitMap;
    ///
    /// let mut bits = BitMap::new();
    /// bits.flip(100..200);
    /// assert_eq!(bits.count1(), 100);
    /// bits.flip(150..250);
    /// assert_eq!(bits.count1(), 100);
    /// assert!(bits.contains(100) && bits.contains(249));
    /// assert!(!bits.contains(150) && !bits.contains(199));
    /// ```
    pub fn flip(&mut self, range: Range<u64>) {
        assert!(range.end <= 1 << 32, "{}", OUT_OF_BOUNDS);
        if range.start >= range.end {
            return;
        }
        trace!("flip [{}, {})", range.start, range.end);

        let (key_s, low_s) = (range.start as u32).split();
        let (key_l, low_l) = ((range.end - 1) as u32).split();

        for key in u32::from(key_s)..=u32::from(key_l) {
            let lo = if key == u32::from(key_s) { low_s } else { 0 };
            let hi = if key == u32::from(key_l) { low_l } else { !0 };
            let key = key as u16;
            match self.keymap.search(key) {
                Ok(i) => {
                    self.keymap.entries[i].block.flip_range(lo, hi);
                    if self.keymap.entries[i].block.is_empty() {
                        self.keymap.remove_at(i);
                    }
                }
                Err(i) => self.keymap.insert_at(i, key, Block::ones(lo, hi)),
            }
        }
    }

    /// Serialize into `w`; the bitmap is unchanged. See the module `key_map`
    /// for the layout.
    pub fn serialize_into<W: io::Write>(&self, mut w: W) -> io::Result<()> {
        self.keymap.write_to(&mut w)
    }

    /// Read back a bitmap produced by [`serialize_into`](Self::serialize_into).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roaring32::BitMap;
    ///
    /// let bits = roaring32::bitmap![1, 2, 1 << 20];
    /// let mut buf = Vec::new();
    /// bits.serialize_into(&mut buf).unwrap();
    /// assert_eq!(buf.len(), bits.serialized_size());
    /// assert_eq!(BitMap::deserialize_from(&buf[..]).unwrap(), bits);
    /// ```
    pub fn deserialize_from<R: io::Read>(mut r: R) -> io::Result<Self> {
        let keymap = read_from::<R, KeyMap>(&mut r)?;
        Ok(BitMap { keymap })
    }

    /// Number of bytes `serialize_into` writes.
    pub fn serialized_size(&self) -> usize {
        self.keymap.serialized_size()
    }
}

/// Bitwise AND (intersection). The operands are unchanged.
///
/// # Examples
///
/// ```rust
/// use roaring32::{and, bitmap};
///
/// let out = and(&bitmap![1, 2, 1 << 20], &bitmap![2, 3, 1 << 20]);
/// assert_eq!(out.to_vec(), vec![2, 1 << 20]);
/// ```
pub fn and(x1: &BitMap, x2: &BitMap) -> BitMap {
    let mut out = KeyMap::new();
    let lhs = &x1.keymap.entries;
    let rhs = &x2.keymap.entries;
    let (mut p1, mut p2) = (0, 0);
    while p1 < lhs.len() && p2 < rhs.len() {
        match lhs[p1].key.cmp(&rhs[p2].key) {
            LT => p1 += 1,
            GT => p2 += 1,
            EQ => {
                let block = lhs[p1].block.and(&rhs[p2].block);
                if !block.is_empty() {
                    out.append(lhs[p1].key, block);
                }
                p1 += 1;
                p2 += 1;
            }
        }
    }
    BitMap { keymap: out }
}

/// Bitwise OR (union). The operands are unchanged.
pub fn or(x1: &BitMap, x2: &BitMap) -> BitMap {
    let mut out = KeyMap::new();
    let lhs = &x1.keymap.entries;
    let rhs = &x2.keymap.entries;
    let (mut p1, mut p2) = (0, 0);
    while p1 < lhs.len() && p2 < rhs.len() {
        match lhs[p1].key.cmp(&rhs[p2].key) {
            LT => {
                out.append_copy(&x1.keymap, p1);
                p1 += 1;
            }
            GT => {
                out.append_copy(&x2.keymap, p2);
                p2 += 1;
            }
            EQ => {
                out.append(lhs[p1].key, lhs[p1].block.or(&rhs[p2].block));
                p1 += 1;
                p2 += 1;
            }
        }
    }
    out.append_copies(&x1.keymap, p1..lhs.len());
    out.append_copies(&x2.keymap, p2..rhs.len());
    BitMap { keymap: out }
}

/// Bitwise XOR (symmetric difference). The operands are unchanged.
pub fn xor(x1: &BitMap, x2: &BitMap) -> BitMap {
    let mut out = KeyMap::new();
    let lhs = &x1.keymap.entries;
    let rhs = &x2.keymap.entries;
    let (mut p1, mut p2) = (0, 0);
    while p1 < lhs.len() && p2 < rhs.len() {
        match lhs[p1].key.cmp(&rhs[p2].key) {
            LT => {
                out.append_copy(&x1.keymap, p1);
                p1 += 1;
            }
            GT => {
                out.append_copy(&x2.keymap, p2);
                p2 += 1;
            }
            EQ => {
                let block = lhs[p1].block.xor(&rhs[p2].block);
                if !block.is_empty() {
                    out.append(lhs[p1].key, block);
                }
                p1 += 1;
                p2 += 1;
            }
        }
    }
    out.append_copies(&x1.keymap, p1..lhs.len());
    out.append_copies(&x2.keymap, p2..rhs.len());
    BitMap { keymap: out }
}

/// Bitwise ANDNOT (difference). The operands are unchanged.
pub fn and_not(x1: &BitMap, x2: &BitMap) -> BitMap {
    let mut out = KeyMap::new();
    let lhs = &x1.keymap.entries;
    let rhs = &x2.keymap.entries;
    let (mut p1, mut p2) = (0, 0);
    while p1 < lhs.len() && p2 < rhs.len() {
        match lhs[p1].key.cmp(&rhs[p2].key) {
            LT => {
                out.append_copy(&x1.keymap, p1);
                p1 += 1;
            }
            GT => p2 += 1,
            EQ => {
                let block = lhs[p1].block.and_not(&rhs[p2].block);
                if !block.is_empty() {
                    out.append(lhs[p1].key, block);
                }
                p1 += 1;
                p2 += 1;
            }
        }
    }
    out.append_copies(&x1.keymap, p1..lhs.len());
    BitMap { keymap: out }
}

/// Complement of `map` over `range`, as a new bitmap. `map` is unchanged;
/// an empty range returns a clone.
///
/// # Examples
///
/// ```rust
/// use roaring32::{bitmap, flip};
///
/// let out = flip(&bitmap![1, 3], 0..4);
/// assert_eq!(out.to_vec(), vec![0, 2]);
/// ```
pub fn flip(map: &BitMap, range: Range<u64>) -> BitMap {
    assert!(range.end <= 1 << 32, "{}", OUT_OF_BOUNDS);
    if range.start >= range.end {
        return map.clone();
    }

    let (key_s, low_s) = (range.start as u32).split();
    let (key_l, low_l) = ((range.end - 1) as u32).split();

    let mut out = KeyMap::new();
    out.append_copies_until(&map.keymap, key_s);

    for key in u32::from(key_s)..=u32::from(key_l) {
        let lo = if key == u32::from(key_s) { low_s } else { 0 };
        let hi = if key == u32::from(key_l) { low_l } else { !0 };
        let key = key as u16;
        match map.keymap.search(key) {
            Ok(i) => {
                let mut block = map.keymap.entries[i].block.clone();
                block.flip_range(lo, hi);
                if !block.is_empty() {
                    out.append(key, block);
                }
            }
            Err(_) => out.append(key, Block::ones(lo, hi)),
        }
    }
    out.append_copies_after(&map.keymap, key_l);
    BitMap { keymap: out }
}

impl<'a> Assign<&'a BitMap> for BitMap {
    /// In-place [`and`]. Entries the right-hand side lacks are dropped as
    /// the walk passes them, and whatever is left past the walk at the end.
    fn and_assign(&mut self, rhs: &'a BitMap) {
        let (mut p1, mut p2) = (0, 0);
        while p1 < self.keymap.len() && p2 < rhs.keymap.len() {
            match self.keymap.entries[p1].key.cmp(&rhs.keymap.entries[p2].key) {
                LT => {
                    // advance by deletion
                    self.keymap.remove_at(p1);
                }
                GT => p2 += 1,
                EQ => {
                    self.keymap.entries[p1]
                        .block
                        .and_assign(&rhs.keymap.entries[p2].block);
                    if self.keymap.entries[p1].block.is_empty() {
                        self.keymap.remove_at(p1);
                    } else {
                        p1 += 1;
                    }
                    p2 += 1;
                }
            }
        }
        self.keymap.truncate(p1);
    }

    /// In-place [`or`]. Blocks only the right-hand side has are cloned and
    /// spliced in at the cursor, keeping keys sorted.
    fn or_assign(&mut self, rhs: &'a BitMap) {
        let (mut p1, mut p2) = (0, 0);
        while p1 < self.keymap.len() && p2 < rhs.keymap.len() {
            let e2 = &rhs.keymap.entries[p2];
            match self.keymap.entries[p1].key.cmp(&e2.key) {
                LT => p1 += 1,
                GT => {
                    self.keymap.insert_at(p1, e2.key, e2.block.clone());
                    p1 += 1;
                    p2 += 1;
                }
                EQ => {
                    self.keymap.entries[p1].block.or_assign(&e2.block);
                    p1 += 1;
                    p2 += 1;
                }
            }
        }
        let len = rhs.keymap.len();
        self.keymap.append_copies(&rhs.keymap, p2..len);
    }

    /// In-place [`and_not`].
    fn and_not_assign(&mut self, rhs: &'a BitMap) {
        let (mut p1, mut p2) = (0, 0);
        while p1 < self.keymap.len() && p2 < rhs.keymap.len() {
            match self.keymap.entries[p1].key.cmp(&rhs.keymap.entries[p2].key) {
                LT => p1 += 1,
                GT => p2 += 1,
                EQ => {
                    self.keymap.entries[p1]
                        .block
                        .and_not_assign(&rhs.keymap.entries[p2].block);
                    if self.keymap.entries[p1].block.is_empty() {
                        self.keymap.remove_at(p1);
                    } else {
                        p1 += 1;
                    }
                    p2 += 1;
                }
            }
        }
    }

    /// In-place [`xor`].
    fn xor_assign(&mut self, rhs: &'a BitMap) {
        let (mut p1, mut p2) = (0, 0);
        while p1 < self.keymap.len() && p2 < rhs.keymap.len() {
            let e2 = &rhs.keymap.entries[p2];
            match self.keymap.entries[p1].key.cmp(&e2.key) {
                LT => p1 += 1,
                GT => {
                    self.keymap.insert_at(p1, e2.key, e2.block.clone());
                    p1 += 1;
                    p2 += 1;
                }
                EQ => {
                    self.keymap.entries[p1].block.xor_assign(&e2.block);
                    if self.keymap.entries[p1].block.is_empty() {
                        self.keymap.remove_at(p1);
                    } else {
                        p1 += 1;
                    }
                    p2 += 1;
                }
            }
        }
        let len = rhs.keymap.len();
        self.keymap.append_copies(&rhs.keymap, p2..len);
    }
}

/// Ascending iterator over the enabled bits of a [`BitMap`].
pub struct Bits<'a> {
    entries: slice::Iter<'a, Keyed>,
    curr: Option<(u16, block::Iter<'a>)>,
}

impl<'a> Iterator for Bits<'a> {
    type Item = u32;
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, iter)) = &mut self.curr {
                if let Some(low) = iter.next() {
                    return Some(<u32 as Merge>::merge((*key, low)));
                }
            }
            let e = self.entries.next()?;
            self.curr = Some((e.key, e.block.iter()));
        }
    }
}

impl<'a> IntoIterator for &'a BitMap {
    type Item = u32;
    type IntoIter = Bits<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.bits()
    }
}

impl FromIterator<u32> for BitMap {
    fn from_iter<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        let mut map = BitMap::new();
        for bit in iterable {
            map.insert(bit);
        }
        map
    }
}

impl<'a> FromIterator<&'a u32> for BitMap {
    fn from_iter<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = &'a u32>,
    {
        iterable.into_iter().cloned().collect()
    }
}

impl<T: AsRef<[u32]>> From<T> for BitMap {
    fn from(slice: T) -> Self {
        slice.as_ref().iter().collect()
    }
}

impl Index<u32> for BitMap {
    type Output = bool;

    /// # Examples
    ///
    /// ```rust
    /// let bits = roaring32::bitmap![0, 1 << 30];
    /// assert!(bits[0]);
    /// assert!(!bits[1 << 10]);
    /// assert!(bits[1 << 30]);
    /// ```
    fn index(&self, i: u32) -> &Self::Output {
        if self.contains(i) {
            TRUE
        } else {
            FALSE
        }
    }
}

impl fmt::Debug for BitMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.bits()).finish()
    }
}
