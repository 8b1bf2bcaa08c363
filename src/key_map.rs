use std::ops::Range;
use std::{io, mem};

use log::debug;

use crate::block::{Arr64, Block, Seq16};
use crate::io::{read_from, ReadFrom, WriteTo};
use crate::SEQ_MAX_LEN;

// https://github.com/RoaringBitmap/RoaringFormatSpec
const SERIAL_COOKIE: u32 = 12_346;

/// Keys and their blocks, kept sorted by key with no duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct KeyMap {
    pub(crate) entries: Vec<Keyed>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Keyed {
    pub(crate) key: u16,
    pub(crate) block: Block,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The found position, or the position a block for `key` would be
    /// inserted at. One probe serves both lookup and lookup-or-insert.
    pub fn search(&self, key: u16) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&key, |e| e.key)
    }

    pub fn append(&mut self, key: u16, block: Block) {
        assert!(self.entries.last().map_or(true, |e| e.key < key));
        self.entries.push(Keyed { key, block });
    }

    pub fn append_copy(&mut self, src: &KeyMap, i: usize) {
        let e = &src.entries[i];
        self.append(e.key, e.block.clone());
    }

    pub fn append_copies(&mut self, src: &KeyMap, range: Range<usize>) {
        for i in range {
            self.append_copy(src, i);
        }
    }

    /// Copy every entry of `src` whose key sorts before `stop`.
    pub fn append_copies_until(&mut self, src: &KeyMap, stop: u16) {
        for e in &src.entries {
            if e.key >= stop {
                break;
            }
            self.append(e.key, e.block.clone());
        }
    }

    /// Copy every entry of `src` whose key sorts after `start`.
    pub fn append_copies_after(&mut self, src: &KeyMap, start: u16) {
        for e in &src.entries {
            if e.key > start {
                self.append(e.key, e.block.clone());
            }
        }
    }

    pub fn insert_at(&mut self, i: usize, key: u16, block: Block) {
        self.entries.insert(i, Keyed { key, block });
    }

    pub fn remove_at(&mut self, i: usize) {
        self.entries.remove(i);
    }

    pub fn truncate(&mut self, n: usize) {
        self.entries.truncate(n);
    }

    pub fn shrink_to_fit(&mut self) {
        for e in &mut self.entries {
            e.block.shrink_to_fit();
        }
        self.entries.shrink_to_fit();
    }

    /// Exact number of bytes `write_to` produces.
    pub fn serialized_size(&self) -> usize {
        let cookie_and_len = 2 * mem::size_of::<u32>();
        let header = (2 * mem::size_of::<u16>() + mem::size_of::<u32>()) * self.len();
        let payload: usize = self.entries.iter().map(|e| payload_size(&e.block)).sum();
        cookie_and_len + header + payload
    }
}

fn payload_size(block: &Block) -> usize {
    match block {
        Block::Seq(seq) => mem::size_of::<u16>() * seq.vector.len(),
        Block::Arr(arr) => mem::size_of::<u64>() * arr.boxarr.len(),
    }
}

// The layout, all words little-endian:
//
//   cookie  u32
//   size    u32
//   size  x (key u16, weight - 1 u16)
//   size  x payload offset u32, from the start of the stream
//   payloads in key order; weight <= 4096 stores the sorted values as u16,
//   anything larger stores the 1024 words
//
// A weight is never zero, so `weight - 1` always fits the header field and a
// decoded header can never claim an empty or overfull block.

impl<W: io::Write> WriteTo<W> for KeyMap {
    fn write_to(&self, w: &mut W) -> io::Result<()> {
        SERIAL_COOKIE.write_to(w)?;
        (self.len() as u32).write_to(w)?;

        for e in &self.entries {
            let weight = (e.block.count1() - 1) as u16;
            e.key.write_to(w)?;
            weight.write_to(w)?;
        }

        let mut offset =
            2 * mem::size_of::<u32>() + (2 * mem::size_of::<u16>() + mem::size_of::<u32>()) * self.len();
        for e in &self.entries {
            (offset as u32).write_to(w)?;
            offset += payload_size(&e.block);
        }

        for e in &self.entries {
            e.block.write_to(w)?;
        }
        Ok(())
    }
}

impl<R: io::Read> ReadFrom<R> for KeyMap {
    fn read_from(&mut self, r: &mut R) -> io::Result<()> {
        self.entries.clear();

        let cookie = read_from::<R, u32>(r)?;
        if cookie != SERIAL_COOKIE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unexpected cookie value: {}", cookie),
            ));
        }

        let len = read_from::<R, u32>(r)? as usize;
        debug!("reading {} blocks", len);

        let mut header = Vec::with_capacity(len);
        for _ in 0..len {
            let key = read_from::<R, u16>(r)?;
            let weight = u32::from(read_from::<R, u16>(r)?) + 1;
            if let Some(&(last, _)) = header.last() {
                if last >= key {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("keys out of order: {} then {}", last, key),
                    ));
                }
            }
            header.push((key, weight));
        }

        // offsets exist for random-access skipping; a sequential decode
        // has no use for them
        for _ in 0..len {
            read_from::<R, u32>(r)?;
        }

        for (key, weight) in header {
            let block = if weight as usize > SEQ_MAX_LEN {
                let arr = read_from::<R, Arr64>(r)?;
                if arr.weight != weight {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("weight mismatch: header {} payload {}", weight, arr.weight),
                    ));
                }
                Block::Arr(arr)
            } else {
                let mut seq = Seq16 {
                    vector: vec![0; weight as usize],
                };
                seq.read_from(r)?;
                Block::Seq(seq)
            };
            self.entries.push(Keyed { key, block });
        }
        Ok(())
    }
}
