use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use crate::block::Block;
use crate::{and, and_not, flip, or, xor, Assign, BitMap, SEQ_MAX_LEN};

fn invariants(map: &BitMap) -> bool {
    let entries = &map.keymap.entries;
    let sorted = entries.windows(2).all(|w| w[0].key < w[1].key);
    let packed = entries.iter().all(|e| match &e.block {
        Block::Seq(seq) => !seq.vector.is_empty() && seq.vector.len() <= SEQ_MAX_LEN,
        Block::Arr(arr) => arr.weight as usize > SEQ_MAX_LEN,
    });
    sorted && packed
}

fn hashed(map: &BitMap) -> u64 {
    let mut hasher = DefaultHasher::new();
    map.hash(&mut hasher);
    hasher.finish()
}

quickcheck! {
    fn prop_commutativity(vec1: Vec<u32>, vec2: Vec<u32>) -> bool {
        let b1 = &BitMap::from(&vec1[..]);
        let b2 = &BitMap::from(&vec2[..]);
        and(b1, b2) == and(b2, b1)
            && or(b1, b2) == or(b2, b1)
            && xor(b1, b2) == xor(b2, b1)
    }

    fn prop_associativity(vec1: Vec<u32>, vec2: Vec<u32>, vec3: Vec<u32>) -> bool {
        let b1 = &BitMap::from(&vec1[..]);
        let b2 = &BitMap::from(&vec2[..]);
        let b3 = &BitMap::from(&vec3[..]);
        and(&and(b1, b2), b3) == and(b1, &and(b2, b3))
            && or(&or(b1, b2), b3) == or(b1, &or(b2, b3))
            && xor(&xor(b1, b2), b3) == xor(b1, &xor(b2, b3))
    }

    fn prop_distributivity(vec1: Vec<u32>, vec2: Vec<u32>, vec3: Vec<u32>) -> bool {
        let b1 = &BitMap::from(&vec1[..]);
        let b2 = &BitMap::from(&vec2[..]);
        let b3 = &BitMap::from(&vec3[..]);
        and(b1, &or(b2, b3)) == or(&and(b1, b2), &and(b1, b3))
    }

    fn prop_identities(vec: Vec<u32>) -> bool {
        let map = &BitMap::from(&vec[..]);
        let none = &BitMap::new();
        or(map, none) == *map
            && and(map, none) == *none
            && xor(map, none) == *map
            && and_not(map, none) == *map
            && and_not(map, map) == *none
            && xor(map, map) == *none
    }

    fn prop_cardinality(vec1: Vec<u32>, vec2: Vec<u32>) -> bool {
        let b1 = &BitMap::from(&vec1[..]);
        let b2 = &BitMap::from(&vec2[..]);
        let both = and(b1, b2).count1();
        or(b1, b2).count1() == b1.count1() + b2.count1() - both
            && xor(b1, b2).count1() == or(b1, b2).count1() - both
            && and_not(b1, b2).count1() == b1.count1() - both
    }

    fn prop_bits_sorted_and_consistent(vec: Vec<u32>) -> bool {
        let map = BitMap::from(&vec[..]);
        let out = map.to_vec();
        out.windows(2).all(|w| w[0] < w[1])
            && out == map.bits().collect::<Vec<u32>>()
            && out.len() as u64 == map.count1()
            && vec.iter().all(|&bit| map.contains(bit))
    }

    fn prop_assign_matches_static(vec1: Vec<u32>, vec2: Vec<u32>) -> bool {
        let b1 = &BitMap::from(&vec1[..]);
        let b2 = &BitMap::from(&vec2[..]);

        let mut v_and = b1.clone();
        v_and.and_assign(b2);
        let mut v_or = b1.clone();
        v_or.or_assign(b2);
        let mut v_xor = b1.clone();
        v_xor.xor_assign(b2);
        let mut v_and_not = b1.clone();
        v_and_not.and_not_assign(b2);

        v_and == and(b1, b2)
            && v_or == or(b1, b2)
            && v_xor == xor(b1, b2)
            && v_and_not == and_not(b1, b2)
    }

    fn prop_ops_keep_invariants(vec1: Vec<u32>, vec2: Vec<u32>) -> bool {
        let b1 = &BitMap::from(&vec1[..]);
        let b2 = &BitMap::from(&vec2[..]);
        invariants(&and(b1, b2))
            && invariants(&or(b1, b2))
            && invariants(&xor(b1, b2))
            && invariants(&and_not(b1, b2))
    }

    fn prop_flip_is_xor_with_range(vec: Vec<u32>, a: u32, b: u32) -> bool {
        let start = u64::from(a) % 100_000;
        let end = start + u64::from(b) % 10_000;
        let map = BitMap::from(&vec[..]);
        let range = BitMap::from_iter((start..end).map(|bit| bit as u32));
        flip(&map, start..end) == xor(&map, &range)
    }

    fn prop_flip_involution(vec: Vec<u32>, a: u32, b: u32) -> bool {
        let start = u64::from(a) % 100_000;
        let end = start + u64::from(b) % 10_000;
        let map = BitMap::from(&vec[..]);

        let out_of_place = flip(&flip(&map, start..end), start..end);
        let mut in_place = map.clone();
        in_place.flip(start..end);
        in_place.flip(start..end);

        out_of_place == map && in_place == map && invariants(&in_place)
    }

    fn prop_flip_forms_agree(vec: Vec<u32>, a: u32, b: u32) -> bool {
        let start = u64::from(a) % 100_000;
        let end = start + u64::from(b) % 10_000;
        let map = BitMap::from(&vec[..]);
        let mut in_place = map.clone();
        in_place.flip(start..end);
        in_place == flip(&map, start..end)
    }

    fn prop_read_write_identity(vec: Vec<u32>) -> bool {
        let b1 = BitMap::from(&vec[..]);
        let mut buf = Vec::with_capacity(2048);
        if b1.serialize_into(&mut buf).is_err() {
            return false;
        }
        if buf.len() != b1.serialized_size() {
            return false;
        }
        let b2 = BitMap::deserialize_from(&buf[..]).unwrap();
        b1 == b2 && b1.to_vec() == b2.to_vec()
    }

    fn prop_clone_independence(vec: Vec<u32>, bit: u32) -> bool {
        let map = BitMap::from(&vec[..]);
        let before = map.to_vec();
        let mut dup = map.clone();
        dup.insert(bit);
        dup.flip(0..1024);
        dup.remove(bit);
        map.to_vec() == before
    }

    fn prop_hash_agrees_with_eq(vec: Vec<u32>) -> bool {
        let b1 = BitMap::from(&vec[..]);
        let b2 = vec.iter().rev().collect::<BitMap>();
        b1 == b2 && hashed(&b1) == hashed(&b2)
    }
}

#[test]
fn cross_container_union_keys() {
    let out = or(&bitmap![1, 65_535], &bitmap![65_536, 131_071]);
    let keys = out.keymap.entries.iter().map(|e| e.key).collect::<Vec<u16>>();
    assert_eq!(keys, vec![0, 1]);
    assert_eq!(out.count1(), 4);
    for &bit in &[1, 65_535, 65_536, 131_071] {
        assert!(out.contains(bit));
    }
}

#[test]
fn flip_spans_every_touched_key() {
    let mut map = BitMap::new();
    map.flip(0..(1 << 20));
    assert_eq!(map.count1(), 1 << 20);
    assert_eq!(map.keymap.len(), 16);
    assert!(invariants(&map));

    map.flip(0..(1 << 20));
    assert!(map.is_empty());
}

#[test]
fn flip_reaches_the_last_key() {
    let mut map = BitMap::new();
    map.flip((1 << 32) - 4..(1 << 32));
    assert_eq!(map.to_vec(), vec![!0 - 3, !0 - 2, !0 - 1, !0]);
    assert!(invariants(&map));
}

#[test]
fn empty_range_flip_is_identity() {
    let map = bitmap![1, 2, 3];
    assert_eq!(flip(&map, 10..10), map);
    assert_eq!(flip(&map, 10..9), map);
    let mut dup = map.clone();
    dup.flip(10..10);
    assert_eq!(dup, map);
}

#[test]
fn removing_last_bit_drops_the_block() {
    let mut map = bitmap![42];
    assert_eq!(map.keymap.len(), 1);
    assert!(map.remove(42));
    assert_eq!(map.keymap.len(), 0);
    assert!(map.is_empty());
}
