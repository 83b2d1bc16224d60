use rand::prelude::StdRng;
use rand::{Rng, SeedableRng};

use crate::NodeArray;


const UNBOUNDED: u32 = u32::MAX;
const KEY_RANGE: u32 = 1000;
const CHECK_RANGE: u32 = 1000 * 16;

/// Flat reference model: one byte per key, no cleverness.
struct Shadow {
    values: Vec<u8>,
}

impl Shadow {
    fn new(max: u32) -> Self {
        Self {
            values: vec![0; max as usize],
        }
    }

    fn orr(&mut self, key: u32, value: u8) {
        self.values[key as usize] |= value;
    }

    fn bic(&mut self, key: u32, value: u8) {
        self.values[key as usize] &= !value;
    }

    fn get(&self, key: u32) -> u8 {
        self.values[key as usize]
    }

    fn entries(&self) -> Vec<(u32, u8)> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0)
            .map(|(k, v)| (k as u32, *v))
            .collect()
    }

    fn assert_matches(&self, a: &NodeArray, max: u32) {
        for key in 0..self.values.len() as u32 {
            assert_eq!(a.get(key, max), self.get(key), "key {key}");
        }
        a.check_invariants();
    }
}

/// Inserts `count - 1` distinct keys below [`KEY_RANGE`], key `i` getting value
/// `i`, and checks the whole checked range after every insertion. Returns the
/// keys in insertion order.
fn populate(
    a: &mut NodeArray,
    shadow: &mut Shadow,
    rng: &mut StdRng,
    count: u8,
    max_sparse: u32,
    max: u32,
) -> Vec<u32> {
    let mut inserted = Vec::with_capacity(count as usize);
    for i in 1..count {
        let key = loop {
            let key = rng.gen_range(0..KEY_RANGE);
            if a.get(key, max) == 0 {
                break key;
            }
        };

        assert_eq!(shadow.get(key), 0);
        shadow.orr(key, i);
        a.orr(key, i, max_sparse, max);
        inserted.push(key);

        shadow.assert_matches(a, max);
    }
    inserted
}

#[test]
fn logs_migration() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .without_time()
        .with_target(false)
        .try_init();

    let max = 256;
    let mut a = NodeArray::new();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..32 {
        a.orr(rng.gen_range(0..max), 1, 4, max);
    }
    assert!(!a.is_sparse(max));
}
