use nodearray::NodeArray;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use shumai::{config, ShumaiBench};
use std::{cell::UnsafeCell, fmt::Display};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MAX: u32 = 1 << 20;
const MAX_SPARSE: u32 = 4096;

#[derive(Serialize, Clone, Copy, Debug, Deserialize)]
pub enum Workload {
    ReadOnly,
    OrrOnly,
    OrrBic,
    Iterate,
}

impl Display for Workload {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Serialize, Clone, Copy, Debug, Deserialize)]
pub enum IndexType {
    NodeArray,
    HashMap,
    Flat,
}

impl Display for IndexType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[config(path = "bench/benchmark.toml")]
pub struct Basic {
    pub name: String,
    pub threads: Vec<usize>,
    pub time: usize,
    #[matrix]
    pub workload: Workload,
    #[matrix]
    pub index_type: IndexType,
}

struct TestBench<Index: FlagIndex> {
    index: Index,
    initial_cnt: usize,
}

/// Every implementation is single threaded; the benchmark must run with one
/// thread.
trait FlagIndex: Send + Sync {
    fn orr(&self, key: u32, value: u8);
    fn bic(&self, key: u32, value: u8);
    fn get(&self, key: u32) -> u8;
    fn live(&self) -> usize;
}

struct NodeArrayWrapper {
    array: UnsafeCell<NodeArray>,
}

unsafe impl Send for NodeArrayWrapper {}
unsafe impl Sync for NodeArrayWrapper {}

impl FlagIndex for NodeArrayWrapper {
    fn orr(&self, key: u32, value: u8) {
        unsafe { (*self.array.get()).orr(key, value, MAX_SPARSE, MAX) }
    }

    fn bic(&self, key: u32, value: u8) {
        unsafe { (*self.array.get()).bic(key, value, MAX) }
    }

    fn get(&self, key: u32) -> u8 {
        unsafe { (*self.array.get()).get(key, MAX) }
    }

    fn live(&self) -> usize {
        unsafe { (*self.array.get()).iter().count() }
    }
}

struct HashMapWrapper {
    map: UnsafeCell<ahash::AHashMap<u32, u8>>, // only allow single thread access
}

unsafe impl Send for HashMapWrapper {}
unsafe impl Sync for HashMapWrapper {}

impl FlagIndex for HashMapWrapper {
    fn orr(&self, key: u32, value: u8) {
        if value == 0 {
            return;
        }
        unsafe {
            *(*self.map.get()).entry(key).or_insert(0) |= value;
        }
    }

    fn bic(&self, key: u32, value: u8) {
        let map = unsafe { &mut *self.map.get() };
        if let Some(v) = map.get_mut(&key) {
            *v &= !value;
            if *v == 0 {
                map.remove(&key);
            }
        }
    }

    fn get(&self, key: u32) -> u8 {
        unsafe { (*self.map.get()).get(&key).copied().unwrap_or(0) }
    }

    fn live(&self) -> usize {
        unsafe { (*self.map.get()).len() }
    }
}

struct FlatWrapper {
    values: UnsafeCell<Vec<u8>>,
}

unsafe impl Send for FlatWrapper {}
unsafe impl Sync for FlatWrapper {}

impl FlagIndex for FlatWrapper {
    fn orr(&self, key: u32, value: u8) {
        unsafe { (*self.values.get())[key as usize] |= value }
    }

    fn bic(&self, key: u32, value: u8) {
        unsafe { (*self.values.get())[key as usize] &= !value }
    }

    fn get(&self, key: u32) -> u8 {
        unsafe { (*self.values.get())[key as usize] }
    }

    fn live(&self) -> usize {
        unsafe { (*self.values.get()).iter().filter(|v| **v != 0).count() }
    }
}

/// Spreads the initial keys over the whole key space, the way live node
/// indices end up spread over a large function.
fn initial_key(i: usize) -> u32 {
    const MULTIPLIER: u32 = 0x9e37_79b9;
    (i as u32).wrapping_mul(MULTIPLIER) % MAX
}

impl<Index: FlagIndex> ShumaiBench for TestBench<Index> {
    type Config = Basic;
    type Result = usize;

    fn load(&mut self) -> Option<serde_json::Value> {
        for i in 0..self.initial_cnt {
            self.index.orr(initial_key(i), 1);
        }
        None
    }

    fn run(&self, context: shumai::Context<Self::Config>) -> Self::Result {
        let mut op_cnt = 0;
        let mut rng = thread_rng();

        context.wait_for_start();

        let mut i = 0;
        while context.is_running() {
            match context.config.workload {
                Workload::ReadOnly => {
                    if i == self.initial_cnt {
                        i = 0;
                    }
                    assert_ne!(self.index.get(initial_key(i)), 0);
                    i += 1;
                }
                Workload::OrrOnly => {
                    let key = rng.gen_range(0..MAX);
                    self.index.orr(key, rng.gen());
                }
                Workload::OrrBic => {
                    let key = rng.gen_range(0..MAX);
                    if rng.gen_bool(0.5) {
                        self.index.orr(key, rng.gen());
                    } else {
                        self.index.bic(key, 0xff);
                    }
                }
                Workload::Iterate => {
                    assert!(self.index.live() > 0);
                }
            }

            op_cnt += 1;
        }
        op_cnt
    }

    fn cleanup(&mut self) -> Option<serde_json::Value> {
        None
    }
}

fn main() {
    let config = Basic::load().expect("Failed to parse config!");
    let repeat = 3;

    for c in config.iter() {
        if c.threads.len() > 1 || c.threads[0] != 1 {
            panic!("{} only supports a single thread!", c.index_type);
        }
        let initial_cnt = 2_000;
        match c.index_type {
            IndexType::NodeArray => {
                let mut test_bench = TestBench {
                    index: NodeArrayWrapper {
                        array: UnsafeCell::new(NodeArray::new()),
                    },
                    initial_cnt,
                };
                let result = shumai::run(&mut test_bench, c, repeat);
                result.write_json().unwrap();
            }
            IndexType::HashMap => {
                let mut test_bench = TestBench {
                    index: HashMapWrapper {
                        map: UnsafeCell::new(ahash::AHashMap::with_capacity(initial_cnt)),
                    },
                    initial_cnt,
                };
                let result = shumai::run(&mut test_bench, c, repeat);
                result.write_json().unwrap();
            }
            IndexType::Flat => {
                let mut test_bench = TestBench {
                    index: FlatWrapper {
                        values: UnsafeCell::new(vec![0; MAX as usize]),
                    },
                    initial_cnt,
                };
                let result = shumai::run(&mut test_bench, c, repeat);
                result.write_json().unwrap();
            }
        }
    }
}
