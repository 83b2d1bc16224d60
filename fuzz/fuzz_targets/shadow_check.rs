#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nodearray::NodeArray;

const MAX: u32 = 256 * 16;

#[derive(Arbitrary, Debug)]
enum ArrayMethod {
    Get { key: u16 },
    Orr { key: u16, val: u8 },
    Bic { key: u16, val: u8 },
    Union { keys: Vec<(u16, u8)> },
    Iter,
}

#[derive(Arbitrary, Debug)]
struct Input {
    max_sparse: u8,
    methods: Vec<ArrayMethod>,
}

fuzz_target!(|input: Input| {
    let max_sparse = input.max_sparse as u32;
    let mut array = NodeArray::new();
    let mut flat = vec![0u8; MAX as usize];

    for m_c in input.methods.chunks(256) {
        for m in m_c {
            match m {
                ArrayMethod::Get { key } => {
                    let key = *key as u32 % MAX;
                    assert_eq!(array.get(key, MAX), flat[key as usize]);
                }
                ArrayMethod::Orr { key, val } => {
                    let key = *key as u32 % MAX;
                    array.orr(key, *val, max_sparse, MAX);
                    flat[key as usize] |= *val;
                }
                ArrayMethod::Bic { key, val } => {
                    let key = *key as u32 % MAX;
                    array.bic(key, *val, MAX);
                    flat[key as usize] &= !*val;
                }
                ArrayMethod::Union { keys } => {
                    let mut src = NodeArray::new();
                    for (key, val) in keys.iter().take(64) {
                        let key = *key as u32 % MAX;
                        src.orr(key, *val, u32::MAX, MAX);
                        flat[key as usize] |= *val;
                    }
                    array.orr_array(&src, max_sparse, MAX);
                }
                ArrayMethod::Iter => {
                    let mut last = None;
                    for (key, val) in array.iter() {
                        assert_ne!(val, 0);
                        assert_eq!(flat[key as usize], val);
                        assert!(last < Some(key));
                        last = Some(key);
                    }
                }
            }
        }

        for key in 0..MAX {
            assert_eq!(array.get(key, MAX), flat[key as usize]);
        }
    }

    let live = flat.iter().filter(|v| **v != 0).count();
    assert_eq!(array.iter().count(), live);
});
