use nodearray::{Limits, NodeArray, Representation};
use proptest::prelude::*;

const MAX: u32 = 64 * 16;

#[derive(Clone, Debug)]
enum Op {
    Orr(u32, u8),
    Bic(u32, u8),
    Get(u32),
    Union(Vec<(u32, u8)>),
}

fn key_strategy() -> impl Strategy<Value = u32> + Clone {
    // Mostly clustered keys so blocks fill up, with some spread across the range.
    prop_oneof![
        3 => 0u32..128,
        1 => 0u32..MAX,
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        45 => (key.clone(), any::<u8>()).prop_map(|(k, v)| Op::Orr(k, v)),
        30 => (key.clone(), any::<u8>()).prop_map(|(k, v)| Op::Bic(k, v)),
        20 => key.clone().prop_map(Op::Get),
        5 => prop::collection::vec((key.clone(), 1u8..=255), 0..32).prop_map(Op::Union),
    ];
    prop::collection::vec(op, 0..=500)
}

fn run(ops: &[Op], max_sparse: u32) -> Result<NodeArray, TestCaseError> {
    let mut a = NodeArray::new();
    let mut model = vec![0u8; MAX as usize];
    let mut was_dense = false;

    for op in ops {
        match op {
            Op::Orr(key, value) => {
                a.orr(*key, *value, max_sparse, MAX);
                model[*key as usize] |= *value;
                prop_assert_eq!(a.get(*key, MAX) & *value, *value);
            }
            Op::Bic(key, value) => {
                a.bic(*key, *value, MAX);
                model[*key as usize] &= !*value;
                prop_assert_eq!(a.get(*key, MAX) & *value, 0);
            }
            Op::Get(key) => {
                prop_assert_eq!(a.get(*key, MAX), model[*key as usize]);
            }
            Op::Union(entries) => {
                let mut src = NodeArray::new();
                for (key, value) in entries {
                    src.orr(*key, *value, u32::MAX, MAX);
                    model[*key as usize] |= *value;
                }
                a.orr_array(&src, max_sparse, MAX);
            }
        }

        if was_dense {
            prop_assert_eq!(a.representation(), Representation::Dense);
        }
        was_dense = !a.is_sparse(MAX);
    }

    for key in 0..MAX {
        prop_assert_eq!(a.get(key, MAX), model[key as usize]);
    }
    let expected: Vec<(u32, u8)> = model
        .iter()
        .enumerate()
        .filter(|(_, v)| **v != 0)
        .map(|(k, v)| (k as u32, *v))
        .collect();
    let got: Vec<(u32, u8)> = a.iter().collect();
    prop_assert_eq!(got, expected);

    for (base, values) in a.blocks() {
        prop_assert_eq!(base % 16, 0);
        prop_assert!(values.iter().any(|v| *v != 0));
    }

    Ok(a)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_shadow_unbounded(ops in ops_strategy()) {
        run(&ops, u32::MAX)?;
    }

    #[test]
    fn prop_shadow_small_max_sparse(ops in ops_strategy()) {
        run(&ops, 3)?;
    }

    #[test]
    fn prop_migration_is_transparent(ops in ops_strategy()) {
        let early = run(&ops, 1)?;
        let late = run(&ops, u32::MAX)?;
        prop_assert!(early.iter().eq(late.iter()));
        for key in 0..MAX {
            prop_assert_eq!(early.get(key, MAX), late.get(key, MAX));
        }
    }
}

#[test]
fn concrete_scenario() {
    let limits = Limits::unbounded_sparse(1000 * 16).unwrap();
    let mut a = NodeArray::new();

    a.orr_in(5, 0x03, &limits);
    assert_eq!(a.get_in(5, &limits), 3);
    a.orr_in(5, 0x04, &limits);
    assert_eq!(a.get_in(5, &limits), 7);
    a.bic_in(5, 0x01, &limits);
    assert_eq!(a.get_in(5, &limits), 6);
    a.bic_in(5, 0x06, &limits);
    assert_eq!(a.get_in(5, &limits), 0);
    assert_eq!(a.iter().count(), 0);
}

#[test]
fn concrete_migration_scenario() {
    let limits = Limits::new(2, 1000 * 16).unwrap();
    let mut a = NodeArray::new();

    for (i, key) in [3u32, 700, 9000].into_iter().enumerate() {
        a.orr_in(key, 1, &limits);
        assert_eq!(a.is_sparse_in(&limits), i < 2);
    }
    for key in [3, 700, 9000] {
        assert_eq!(a.get_in(key, &limits), 1);
    }
}

#[test]
fn checked_keys() {
    let limits = Limits::new(16, 256).unwrap();
    assert!(limits.check_key(255).is_ok());
    assert!(limits.check_key(256).is_err());
    assert!(Limits::new(16, 0).is_err());
}
