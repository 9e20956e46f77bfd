//! Synthetic categorical datasets shared by the integration tests.
#![allow(dead_code)]

use catfold_classifiers::data_handling::Dataset;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `n` records with `n_pos` positives. `signal` carries a category that is
/// far more frequent among positives; `noise` is independent of the label and
/// sometimes missing.
pub fn synthetic_dataset(n: usize, n_pos: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let columns = vec![
        "id".to_string(),
        "signal".to_string(),
        "noise".to_string(),
        "target".to_string(),
    ];
    let records = (0..n)
        .map(|i| {
            let target = i < n_pos;
            let signal = if target == rng.gen_bool(0.8) { "Hot" } else { "Cold" };
            let noise = match rng.gen_range(0..4) {
                0 => None,
                1 => Some("a"),
                2 => Some("b"),
                _ => Some("c"),
            };
            vec![
                Some(i.to_string()),
                Some(signal.to_string()),
                noise.map(str::to_string),
                Some(if target { "1" } else { "0" }.to_string()),
            ]
        })
        .collect();
    Dataset::new(columns, records).unwrap()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
