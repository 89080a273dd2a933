// ============================================================
// Layer 4 — Train/Test Splitter
// ============================================================
// Two splits happen before training:
//
//   1. Train / test (80/20), shuffled with a FIXED seed so the
//      same dataset always yields the same held-out test set.
//      The test size is rounded up: ceil(n * test_fraction).
//
//   2. Validation hold-out: the LAST fraction of the training
//      split (no extra shuffling). It is only used to monitor
//      the loss, never to update weights.
//
// Uses a seeded StdRng with the Fisher-Yates shuffle from
// rand::seq::SliceRandom.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split into (train, test).
pub fn split_train_test<T>(mut samples: Vec<T>, test_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total  = samples.len();
    let n_test = ((total as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.min(total);

    // After split_off: samples = test part, train = the rest
    let train = samples.split_off(n_test);

    tracing::debug!(
        "Train/test split: {} training, {} test (seed {})",
        train.len(),
        samples.len(),
        seed
    );

    (train, samples)
}

/// Hold out the trailing `validation_fraction` of `samples`.
pub fn split_validation_tail<T>(mut samples: Vec<T>, validation_fraction: f64) -> (Vec<T>, Vec<T>) {
    let total    = samples.len();
    let split_at = ((total as f64) * (1.0 - validation_fraction)).floor() as usize;
    let split_at = split_at.min(total);

    let val = samples.split_off(split_at);
    (samples, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, test)     = split_train_test(items, 0.2, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(),  20);
    }

    #[test]
    fn test_test_size_rounds_up() {
        let items: Vec<usize> = (0..11).collect();
        let (train, test)     = split_train_test(items, 0.2, 42);
        assert_eq!(test.len(),  3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = split_train_test((0..50).collect::<Vec<usize>>(), 0.2, 42);
        let b = split_train_test((0..50).collect::<Vec<usize>>(), 0.2, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_all_items_preserved() {
        let (mut train, test) = split_train_test((0..50).collect::<Vec<usize>>(), 0.3, 7);
        train.extend(test);
        train.sort();
        assert_eq!(train, (0..50).collect::<Vec<usize>>());
    }

    #[test]
    fn test_empty_dataset() {
        let (train, test) = split_train_test(Vec::<usize>::new(), 0.2, 42);
        assert!(train.is_empty());
        assert!(test.is_empty());
    }

    #[test]
    fn test_validation_is_the_tail() {
        let (train, val) = split_validation_tail((0..10).collect::<Vec<usize>>(), 0.2);
        assert_eq!(train, (0..8).collect::<Vec<usize>>());
        assert_eq!(val, vec![8, 9]);
    }
}
