use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use super::DatasetError;

/// Row indices of a shuffled train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed` and hold out `ceil(n * test_fraction)` rows.
///
/// Both sides always receive at least one row; fewer than two samples is an error.
pub fn train_test_split(
    n: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<SplitIndices, DatasetError> {
    if n < 2 {
        return Err(DatasetError::TooFewSamples(n));
    }
    let fraction = if test_fraction.is_finite() {
        test_fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let n_test = ((n as f64 * fraction).ceil() as usize).clamp(1, n - 1);

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);
    let train = order.split_off(n_test);
    Ok(SplitIndices { train, test: order })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_covers_every_row_once() {
        let split = train_test_split(10, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_share_rounds_up() {
        assert_eq!(train_test_split(3, 0.2, 42).unwrap().test.len(), 1);
        assert_eq!(train_test_split(11, 0.2, 42).unwrap().test.len(), 3);
        assert_eq!(train_test_split(2, 0.2, 42).unwrap().train.len(), 1);
    }

    #[test]
    fn exact_multiples_hold_out_exactly_one_fifth() {
        for (n, expected) in [(5, 1), (10, 2), (15, 3), (20, 4), (100, 20)] {
            let split = train_test_split(n, 0.2, 42).unwrap();
            assert_eq!(split.test.len(), expected, "n = {n}");
            assert_eq!(split.train.len(), n - expected, "n = {n}");
        }
    }

    #[test]
    fn same_seed_same_split() {
        let a = train_test_split(25, 0.2, 7).unwrap();
        let b = train_test_split(25, 0.2, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_sample_cannot_be_split() {
        assert!(matches!(
            train_test_split(1, 0.2, 42),
            Err(DatasetError::TooFewSamples(1))
        ));
        assert!(train_test_split(0, 0.2, 42).is_err());
    }
}
