// Synthetic training data for the placeholder churn model.
//
// Features are uniform in [0, 10) and labels are coin flips, so nothing
// learned from this data means anything. It only exists to give the
// scaler and classifier concrete parameters.

use rand::seq::SliceRandom;
use rand::Rng;

/// Number of synthetic samples generated for a fresh model.
pub const SYNTHETIC_SAMPLES: usize = 500;

/// Fraction of samples held out for the accuracy check.
pub const TEST_FRACTION: f64 = 0.2;

/// Upper bound (exclusive) of each synthetic feature value.
const FEATURE_RANGE: f64 = 10.0;

/// Labeled samples. `labels[i]` is 0 (active) or 1 (churn risk).
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Generate `n_samples` random samples with `n_features` features each.
pub fn generate<R: Rng + ?Sized>(rng: &mut R, n_samples: usize, n_features: usize) -> Dataset {
    let features = (0..n_samples)
        .map(|_| {
            (0..n_features)
                .map(|_| rng.random::<f64>() * FEATURE_RANGE)
                .collect()
        })
        .collect();
    let labels = (0..n_samples).map(|_| rng.random_range(0..=1)).collect();

    Dataset { features, labels }
}

/// Shuffle and split into (train, test). The test split gets
/// `ceil(len * test_fraction)` samples.
pub fn train_test_split<R: Rng + ?Sized>(
    dataset: Dataset,
    test_fraction: f64,
    rng: &mut R,
) -> (Dataset, Dataset) {
    let n_test = ((dataset.len() as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.min(dataset.len());

    let mut pairs: Vec<(Vec<f64>, u8)> = dataset
        .features
        .into_iter()
        .zip(dataset.labels)
        .collect();
    pairs.shuffle(rng);

    let train_pairs = pairs.split_off(n_test);
    (collect_pairs(train_pairs), collect_pairs(pairs))
}

fn collect_pairs(pairs: Vec<(Vec<f64>, u8)>) -> Dataset {
    let (features, labels) = pairs.into_iter().unzip();
    Dataset { features, labels }
}
