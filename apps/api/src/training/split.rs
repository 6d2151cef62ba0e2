use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::training::TrainingError;

/// Row indices of each partition, in shuffled order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub holdout: Vec<usize>,
}

/// Stratified train/holdout split over binary labels.
///
/// Each class contributes `ceil(n · fraction)` rows to the holdout, clamped so
/// both partitions keep at least one row of every class. The same labels,
/// fraction and seed always give the same split.
pub fn stratified_split(labels: &[u8], fraction: f64, seed: u64) -> Result<Split, TrainingError> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(TrainingError::InvalidTestFraction(fraction));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut holdout = Vec::new();

    for class in [0u8, 1] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, y)| **y == class)
            .map(|(i, _)| i)
            .collect();
        if members.len() < 2 {
            return Err(TrainingError::InsufficientData {
                class,
                required: 2,
                found: members.len(),
            });
        }

        members.shuffle(&mut rng);
        let take = ((members.len() as f64 * fraction).ceil() as usize).clamp(1, members.len() - 1);
        holdout.extend_from_slice(&members[..take]);
        train.extend_from_slice(&members[take..]);
    }

    train.shuffle(&mut rng);
    holdout.shuffle(&mut rng);
    Ok(Split { train, holdout })
}
