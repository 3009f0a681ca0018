//! Seeded subsampling and stratified train/test split

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle and truncate to `sample_size` when there are more rows than that.
/// Smaller inputs are returned unchanged, and a size of 0 disables sampling.
pub fn subsample<T>(mut items: Vec<T>, sample_size: usize, seed: u64) -> Vec<T> {
    if sample_size == 0 || items.len() <= sample_size {
        return items;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);
    items.truncate(sample_size);
    items
}

/// Index sets of a train/test split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split indices so each class keeps (about) `test_fraction` of its rows in
/// the test set. A class with at least two rows always contributes one row
/// to each side.
pub fn stratified_split(labels: &[bool], test_fraction: f64, seed: u64) -> Split {
    let fraction = if test_fraction.is_finite() { test_fraction.clamp(0.0, 1.0) } else { 0.0 };
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for class in [false, true] {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == class)
            .map(|(i, _)| i)
            .collect();
        members.shuffle(&mut rng);

        let n = members.len();
        let mut n_test = (n as f64 * fraction).round() as usize;
        if fraction > 0.0 && n >= 2 {
            n_test = n_test.clamp(1, n - 1);
        }
        n_test = n_test.min(n);

        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Split { train, test }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsample_small_input_untouched() {
        let items = vec![1, 2, 3];
        assert_eq!(subsample(items.clone(), 10, 42), items);
    }

    #[test]
    fn test_subsample_zero_keeps_everything() {
        let items: Vec<u32> = (0..100).collect();
        assert_eq!(subsample(items.clone(), 0, 42), items);
    }

    #[test]
    fn test_subsample_truncates_deterministically() {
        let items: Vec<u32> = (0..100).collect();
        let a = subsample(items.clone(), 10, 42);
        let b = subsample(items, 10, 42);
        assert_eq!(a.len(), 10);
        assert_eq!(a, b);
    }

    #[test]
    fn test_stratified_split_keeps_both_classes() {
        let labels: Vec<bool> = (0..50).map(|i| i % 5 == 0).collect(); // 10 positive
        let split = stratified_split(&labels, 0.2, 42);

        assert_eq!(split.train.len() + split.test.len(), 50);
        assert_eq!(split.test.iter().filter(|&&i| labels[i]).count(), 2);
        assert_eq!(split.test.iter().filter(|&&i| !labels[i]).count(), 8);
        assert!(split.train.iter().any(|&i| labels[i]));
    }

    #[test]
    fn test_stratified_split_small_class() {
        let labels = vec![true, true, false, false, false];
        let split = stratified_split(&labels, 0.2, 1);
        assert!(split.test.iter().any(|&i| labels[i]));
        assert!(split.train.iter().any(|&i| labels[i]));
    }

    #[test]
    fn test_split_is_disjoint() {
        let labels: Vec<bool> = (0..30).map(|i| i % 2 == 0).collect();
        let split = stratified_split(&labels, 0.3, 7);
        for i in &split.test {
            assert!(!split.train.contains(i));
        }
    }
}
