//! Uniform single-pass sampling (reservoir algorithm R).

use std::collections::BTreeSet;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::errors::ExtractError;
use crate::normalize::parse_int;
use crate::source::CsvSource;

/// Fixed-capacity uniform sample over a stream of unknown length.
#[derive(Debug, Clone)]
pub struct Reservoir<T> {
    capacity: usize,
    seen: u64,
    items: Vec<T>,
}

impl<T> Reservoir<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seen: 0,
            items: Vec::new(),
        }
    }

    /// Offer the next stream item. The first `capacity` items are kept; the
    /// item at 1-based position `i` afterwards replaces slot `j` when a uniform
    /// draw `j` in `[1, i]` lands inside the reservoir.
    pub fn offer<R: Rng>(&mut self, item: T, rng: &mut R) {
        self.seen += 1;
        if self.items.len() < self.capacity {
            self.items.push(item);
            return;
        }
        if self.capacity == 0 {
            return;
        }
        let slot = rng.random_range(1..=self.seen);
        if slot <= self.capacity as u64 {
            self.items[(slot - 1) as usize] = item;
        }
    }

    /// Number of items offered so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Dedicated sampling stream for one purpose of a run.
pub fn sampling_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Sample exactly `n` distinct anchor ids from the `value` column of `pool`.
///
/// Values that do not parse as integers are skipped.
pub fn sample_anchor_ids(
    pool: &Path,
    n: usize,
    seed: u64,
    progress: bool,
) -> Result<BTreeSet<i64>, ExtractError> {
    let mut rng = sampling_rng(seed);
    let mut reservoir = Reservoir::new(n);

    CsvSource::open(pool, &["value"], progress)?.for_each_row(|row| {
        if let Some(id) = parse_int(row.get("value")) {
            reservoir.offer(id, &mut rng);
        }
        Ok(())
    })?;

    let pool_name = pool.display().to_string();
    if reservoir.seen() < n as u64 {
        return Err(ExtractError::InsufficientPool {
            pool: pool_name,
            requested: n,
            available: reservoir.seen(),
        });
    }

    let anchors: BTreeSet<i64> = reservoir.into_items().into_iter().collect();
    if anchors.len() < n {
        return Err(ExtractError::DuplicatePoolIds {
            pool: pool_name,
            requested: n,
            sampled: anchors.len(),
        });
    }

    info!(pool = %pool_name, anchors = anchors.len(), seed, "anchors sampled");
    Ok(anchors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pool: &[u32], n: usize, seed: u64) -> Vec<u32> {
        let mut rng = sampling_rng(seed);
        let mut reservoir = Reservoir::new(n);
        for item in pool {
            reservoir.offer(*item, &mut rng);
        }
        let mut items = reservoir.into_items();
        items.sort_unstable();
        items
    }

    #[test]
    fn same_seed_same_sample() {
        let pool: Vec<u32> = (0..500).collect();
        assert_eq!(sample(&pool, 25, 42), sample(&pool, 25, 42));
    }

    #[test]
    fn sample_of_whole_pool_is_the_pool() {
        let pool: Vec<u32> = (0..40).collect();
        assert_eq!(sample(&pool, 40, 7), pool);
    }

    #[test]
    fn inclusion_frequency_is_uniform() {
        let pool: Vec<u32> = (0..20).collect();
        let n = 5;
        let trials = 4000_u64;
        let mut hits = [0_u64; 20];

        for seed in 0..trials {
            for item in sample(&pool, n, seed) {
                hits[item as usize] += 1;
            }
        }

        // Expected inclusion rate is n / pool = 0.25 per item.
        for count in hits {
            let rate = count as f64 / trials as f64;
            assert!((rate - 0.25).abs() < 0.04, "inclusion rate {rate} out of range");
        }
    }

    fn pool_file(values: &[&str]) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("animeseed_pool_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("pool.csv");
        let mut contents = String::from("value\n");
        for value in values {
            contents.push_str(value);
            contents.push('\n');
        }
        std::fs::write(&path, contents).expect("write pool");
        path
    }

    #[test]
    fn huge_sample_size_is_an_insufficient_pool() {
        let pool = pool_file(&["1", "2", "3"]);
        let err = sample_anchor_ids(&pool, usize::MAX / 4, 42, false).expect_err("pool too small");
        assert!(matches!(err, ExtractError::InsufficientPool { available: 3, .. }));
    }

    #[test]
    fn whole_pool_file_is_sampled() {
        let pool = pool_file(&["5", "1", "9"]);
        let anchors = sample_anchor_ids(&pool, 3, 42, false).expect("sample");
        assert_eq!(anchors.into_iter().collect::<Vec<_>>(), vec![1, 5, 9]);
    }

    #[test]
    fn non_integer_pool_values_are_skipped() {
        let pool = pool_file(&["1", "abc", "", "2"]);
        let anchors = sample_anchor_ids(&pool, 2, 7, false).expect("sample");
        assert_eq!(anchors.into_iter().collect::<Vec<_>>(), vec![1, 2]);

        let err = sample_anchor_ids(&pool, 3, 7, false).expect_err("only two ids");
        assert!(matches!(err, ExtractError::InsufficientPool { available: 2, .. }));
    }

    #[test]
    fn duplicate_pool_ids_are_fatal() {
        let pool = pool_file(&["4", "4", "8"]);
        let err = sample_anchor_ids(&pool, 3, 1, false).expect_err("duplicate ids");
        assert!(matches!(
            err,
            ExtractError::DuplicatePoolIds {
                requested: 3,
                sampled: 2,
                ..
            }
        ));
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut rng = sampling_rng(1);
        let mut reservoir = Reservoir::new(0);
        reservoir.offer(1_u32, &mut rng);
        assert!(reservoir.is_empty());
        assert_eq!(reservoir.seen(), 1);
    }
}
