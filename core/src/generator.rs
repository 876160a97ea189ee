use alloc::vec::Vec;
use rand::Rng;
use rand::RngExt;

use crate::Coord2;

/// Draws `count` distinct tiles uniformly at random, without replacement.
///
/// The draw runs a partial Fisher-Yates shuffle over the owned candidate
/// vector, so the caller's source of candidates is never reordered. A count
/// larger than the pool is clamped to the pool size.
pub fn sample_tiles<R: Rng>(rng: &mut R, mut candidates: Vec<Coord2>, count: usize) -> Vec<Coord2> {
    let count = count.min(candidates.len());

    // after i swaps the prefix [..i] is a uniform sample of the pool
    for i in 0..count {
        let j = rng.random_range(i..candidates.len());
        candidates.swap(i, j);
    }

    candidates.truncate(count);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn pool(len: u8) -> Vec<Coord2> {
        (0..len).map(|x| (x, 0)).collect()
    }

    #[test]
    fn sample_is_distinct_and_from_the_pool() {
        let mut rng = SmallRng::seed_from_u64(42);
        let candidates = pool(20);

        let sample = sample_tiles(&mut rng, candidates.clone(), 7);

        assert_eq!(sample.len(), 7);
        for (i, tile) in sample.iter().enumerate() {
            assert!(candidates.contains(tile));
            assert!(!sample[i + 1..].contains(tile));
        }
    }

    #[test]
    fn sample_of_the_whole_pool_is_a_permutation() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut sample = sample_tiles(&mut rng, pool(10), 10);

        sample.sort_unstable();
        assert_eq!(sample, pool(10));
    }

    #[test]
    fn oversized_count_clamps_to_the_pool() {
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(sample_tiles(&mut rng, pool(3), 100).len(), 3);
        assert_eq!(sample_tiles(&mut rng, vec![], 5), vec![]);
    }

    #[test]
    fn same_seed_reproduces_the_draw() {
        let mut a = SmallRng::seed_from_u64(99);
        let mut b = SmallRng::seed_from_u64(99);
        assert_eq!(
            sample_tiles(&mut a, pool(30), 12),
            sample_tiles(&mut b, pool(30), 12)
        );
    }

    #[test]
    fn every_candidate_is_eventually_drawn() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut seen = [false; 6];

        for _ in 0..200 {
            for (x, _) in sample_tiles(&mut rng, pool(6), 2) {
                seen[x as usize] = true;
            }
        }

        assert!(seen.iter().all(|&hit| hit));
    }
}
