use rand::Rng;

/// Strategy for picking which pending candidate to look at next.
///
/// `select` receives the number of candidates (always non-zero) and returns the index
/// of the chosen one. Candidates are kept in insertion order, oldest first.
pub trait FrontierPolicy {
    fn select<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> usize;
}

/// Every frontier entry is equally likely.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformRandom;

impl FrontierPolicy for UniformRandom {
    fn select<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> usize {
        rng.random_range(0..len)
    }
}

/// Favors the most recently inserted entries, which tends to extend the corridor
/// that was just carved.
#[derive(Debug, Clone, Copy)]
pub struct RecencyWeighted {
    /// How many of the newest entries get the bias.
    pub window: usize,
    /// Probability of picking inside the window.
    pub bias: f64,
}

impl Default for RecencyWeighted {
    fn default() -> Self {
        Self {
            window: 4,
            bias: 0.8,
        }
    }
}

impl FrontierPolicy for RecencyWeighted {
    fn select<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> usize {
        if len <= self.window {
            return rng.random_range(0..len);
        }
        if rng.random_bool(self.bias) {
            len - 1 - rng.random_range(0..self.window)
        } else {
            rng.random_range(0..len - self.window)
        }
    }
}

/// Unweighted pick among the openable neighbors of the cell currently being carved
/// from. The candidates are local to that cell rather than a maze-wide frontier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Adjacent;

impl FrontierPolicy for Adjacent {
    fn select<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> usize {
        rng.random_range(0..len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::test_rng::{MaxRng, ZeroRng};
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_uniform_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in 1..20 {
            for _ in 0..50 {
                assert!(UniformRandom.select(len, &mut rng) < len);
            }
        }
        assert_eq!(UniformRandom.select(5, &mut ZeroRng), 0);
        assert_eq!(Adjacent.select(3, &mut ZeroRng), 0);
    }

    #[test]
    fn test_weighted_small_frontier_is_uniform() {
        let policy = RecencyWeighted::default();
        assert_eq!(policy.select(4, &mut ZeroRng), 0);
        assert_eq!(policy.select(4, &mut MaxRng), 3);
    }

    #[test]
    fn test_weighted_prefers_recent_entries() {
        let policy = RecencyWeighted::default();
        // Bias coin lands inside the window, first window slot is the newest entry
        assert_eq!(policy.select(10, &mut ZeroRng), 9);
        // Bias coin misses the window: last entry outside it
        assert_eq!(policy.select(10, &mut MaxRng), 5);
    }

    #[test]
    fn test_weighted_distribution() {
        let policy = RecencyWeighted::default();
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 10_000;
        let recent = (0..trials)
            .filter(|_| policy.select(20, &mut rng) >= 16)
            .count();
        let ratio = recent as f64 / trials as f64;
        assert!((0.75..0.85).contains(&ratio), "ratio was {}", ratio);
    }
}
