//! Seek strategies and sampler configuration.
//!
//! A first-page listing either starts at the true beginning of the key space
//! or seeks to a pseudo-random lower bound produced by a weighted strategy
//! table. The table is injected configuration rather than inline literals,
//! so the sampler stays corpus-agnostic: operators whose buckets use a
//! different folder-naming convention supply their own prefixes.

use rand::Rng;

/// Default probability of listing from the true beginning of the key space,
/// keeping the lexicographically first photos reachable.
pub const DEFAULT_FULL_SCAN_PROBABILITY: f64 = 0.15;

/// Upper bound on favorites spliced into the first page.
pub const DEFAULT_FAVORITE_BACKFILL: usize = 3;

/// Month names as they appear in `YYYY_Month/` folder keys.
const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Generator for one plausible seek key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeekPattern {
    /// A random `YYYY_Month/` folder prefix within the year range (inclusive)
    YearMonth { start_year: u16, end_year: u16 },

    /// A literal key prefix (e.g. `events/`)
    Prefix(String),
}

impl SeekPattern {
    /// Produce a seek key from this pattern.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self {
            SeekPattern::YearMonth {
                start_year,
                end_year,
            } => {
                let year = rng.gen_range(*start_year..=*end_year);
                let month = MONTHS[rng.gen_range(0..MONTHS.len())];
                format!("{}_{}/", year, month)
            }
            SeekPattern::Prefix(prefix) => prefix.clone(),
        }
    }
}

/// One weighted entry in the seek strategy table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekStrategy {
    /// Relative selection weight (must be non-zero)
    pub weight: u32,

    pub pattern: SeekPattern,
}

impl SeekStrategy {
    pub fn new(weight: u32, pattern: SeekPattern) -> Self {
        Self { weight, pattern }
    }
}

/// Pick a strategy from the table by weighted random selection.
///
/// Returns None when the table is empty or all weights are zero.
pub(crate) fn pick_strategy<'a, R: Rng + ?Sized>(
    strategies: &'a [SeekStrategy],
    rng: &mut R,
) -> Option<&'a SeekStrategy> {
    let total: u64 = strategies.iter().map(|s| s.weight as u64).sum();
    if total == 0 {
        return None;
    }

    let mut roll = rng.gen_range(0..total);
    for strategy in strategies {
        let weight = strategy.weight as u64;
        if roll < weight {
            return Some(strategy);
        }
        roll -= weight;
    }

    None
}

/// How the final page ordering is produced.
///
/// Randomized ordering is a deliberate "shuffle for discovery" policy; it is
/// explicit here so tests can turn it off instead of fighting an unstable
/// comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShufflePolicy {
    /// Favorites first, each group shuffled per response
    #[default]
    Randomized,

    /// Favorites first, groups kept in listing order
    Preserve,
}

/// Discovery sampler configuration.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Probability of starting a first page from the true beginning
    pub full_scan_probability: f64,

    /// Weighted seek strategy table for sampled first pages
    pub strategies: Vec<SeekStrategy>,

    /// Maximum number of missed favorites spliced into the first page
    pub max_favorite_backfill: usize,

    pub shuffle: ShufflePolicy,

    /// Fixed RNG seed; None draws entropy per call (production)
    pub seed: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            full_scan_probability: DEFAULT_FULL_SCAN_PROBABILITY,
            strategies: vec![
                // The year/month convention dominates the corpus, so it
                // dominates selection.
                SeekStrategy::new(
                    8,
                    SeekPattern::YearMonth {
                        start_year: 2018,
                        end_year: 2024,
                    },
                ),
                SeekStrategy::new(1, SeekPattern::Prefix("events/".to_string())),
                SeekStrategy::new(1, SeekPattern::Prefix("trips/".to_string())),
            ],
            max_favorite_backfill: DEFAULT_FAVORITE_BACKFILL,
            shuffle: ShufflePolicy::Randomized,
            seed: None,
        }
    }
}

impl SamplerConfig {
    /// Replace the seek strategy table.
    pub fn with_strategies(mut self, strategies: Vec<SeekStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Set the probability of a full-range first page.
    pub fn with_full_scan_probability(mut self, probability: f64) -> Self {
        self.full_scan_probability = probability;
        self
    }

    /// Set the shuffle policy.
    pub fn with_shuffle(mut self, shuffle: ShufflePolicy) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Fix the RNG seed (tests).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
