use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::candidate::Candidate;
use crate::competition::CompetitionRanking;
use crate::error::{Result, TicketError};

pub const DEFAULT_MIN_ODD: f64 = 1.10;
pub const DEFAULT_MAX_ODD: f64 = 25.0;

/// Half-time, Asian handicap and exact-score style markets are too volatile to combine.
pub const DEFAULT_EXCLUDE_PATTERN: &str =
    r"(?i)(\bHT\b|half[- ]?time|first half|1st half|second half|2nd half|asian|exact|correct score)";

/// Single-leg odd that keeps a selection neither too short nor too volatile.
pub const SWEET_SPOT_ODD: f64 = 1.7;

static DEFAULT_EXCLUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_EXCLUDE_PATTERN).expect("static exclusion pattern"));

#[derive(Debug, Clone)]
pub struct PoolFilter {
    pub min_odd: f64,
    pub max_odd: f64,
    pub exclude_markets: Regex,
}

impl Default for PoolFilter {
    fn default() -> Self {
        Self {
            min_odd: DEFAULT_MIN_ODD,
            max_odd: DEFAULT_MAX_ODD,
            exclude_markets: DEFAULT_EXCLUDE.clone(),
        }
    }
}

impl PoolFilter {
    pub fn new(min_odd: f64, max_odd: f64, exclude_pattern: &str) -> Result<Self> {
        if !(min_odd.is_finite() && max_odd.is_finite()) || min_odd > max_odd {
            return Err(TicketError::Config(format!(
                "odd bounds must be finite with min <= max, got [{min_odd}, {max_odd}]"
            )));
        }
        let exclude_markets =
            Regex::new(exclude_pattern).map_err(|source| TicketError::InvalidPattern {
                pattern: exclude_pattern.to_string(),
                source,
            })?;
        Ok(Self {
            min_odd,
            max_odd,
            exclude_markets,
        })
    }

    pub fn accepts_odd(&self, odd: f64) -> bool {
        // Anything at or below 1.0 can't win money no matter what min_odd says.
        odd.is_finite() && odd > 1.0 && odd >= self.min_odd && odd <= self.max_odd
    }

    pub fn accepts_market(&self, market: &str) -> bool {
        !market.trim().is_empty() && !self.exclude_markets.is_match(market)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareStats {
    pub input: usize,
    pub dropped_odd: usize,
    pub dropped_market: usize,
    pub duplicates: usize,
    pub kept: usize,
}

/// Filtered, deduplicated candidates in search order (best first).
#[derive(Debug, Clone, Default)]
pub struct PreparedPool {
    candidates: Vec<Candidate>,
    stats: PrepareStats,
}

impl PreparedPool {
    pub fn prepare(
        raw: Vec<Candidate>,
        filter: &PoolFilter,
        ranking: &CompetitionRanking,
    ) -> Self {
        let mut stats = PrepareStats {
            input: raw.len(),
            ..PrepareStats::default()
        };

        let mut filtered = Vec::with_capacity(raw.len());
        for c in raw {
            if !filter.accepts_odd(c.odd) {
                stats.dropped_odd += 1;
                continue;
            }
            if !filter.accepts_market(&c.market) {
                stats.dropped_market += 1;
                continue;
            }
            filtered.push(c);
        }

        let before = filtered.len();
        let deduped = dedupe_keep_max_odd(filtered);
        stats.duplicates = before - deduped.len();

        let candidates = sort_by_preference(deduped, ranking);
        stats.kept = candidates.len();
        debug!(
            input = stats.input,
            dropped_odd = stats.dropped_odd,
            dropped_market = stats.dropped_market,
            duplicates = stats.duplicates,
            kept = stats.kept,
            "candidate pool prepared"
        );

        Self { candidates, stats }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn stats(&self) -> PrepareStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn match_count(&self) -> usize {
        self.candidates
            .iter()
            .map(|c| c.match_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Drops every market of the given matches, keeping the remaining order.
    pub fn without_matches(&self, match_ids: &HashSet<String>) -> Self {
        let candidates: Vec<Candidate> = self
            .candidates
            .iter()
            .filter(|c| !match_ids.contains(&c.match_id))
            .cloned()
            .collect();
        Self {
            stats: PrepareStats {
                kept: candidates.len(),
                ..self.stats
            },
            candidates,
        }
    }
}

/// One row per (match, market); a later row replaces an earlier one only with a strictly higher odd.
pub fn dedupe_keep_max_odd(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut out: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for c in candidates {
        let key = (c.match_id.clone(), c.market.clone());
        match index.get(&key) {
            Some(&pos) => {
                if c.odd > out[pos].odd {
                    out[pos] = c;
                }
            }
            None => {
                index.insert(key, out.len());
                out.push(c);
            }
        }
    }
    out
}

/// Competition tier, then market rank, then closeness to the sweet spot.
/// Match id and market settle the rest so the order never depends on input order.
pub fn sort_by_preference(candidates: Vec<Candidate>, ranking: &CompetitionRanking) -> Vec<Candidate> {
    let mut keyed: Vec<(usize, u8, f64, Candidate)> = candidates
        .into_iter()
        .map(|c| {
            let tier = ranking.score(c.competition.as_deref());
            let rank = c.kind().rank();
            let closeness = (c.odd - SWEET_SPOT_ODD).abs();
            (tier, rank, closeness, c)
        })
        .collect();
    keyed.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.cmp(&b.1))
            .then(a.2.total_cmp(&b.2))
            .then_with(|| a.3.match_id.cmp(&b.3.match_id))
            .then_with(|| a.3.market.cmp(&b.3.market))
    });
    keyed.into_iter().map(|(.., c)| c).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{PoolFilter, PreparedPool, dedupe_keep_max_odd};
    use crate::candidate::Candidate;
    use crate::competition::CompetitionRanking;

    fn c(id: &str, market: &str, odd: f64) -> Candidate {
        Candidate::new(id, format!("{id} Home - {id} Away"), market, odd)
    }

    #[test]
    fn filter_drops_bad_odds_and_volatile_markets() {
        let filter = PoolFilter::default();
        let raw = vec![
            c("m1", "1", f64::NAN),
            c("m2", "1", 1.0),
            c("m3", "1", 1.05),
            c("m4", "1", 40.0),
            c("m5", "HT 1", 1.80),
            c("m6", "Asian Handicap -1", 1.90),
            c("m7", "Correct Score 1-0", 7.0),
            c("m8", "1", 1.80),
        ];
        let pool = PreparedPool::prepare(raw, &filter, &CompetitionRanking::default());
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.candidates()[0].match_id, "m8");
        let stats = pool.stats();
        assert_eq!(stats.dropped_odd, 4);
        assert_eq!(stats.dropped_market, 3);
    }

    #[test]
    fn filter_never_accepts_odds_at_or_below_even() {
        let filter = PoolFilter::new(0.5, 10.0, "^$").expect("valid");
        assert!(!filter.accepts_odd(1.0));
        assert!(filter.accepts_odd(1.01));
        assert!(PoolFilter::new(3.0, 2.0, "x").is_err());
        assert!(PoolFilter::new(1.1, 10.0, "(").is_err());
    }

    #[test]
    fn dedupe_keeps_highest_odd_in_first_position() {
        let out = dedupe_keep_max_odd(vec![
            c("m1", "1", 1.50),
            c("m2", "1", 2.00),
            c("m1", "1", 1.60),
            c("m1", "1", 1.55),
            c("m1", "X", 3.30),
        ]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].match_id, "m1");
        assert!((out[0].odd - 1.60).abs() < 1e-12);
        assert_eq!(out[2].market, "X");
    }

    #[test]
    fn sort_prefers_competition_then_market_then_sweet_spot() {
        let ranking = CompetitionRanking::default();
        let raw = vec![
            c("a", "O2.5", 1.70).with_competition("England: Premier League"),
            c("b", "1", 2.60).with_competition("Kazakhstan: Cup"),
            c("c", "1", 2.40).with_competition("England: Premier League"),
            c("d", "1", 1.75).with_competition("England: Premier League"),
            c("e", "1X", 1.30).with_competition("UEFA Champions League"),
        ];
        let pool = PreparedPool::prepare(raw, &PoolFilter::default(), &ranking);
        let order: Vec<&str> = pool.candidates().iter().map(|c| c.match_id.as_str()).collect();
        assert_eq!(order, vec!["e", "d", "c", "a", "b"]);
    }

    #[test]
    fn order_is_independent_of_input_order() {
        let ranking = CompetitionRanking::default();
        let rows = vec![c("z", "1", 1.80), c("a", "2", 1.60), c("m", "X", 1.80)];
        let mut reversed = rows.clone();
        reversed.reverse();
        let p1 = PreparedPool::prepare(rows, &PoolFilter::default(), &ranking);
        let p2 = PreparedPool::prepare(reversed, &PoolFilter::default(), &ranking);
        assert_eq!(p1.candidates(), p2.candidates());
    }

    #[test]
    fn without_matches_removes_every_market_of_a_match() {
        let ranking = CompetitionRanking::default();
        let raw = vec![c("m1", "1", 1.50), c("m1", "X", 3.20), c("m2", "2", 1.90)];
        let pool = PreparedPool::prepare(raw, &PoolFilter::default(), &ranking);
        let used: HashSet<String> = ["m1".to_string()].into_iter().collect();
        let rest = pool.without_matches(&used);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest.candidates()[0].match_id, "m2");
        assert_eq!(pool.match_count(), 2);
    }
}
