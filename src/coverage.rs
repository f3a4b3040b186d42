use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::candidate::Candidate;

/// How many selections each market contributes to a pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketCoverage {
    pub total_selections: usize,
    /// Most common market first; ties by market label.
    pub by_market: Vec<(String, usize)>,
    pub matches: usize,
    pub avg_markets_per_match: f64,
}

impl MarketCoverage {
    pub fn from_pool(pool: &[Candidate]) -> Self {
        let mut by_market: HashMap<&str, usize> = HashMap::new();
        let mut by_match: HashMap<&str, HashSet<&str>> = HashMap::new();
        for c in pool {
            *by_market.entry(c.market.as_str()).or_default() += 1;
            by_match
                .entry(c.match_id.as_str())
                .or_default()
                .insert(c.market.as_str());
        }

        let mut by_market: Vec<(String, usize)> = by_market
            .into_iter()
            .map(|(m, n)| (m.to_string(), n))
            .collect();
        by_market.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let matches = by_match.len();
        let avg_markets_per_match = if matches == 0 {
            0.0
        } else {
            let sum: usize = by_match.values().map(HashSet::len).sum();
            ((sum as f64 / matches as f64) * 100.0).round() / 100.0
        };

        Self {
            total_selections: pool.len(),
            by_market,
            matches,
            avg_markets_per_match,
        }
    }
}

impl fmt::Display for MarketCoverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total selections: {}", self.total_selections)?;
        for (market, count) in &self.by_market {
            writeln!(f, "{market:<12} : {count}")?;
        }
        write!(
            f,
            "Matches seen: {} | avg markets/match: {:.2}",
            self.matches, self.avg_markets_per_match
        )
    }
}
