//! Disjoint combination search.
//!
//! Walks the pool depth-first in its given order, choosing strictly increasing
//! indices so every subset is seen at most once, and never placing two
//! selections from the same match on one ticket. The first combination whose
//! product lands inside the rule's range ends the search. Otherwise the best
//! tolerance-band combination (closest to the range midpoint) wins, and failing
//! that the combination closest to the range at all.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::candidate::Candidate;
use crate::rule::{OddsRange, TicketRule};

pub const DEFAULT_MAX_VISITS: u64 = 200_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Upper bound on selections placed into a partial ticket before giving up.
    pub max_visits: u64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_visits: DEFAULT_MAX_VISITS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Product inside [min, max].
    Exact,
    /// Inside the tolerance band only.
    Near,
    /// Best available distance; tolerance band missed too.
    Closest,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Exact => "exact",
            TicketStatus::Near => "near",
            TicketStatus::Closest => "closest",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub status: TicketStatus,
    pub product: f64,
    pub range: OddsRange,
    pub tolerance_range: OddsRange,
    pub selections: Vec<Candidate>,
}

impl Ticket {
    pub fn display_product(&self) -> String {
        format!("{:.2}", self.product)
    }

    pub fn match_ids(&self) -> impl Iterator<Item = &str> {
        self.selections.iter().map(|s| s.match_id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub ticket: Option<Ticket>,
    pub visits: u64,
    /// The visit ceiling cut the search short.
    pub truncated: bool,
}

pub fn round_product(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// `rule` is expected to have passed [`TicketRule::validate`]. Candidates with
/// non-finite odds are never placed.
pub fn find_ticket(pool: &[Candidate], rule: &TicketRule, limits: SearchLimits) -> SearchOutcome {
    debug_assert!(rule.validate().is_ok(), "invalid ticket rule: {rule:?}");
    if rule.size == 0 || pool.len() < rule.size {
        debug!(size = rule.size, pool = pool.len(), "pool too small for ticket");
        return SearchOutcome {
            ticket: None,
            visits: 0,
            truncated: false,
        };
    }

    let mut search = Search::new(pool, rule, limits);
    search.descend(0, 1.0);

    let visits = search.visits;
    let truncated = search.truncated;
    if truncated {
        warn!(
            visits,
            size = rule.size,
            pool = pool.len(),
            "visit ceiling reached, using best combination so far"
        );
    } else {
        debug!(visits, size = rule.size, pool = pool.len(), "ticket search finished");
    }

    let ticket = search.into_ticket();
    SearchOutcome {
        ticket,
        visits,
        truncated,
    }
}

#[derive(Debug, Clone)]
struct Found {
    picks: Vec<usize>,
    product: f64,
    /// Distance to the midpoint for the band tier, to the range for the any tier.
    score: f64,
}

struct Search<'a> {
    pool: &'a [Candidate],
    rule: &'a TicketRule,
    range: OddsRange,
    band: OddsRange,
    midpoint: f64,
    max_visits: u64,
    // Products only grow when every odd is above 1.0, which is what makes pruning sound.
    monotone: bool,
    chosen: Vec<usize>,
    used: HashSet<&'a str>,
    visits: u64,
    truncated: bool,
    exact: Option<Found>,
    near: Option<Found>,
    any: Option<Found>,
}

impl<'a> Search<'a> {
    fn new(pool: &'a [Candidate], rule: &'a TicketRule, limits: SearchLimits) -> Self {
        Self {
            pool,
            rule,
            range: rule.range(),
            band: rule.tolerance_band(),
            midpoint: rule.midpoint(),
            max_visits: limits.max_visits,
            monotone: pool
                .iter()
                .filter(|c| c.odd.is_finite())
                .all(|c| c.odd > 1.0),
            chosen: Vec::with_capacity(rule.size),
            used: HashSet::with_capacity(rule.size),
            visits: 0,
            truncated: false,
            exact: None,
            near: None,
            any: None,
        }
    }

    fn finished(&self) -> bool {
        self.exact.is_some() || self.truncated
    }

    fn descend(&mut self, start: usize, partial: f64) {
        let need = self.rule.size - self.chosen.len();
        if need == 0 {
            self.evaluate(partial);
            return;
        }

        let pool = self.pool;
        for idx in start..pool.len() {
            if self.finished() || pool.len() - idx < need {
                return;
            }
            let candidate = &pool[idx];
            if !candidate.odd.is_finite() || self.used.contains(candidate.match_id.as_str()) {
                continue;
            }
            if self.visits >= self.max_visits {
                self.truncated = true;
                return;
            }
            self.visits += 1;

            let next = partial * candidate.odd;
            if self.cannot_improve(next) {
                continue;
            }

            self.used.insert(candidate.match_id.as_str());
            self.chosen.push(idx);
            self.descend(idx + 1, next);
            self.chosen.pop();
            self.used.remove(candidate.match_id.as_str());
        }
    }

    /// Above the band nothing can be exact or near, and every completion is at
    /// least as far from the range as `partial` already is.
    fn cannot_improve(&self, partial: f64) -> bool {
        if !self.monotone {
            return false;
        }
        let rounded = round_product(partial);
        if rounded <= self.band.max {
            return false;
        }
        self.any
            .as_ref()
            .is_some_and(|best| best.score <= rounded - self.range.max)
    }

    fn evaluate(&mut self, raw_product: f64) {
        let product = round_product(raw_product);

        if self.range.contains(product) {
            self.exact = Some(Found {
                picks: self.chosen.clone(),
                product,
                score: 0.0,
            });
            return;
        }

        if self.band.contains(product) {
            let score = (product - self.midpoint).abs();
            if self.near.as_ref().is_none_or(|best| score < best.score) {
                self.near = Some(Found {
                    picks: self.chosen.clone(),
                    product,
                    score,
                });
            }
        }

        let distance = self.rule.distance(product);
        if self.any.as_ref().is_none_or(|best| distance < best.score) {
            self.any = Some(Found {
                picks: self.chosen.clone(),
                product,
                score: distance,
            });
        }
    }

    fn into_ticket(self) -> Option<Ticket> {
        let (status, found) = if let Some(found) = self.exact {
            (TicketStatus::Exact, found)
        } else if let Some(found) = self.near {
            (TicketStatus::Near, found)
        } else {
            (TicketStatus::Closest, self.any?)
        };
        Some(Ticket {
            status,
            product: found.product,
            range: self.range,
            tolerance_range: self.band,
            selections: found.picks.iter().map(|&i| self.pool[i].clone()).collect(),
        })
    }
}
