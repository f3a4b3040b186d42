use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::prepare::PreparedPool;
use crate::rule::TicketRule;
use crate::search::{SearchLimits, SearchOutcome, Ticket, find_ticket};

pub const COTA2: &str = "bilet_cota2";
pub const BILETUL_ZILEI: &str = "biletul_zilei";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketSpec {
    pub name: String,
    pub rule: TicketRule,
}

impl TicketSpec {
    pub fn new(name: impl Into<String>, rule: TicketRule) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }
}

/// The daily pair: the short two-leg ticket first, then the four-leg one.
pub fn default_specs() -> Vec<TicketSpec> {
    vec![
        TicketSpec::new(COTA2, TicketRule::cota2()),
        TicketSpec::new(BILETUL_ZILEI, TicketRule::biletul_zilei()),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub name: String,
    pub rule: TicketRule,
    pub outcome: SearchOutcome,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    pub entries: Vec<BatchEntry>,
}

impl Batch {
    pub fn ticket(&self, name: &str) -> Option<&Ticket> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .and_then(|e| e.outcome.ticket.as_ref())
    }

    pub fn used_match_ids(&self) -> HashSet<String> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.ticket.as_ref())
            .flat_map(|t| t.match_ids().map(str::to_string))
            .collect()
    }
}

/// Builds tickets in order; each one only sees matches no earlier ticket used.
pub fn build_batch(pool: &PreparedPool, specs: &[TicketSpec], limits: SearchLimits) -> Batch {
    let mut remaining = pool.clone();
    let mut entries = Vec::with_capacity(specs.len());

    for spec in specs {
        let outcome = find_ticket(remaining.candidates(), &spec.rule, limits);
        match &outcome.ticket {
            Some(ticket) => {
                info!(
                    ticket = %spec.name,
                    status = ticket.status.as_str(),
                    product = ticket.product,
                    legs = ticket.selections.len(),
                    visits = outcome.visits,
                    "ticket built"
                );
                let used: HashSet<String> = ticket.match_ids().map(str::to_string).collect();
                remaining = remaining.without_matches(&used);
            }
            None => {
                warn!(
                    ticket = %spec.name,
                    pool = remaining.len(),
                    size = spec.rule.size,
                    "no combination available"
                );
            }
        }
        entries.push(BatchEntry {
            name: spec.name.clone(),
            rule: spec.rule,
            outcome,
        });
    }

    Batch { entries }
}
