pub mod batch;
pub mod candidate;
pub mod competition;
pub mod config;
pub mod coverage;
pub mod error;
pub mod markets;
pub mod persist;
pub mod prepare;
pub mod report;
pub mod rule;
pub mod search;

use crate::batch::{Batch, build_batch};
use crate::candidate::Candidate;
use crate::config::BuilderConfig;
use crate::prepare::PreparedPool;

/// Derive, prepare and build every configured ticket from one raw pool.
pub fn run_batch(mut raw: Vec<Candidate>, cfg: &BuilderConfig) -> (PreparedPool, Batch) {
    if cfg.derive_double_chance {
        markets::augment_double_chance(&mut raw);
    }
    let pool = PreparedPool::prepare(raw, &cfg.filter, &cfg.ranking);
    let batch = build_batch(&pool, &cfg.specs, cfg.limits);
    (pool, batch)
}
