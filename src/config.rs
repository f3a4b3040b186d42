use std::env;

use crate::batch::{BILETUL_ZILEI, COTA2, TicketSpec};
use crate::competition::{CompetitionRanking, DEFAULT_NATION_PATTERN};
use crate::error::Result;
use crate::prepare::{DEFAULT_EXCLUDE_PATTERN, DEFAULT_MAX_ODD, DEFAULT_MIN_ODD, PoolFilter};
use crate::rule::TicketRule;
use crate::search::{DEFAULT_MAX_VISITS, SearchLimits};

/// Everything a run needs, resolved once and handed to the library explicitly.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    pub specs: Vec<TicketSpec>,
    pub filter: PoolFilter,
    pub ranking: CompetitionRanking,
    pub limits: SearchLimits,
    pub derive_double_chance: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            specs: crate::batch::default_specs(),
            filter: PoolFilter::default(),
            ranking: CompetitionRanking::default(),
            limits: SearchLimits::default(),
            derive_double_chance: true,
        }
    }
}

impl BuilderConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let cota2 = TicketRule::cota2();
        let zi = TicketRule::biletul_zilei();
        let cota2 = TicketRule::new(
            cota2.size,
            env_f64(&lookup, "C2_MIN", cota2.min),
            env_f64(&lookup, "C2_MAX", cota2.max),
            env_f64(&lookup, "C2_TOL", cota2.tolerance),
        )?;
        let zi = TicketRule::new(
            zi.size,
            env_f64(&lookup, "BZ_MIN", zi.min),
            env_f64(&lookup, "BZ_MAX", zi.max),
            env_f64(&lookup, "BZ_TOL", zi.tolerance),
        )?;

        let exclude = env_string(&lookup, "EXCLUDE_MARKETS")
            .unwrap_or_else(|| DEFAULT_EXCLUDE_PATTERN.to_string());
        let filter = PoolFilter::new(
            env_f64(&lookup, "ODD_MIN", DEFAULT_MIN_ODD),
            env_f64(&lookup, "ODD_MAX", DEFAULT_MAX_ODD),
            &exclude,
        )?;

        let ranking = match env_string(&lookup, "COMPETITION_PRIORITY") {
            Some(list) => {
                let nations = env_string(&lookup, "COMPETITION_NATIONS")
                    .unwrap_or_else(|| DEFAULT_NATION_PATTERN.to_string());
                CompetitionRanking::new(list.split(','), &nations)?
            }
            None => CompetitionRanking::default(),
        };

        let max_visits = lookup("MAX_VISITS")
            .and_then(|v| v.trim().replace('_', "").parse::<u64>().ok())
            .unwrap_or(DEFAULT_MAX_VISITS)
            .max(1);

        Ok(Self {
            specs: vec![TicketSpec::new(COTA2, cota2), TicketSpec::new(BILETUL_ZILEI, zi)],
            filter,
            ranking,
            limits: SearchLimits { max_visits },
            derive_double_chance: env_bool(&lookup, "DERIVE_DC", true),
        })
    }
}

fn env_string<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_f64<F>(lookup: &F, key: &str, default: f64) -> f64
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn env_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}
