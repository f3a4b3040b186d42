use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::candidate::Candidate;

const DC_MIN_ODD: f64 = 1.02;
const DC_MAX_ODD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleChanceOdds {
    pub home_or_draw: f64,
    pub home_or_away: f64,
    pub draw_or_away: f64,
}

/// Margin-free probabilities from a 1X2 decimal triplet.
pub fn no_vig_from_decimal(home: f64, draw: f64, away: f64) -> Option<(f64, f64, f64)> {
    if !(home.is_finite() && draw.is_finite() && away.is_finite()) {
        return None;
    }
    if home <= 1.0 || draw <= 1.0 || away <= 1.0 {
        return None;
    }
    let ih = 1.0 / home;
    let id = 1.0 / draw;
    let ia = 1.0 / away;
    let sum = ih + id + ia;
    if sum <= 0.0 {
        return None;
    }
    Some((ih / sum, id / sum, ia / sum))
}

/// Fair double-chance prices, clamped and rounded to two decimals.
pub fn double_chance_from_1x2(home: f64, draw: f64, away: f64) -> Option<DoubleChanceOdds> {
    let (ph, pd, pa) = no_vig_from_decimal(home, draw, away)?;
    let price = |p: f64| round2((1.0 / p).clamp(DC_MIN_ODD, DC_MAX_ODD));
    Some(DoubleChanceOdds {
        home_or_draw: price(ph + pd),
        home_or_away: price(ph + pa),
        draw_or_away: price(pd + pa),
    })
}

#[derive(Debug, Default)]
struct Triplet<'a> {
    template: Option<&'a Candidate>,
    home: Option<f64>,
    draw: Option<f64>,
    away: Option<f64>,
}

fn keep_max(slot: &mut Option<f64>, odd: f64) {
    if !odd.is_finite() {
        return;
    }
    if slot.is_none_or(|prev| odd > prev) {
        *slot = Some(odd);
    }
}

/// Double-chance rows for every match that has a complete 1X2 triplet, skipping
/// markets the pool already prices for that match.
pub fn derive_double_chance(pool: &[Candidate]) -> Vec<Candidate> {
    let mut order: Vec<&str> = Vec::new();
    let mut triplets: HashMap<&str, Triplet<'_>> = HashMap::new();
    let mut existing: HashSet<(&str, &str)> = HashSet::new();

    for c in pool {
        existing.insert((c.match_id.as_str(), c.market.trim()));
        let slot = match c.market.trim() {
            "1" | "X" | "2" => triplets.entry(c.match_id.as_str()).or_insert_with(|| {
                order.push(c.match_id.as_str());
                Triplet::default()
            }),
            _ => continue,
        };
        if slot.template.is_none() {
            slot.template = Some(c);
        }
        match c.market.trim() {
            "1" => keep_max(&mut slot.home, c.odd),
            "X" => keep_max(&mut slot.draw, c.odd),
            _ => keep_max(&mut slot.away, c.odd),
        }
    }

    let mut out = Vec::new();
    for id in order {
        let Some(t) = triplets.get(id) else {
            continue;
        };
        let (Some(template), Some(home), Some(draw), Some(away)) =
            (t.template, t.home, t.draw, t.away)
        else {
            continue;
        };
        let Some(dc) = double_chance_from_1x2(home, draw, away) else {
            continue;
        };
        for (market, odd) in [
            ("1X", dc.home_or_draw),
            ("12", dc.home_or_away),
            ("X2", dc.draw_or_away),
        ] {
            if !existing.contains(&(id, market)) {
                out.push(template.sibling(market, odd));
            }
        }
    }
    out
}

/// Appends derived double-chance rows; returns how many were added.
pub fn augment_double_chance(pool: &mut Vec<Candidate>) -> usize {
    let derived = derive_double_chance(pool);
    let added = derived.len();
    pool.extend(derived);
    debug!(added, "derived double chance markets");
    added
}

fn round2(x: f64) -> f64 {
    ((x + f64::EPSILON) * 100.0).round() / 100.0
}
