use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One proposed bet: a single market outcome on a single match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(alias = "id", deserialize_with = "lenient_id")]
    pub match_id: String,
    #[serde(alias = "teams", default)]
    pub team_names: String,
    pub market: String,
    #[serde(default = "missing_odd", deserialize_with = "lenient_odd")]
    pub odd: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(alias = "url", default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl Candidate {
    pub fn new(
        match_id: impl Into<String>,
        team_names: impl Into<String>,
        market: impl Into<String>,
        odd: f64,
    ) -> Self {
        Self {
            match_id: match_id.into(),
            team_names: team_names.into(),
            market: market.into(),
            odd,
            competition: None,
            sport: None,
            time: None,
            source_url: None,
        }
    }

    pub fn with_competition(mut self, competition: impl Into<String>) -> Self {
        self.competition = Some(competition.into());
        self
    }

    pub fn kind(&self) -> MarketKind {
        MarketKind::classify(&self.market)
    }

    /// Splits "Home - Away"; either side may be empty when the label is malformed.
    pub fn home_away(&self) -> (&str, &str) {
        match self.team_names.split_once(" - ") {
            Some((home, away)) => (home.trim(), away.trim()),
            None => (self.team_names.trim(), ""),
        }
    }

    /// Copies the descriptive fields of `self` onto a new market for the same match.
    pub fn sibling(&self, market: impl Into<String>, odd: f64) -> Self {
        Self {
            market: market.into(),
            odd,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarketKind {
    /// 1 / X / 2
    Result,
    /// 1X / 12 / X2
    DoubleChance,
    /// Over/under a goal line.
    Totals,
    Cards,
    Corners,
    Other,
}

impl MarketKind {
    pub fn classify(market: &str) -> Self {
        let m = market.trim();
        match m {
            "1" | "X" | "2" => return MarketKind::Result,
            "1X" | "12" | "X2" => return MarketKind::DoubleChance,
            _ => {}
        }
        if is_totals_label(m) {
            MarketKind::Totals
        } else if m.starts_with("Cards ") {
            MarketKind::Cards
        } else if m.starts_with("Corners ") {
            MarketKind::Corners
        } else {
            MarketKind::Other
        }
    }

    /// Lower is preferred when ordering a pool.
    pub fn rank(self) -> u8 {
        match self {
            MarketKind::Result => 0,
            MarketKind::DoubleChance => 1,
            MarketKind::Totals => 2,
            MarketKind::Cards => 3,
            MarketKind::Corners => 4,
            MarketKind::Other => 5,
        }
    }
}

fn is_totals_label(m: &str) -> bool {
    let rest = m
        .strip_prefix("Over ")
        .or_else(|| m.strip_prefix("Under "))
        .or_else(|| m.strip_prefix('O'))
        .or_else(|| m.strip_prefix('U'));
    rest.and_then(|r| r.trim_start().chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}

/// Parses a decimal odd as scrapers emit it ("1.85", "1,85", " 2 ").
pub fn parse_odd(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

fn missing_odd() -> f64 {
    f64::NAN
}

fn lenient_odd<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_odd(&s).unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

fn lenient_id<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(de)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "match id must be a string or number, got {other}"
        ))),
    }
}
