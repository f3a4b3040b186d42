use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, TicketError};

/// Most prestigious first. Each entry is a case-insensitive regex over the
/// full competition name, anchored to its country so that another nation's
/// "Premier League" or a reserve "Premier League 2" never borrows the tier.
pub const DEFAULT_PRIORITY: &[&str] = &[
    r"^(europe: )?(uefa )?champions league$",
    r"^england: premier league$",
    r"^spain: la ?liga$",
    r"^italy: serie a$",
    r"^germany: bundesliga$",
    r"^france: ligue 1$",
    r"^(europe: )?(uefa )?europa league$",
    r"^(europe: )?(uefa )?(europa )?conference league$",
    r"^netherlands: eredivisie$",
    r"^portugal: (primeira liga|liga portugal)$",
    r"^romania: superliga$",
    r"^turkey: super lig$",
    r"\bgrand slam\b",
    r"^(atp|wta)\b",
];

pub const DEFAULT_NATION_PATTERN: &str = r"(?i)\b(england|spain|italy|germany|france|portugal|netherlands|belgium|romania|turkey|scotland|brazil|argentina|usa|australia)\b";

static DEFAULT_TIERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    DEFAULT_PRIORITY
        .iter()
        .map(|p| compile_priority(p).expect("static priority pattern"))
        .collect()
});

static DEFAULT_NATIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_NATION_PATTERN).expect("static nation pattern"));

fn compile_priority(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("(?i){pattern}")).map_err(|source| TicketError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Assigns an integer tier to a competition name; lower is more prestigious.
#[derive(Debug, Clone)]
pub struct CompetitionRanking {
    priority: Vec<Regex>,
    nation_pattern: Regex,
}

impl Default for CompetitionRanking {
    fn default() -> Self {
        Self {
            priority: DEFAULT_TIERS.clone(),
            nation_pattern: DEFAULT_NATIONS.clone(),
        }
    }
}

impl CompetitionRanking {
    /// `priority` entries are regexes matched case-insensitively; a plain name
    /// matches anywhere in the competition.
    pub fn new<I, S>(priority: I, nation_pattern: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let nation_pattern =
            Regex::new(nation_pattern).map_err(|source| TicketError::InvalidPattern {
                pattern: nation_pattern.to_string(),
                source,
            })?;
        let priority = priority
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .map(|s| compile_priority(&s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            priority,
            nation_pattern,
        })
    }

    pub fn nation_tier(&self) -> usize {
        self.priority.len()
    }

    pub fn lowest_tier(&self) -> usize {
        self.priority.len() + 1
    }

    pub fn score(&self, competition: Option<&str>) -> usize {
        let Some(name) = competition.map(str::trim).filter(|s| !s.is_empty()) else {
            return self.lowest_tier();
        };
        if let Some(idx) = self.priority.iter().position(|p| p.is_match(name)) {
            return idx;
        }
        if self.nation_pattern.is_match(name) {
            return self.nation_tier();
        }
        self.lowest_tier()
    }
}

#[cfg(test)]
mod tests {
    use super::CompetitionRanking;

    #[test]
    fn priority_list_position_is_the_tier() {
        let ranking = CompetitionRanking::default();
        assert_eq!(ranking.score(Some("UEFA Champions League")), 0);
        assert_eq!(ranking.score(Some("England: Premier League")), 1);
        assert!(ranking.score(Some("Italy: Serie A")) < ranking.score(Some("Netherlands: Eredivisie")));
    }

    #[test]
    fn nation_bucket_sits_between_priority_and_rest() {
        let ranking = CompetitionRanking::default();
        let nation = ranking.score(Some("Romania: Liga 2"));
        let other = ranking.score(Some("Kazakhstan: Premier Division"));
        assert_eq!(nation, ranking.nation_tier());
        assert_eq!(other, ranking.lowest_tier());
        assert_eq!(ranking.score(None), ranking.lowest_tier());
        assert_eq!(ranking.score(Some("  ")), ranking.lowest_tier());
    }

    #[test]
    fn same_league_name_in_another_country_gets_no_priority() {
        let ranking = CompetitionRanking::default();
        let laliga = ranking.score(Some("Spain: LaLiga"));
        assert!(ranking.score(Some("Kazakhstan: Premier League")) > laliga);
        assert!(ranking.score(Some("Egypt: Premier League")) > laliga);
        assert!(ranking.score(Some("Ecuador: Serie A")) > ranking.score(Some("Netherlands: Eredivisie")));
        assert_eq!(ranking.score(Some("England: Premier League 2")), ranking.nation_tier());
        assert_eq!(ranking.score(Some("Kazakhstan: Premier League")), ranking.lowest_tier());
    }

    #[test]
    fn tournaments_match_on_word_boundaries() {
        let ranking = CompetitionRanking::default();
        assert!(ranking.score(Some("ATP Vienna")) < ranking.nation_tier());
        assert!(ranking.score(Some("Wimbledon (Grand Slam)")) < ranking.nation_tier());
        assert_eq!(ranking.score(Some("Matpoint Open")), ranking.lowest_tier());
    }

    #[test]
    fn custom_ranking_rejects_bad_pattern() {
        assert!(CompetitionRanking::new(["Liga 1"], "(unclosed").is_err());
        assert!(CompetitionRanking::new(["Liga (1"], "romania").is_err());
        let ranking = CompetitionRanking::new(["Liga 1", ""], r"(?i)romania").expect("valid");
        assert_eq!(ranking.score(Some("Romania: Liga 1")), 0);
        assert_eq!(ranking.score(Some("Romania: Cupa")), 1);
    }
}
