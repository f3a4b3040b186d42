use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};

use ticket_builder::batch::{BILETUL_ZILEI, COTA2, TicketSpec, build_batch};
use ticket_builder::candidate::Candidate;
use ticket_builder::competition::CompetitionRanking;
use ticket_builder::config::BuilderConfig;
use ticket_builder::persist::{TicketsFile, parse_pool};
use ticket_builder::prepare::{PoolFilter, PreparedPool};
use ticket_builder::rule::TicketRule;
use ticket_builder::search::{SearchLimits, TicketStatus};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn fixture_pool() -> Vec<Candidate> {
    parse_pool(&read_fixture("odds_pool.json")).expect("fixture should parse")
}

fn picks(ticket: &ticket_builder::search::Ticket) -> Vec<(&str, &str, f64)> {
    ticket
        .selections
        .iter()
        .map(|s| (s.match_id.as_str(), s.market.as_str(), s.odd))
        .collect()
}

#[test]
fn fixture_parses_and_skips_rows_without_id() {
    let pool = fixture_pool();
    assert_eq!(pool.len(), 32);
    assert!(pool.iter().any(|c| c.match_id == "105"));
}

#[test]
fn daily_pair_from_fixture() {
    let (pool, batch) = ticket_builder::run_batch(fixture_pool(), &BuilderConfig::default());

    // m109 has no usable odds, 105 has no draw price so no derived markets.
    assert_eq!(pool.match_count(), 8);
    assert!(pool.candidates().iter().all(|c| c.market != "HT 1"));
    let fcsb_home = pool
        .candidates()
        .iter()
        .find(|c| c.match_id == "m103" && c.market == "1")
        .expect("m103 home");
    assert_eq!(fcsb_home.odd, 1.95);

    let cota2 = batch.ticket(COTA2).expect("cota2");
    assert_eq!(cota2.status, TicketStatus::Exact);
    assert_eq!(cota2.product, 2.203);
    assert_eq!(picks(cota2), vec![("m108", "1", 1.62), ("m101", "12", 1.36)]);

    let zi = batch.ticket(BILETUL_ZILEI).expect("biletul zilei");
    assert_eq!(zi.status, TicketStatus::Exact);
    assert_eq!(zi.product, 5.926);
    assert_eq!(
        picks(zi),
        vec![
            ("m102", "1", 2.40),
            ("m104", "1", 1.45),
            ("m106", "1", 1.30),
            ("m103", "1X", 1.31),
        ]
    );

    let first: HashSet<&str> = cota2.match_ids().collect();
    assert!(zi.match_ids().all(|id| !first.contains(id)));
}

#[test]
fn later_ticket_cannot_reuse_matches_even_when_they_fit_better() {
    // The four-leg ticket would land far closer with M1 and M2, but the pair takes them first.
    let raw = vec![
        Candidate::new("M1", "A - B", "1", 1.40),
        Candidate::new("M2", "C - D", "1", 1.45),
        Candidate::new("M3", "E - F", "1", 3.10),
        Candidate::new("M4", "G - H", "1", 3.20),
        Candidate::new("M5", "I - J", "1", 3.30),
        Candidate::new("M6", "K - L", "1", 3.40),
    ];
    let pool = PreparedPool::prepare(raw, &PoolFilter::default(), &CompetitionRanking::default());
    let specs = vec![
        TicketSpec::new("a", TicketRule::new(2, 1.9, 2.5, 0.1).expect("valid")),
        TicketSpec::new("b", TicketRule::new(4, 4.0, 6.0, 0.2).expect("valid")),
    ];
    let batch = build_batch(&pool, &specs, SearchLimits::default());

    let a = batch.ticket("a").expect("a");
    let mut a_ids: Vec<&str> = a.match_ids().collect();
    a_ids.sort_unstable();
    assert_eq!(a_ids, vec!["M1", "M2"]);

    let b = batch.ticket("b").expect("b still gets the leftover matches");
    assert!(b.match_ids().all(|id| id != "M1" && id != "M2"));
    assert_eq!(b.status, TicketStatus::Closest);
    assert_eq!(batch.used_match_ids().len(), 6);
}

#[test]
fn tickets_file_follows_output_contract() {
    let (_, batch) = ticket_builder::run_batch(fixture_pool(), &BuilderConfig::default());
    let now = Utc.with_ymd_and_hms(2026, 10, 17, 8, 0, 0).unwrap();
    let file = TicketsFile::from_batch(&batch, now);
    assert_eq!(file.generated_at, "2026-10-17T08:00:00Z");

    let json = serde_json::to_value(&file).expect("serializes");
    let cota2 = &json["tickets"][COTA2];
    assert_eq!(cota2["status"], "exact");
    assert_eq!(cota2["range"]["min"], 1.9);
    assert_eq!(cota2["range"]["max"], 2.5);
    assert!(cota2["tolerance_range"]["min"].as_f64().unwrap() < 1.9);
    let first = &cota2["selections"][0];
    assert_eq!(first["match_id"], "m108");
    assert_eq!(first["team_names"], "Benfica - PSV");
    assert_eq!(first["competition"], "UEFA Champions League");
    assert!(first.get("source_url").is_none());

    let back: TicketsFile = serde_json::from_value(json).expect("round trips");
    assert_eq!(back, file);
}

#[test]
fn missing_ticket_serializes_as_null() {
    let raw = vec![Candidate::new("only", "A - B", "1", 1.80)];
    let cfg = BuilderConfig::default();
    let (_, batch) = ticket_builder::run_batch(raw, &cfg);
    let file = TicketsFile::from_batch(&batch, Utc::now());
    let json = serde_json::to_value(&file).expect("serializes");
    assert!(json["tickets"][COTA2].is_null());
    assert!(json["tickets"][BILETUL_ZILEI].is_null());
}
