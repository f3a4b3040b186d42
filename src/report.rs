use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::batch::{Batch, BatchEntry};

pub fn market_label(market: &str) -> String {
    match market.trim() {
        "1" => "1 (home)".to_string(),
        "X" => "X (draw)".to_string(),
        "2" => "2 (away)".to_string(),
        "1X" => "1X (home or draw)".to_string(),
        "12" => "12 (either side wins)".to_string(),
        "X2" => "X2 (draw or away)".to_string(),
        other => other.to_string(),
    }
}

fn section_title(name: &str) -> String {
    let words: Vec<String> = name
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    words.join(" ")
}

fn render_entry(out: &mut String, entry: &BatchEntry) {
    let rule = &entry.rule;
    let _ = writeln!(
        out,
        "## {} ({} selections; target {:.2}-{:.2})",
        section_title(&entry.name),
        rule.size,
        rule.min,
        rule.max
    );
    let Some(ticket) = entry.outcome.ticket.as_ref() else {
        out.push_str("- (no valid combination today)\n");
        return;
    };
    for s in &ticket.selections {
        let _ = writeln!(
            out,
            "- {} — **{} @ {:.2}**",
            s.team_names,
            market_label(&s.market),
            s.odd
        );
        if let Some(url) = s.source_url.as_deref().filter(|u| !u.trim().is_empty()) {
            let _ = writeln!(out, "  - Link: {url}");
        }
    }
    let _ = writeln!(
        out,
        "- **Total odds:** {} ({})",
        ticket.display_product(),
        ticket.status.as_str()
    );
}

pub fn render_markdown(batch: &Batch, date: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Tickets — {}", date.format("%Y-%m-%d"));
    for entry in &batch.entries {
        out.push('\n');
        render_entry(&mut out, entry);
    }
    out
}
