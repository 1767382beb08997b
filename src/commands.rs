use crate::advance::{advance_winner, ready_matches, reset_match, set_scores};
use crate::bracket::BracketBuilder;
use crate::config::now;
use crate::document::{from_json, normalize_names, to_json, to_json_pretty};
use crate::seeding::generate_seed_order;
use crate::types::*;
use std::{fmt::Write as _, fs, path::Path};
use tracing::{info, warn};

// ── Helpers ─────────────────────────────────────────────────────────────

pub fn read_document(path: &Path) -> Result<BracketDocument, String> {
    let data = fs::read_to_string(path).map_err(|e| format!("read bracket {}: {e}", path.display()))?;
    from_json(&data).map_err(|e| format!("parse bracket {}: {e}", path.display()))
}

pub fn render_document(doc: &BracketDocument, config: &AppConfig) -> Result<String, String> {
    let rendered = if config.pretty_json { to_json_pretty(doc) } else { to_json(doc) };
    rendered.map_err(|e| e.to_string())
}

pub fn write_document(path: &Path, doc: &BracketDocument, config: &AppConfig) -> Result<(), String> {
    let payload = render_document(doc, config)?;
    fs::write(path, payload).map_err(|e| format!("write bracket {}: {e}", path.display()))
}

/// Load the bracket at `path`, apply `f`, then write it back unless `dry_run`.
fn with_document<F>(path: &Path, config: &AppConfig, dry_run: bool, f: F) -> Result<BracketDocument, String>
where
    F: FnOnce(&mut BracketDocument) -> Result<(), String>,
{
    let mut doc = read_document(path)?;
    f(&mut doc)?;
    if dry_run {
        info!("dry run, {} left unchanged", path.display());
    } else {
        write_document(path, &doc, config)?;
    }
    Ok(doc)
}

/// Accepts either a participant id or an entrant name.
pub fn resolve_entrant(doc: &BracketDocument, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if doc.participant(raw).is_some() {
        return Some(raw.to_string());
    }
    let mut matches = doc
        .entrants()
        .filter(|p| p.name().is_some_and(|name| name.eq_ignore_ascii_case(raw)));
    let found = matches.next()?;
    if matches.next().is_some() {
        warn!("more than one entrant is named {raw}; pass the id instead");
        return None;
    }
    Some(found.id().to_string())
}

fn slot_label(doc: &BracketDocument, slot: Option<&str>) -> String {
    match slot.and_then(|id| doc.participant(id)) {
        Some(Participant::Entrant { name, seed, .. }) => format!("({seed}) {name}"),
        Some(Participant::Bye { .. }) => "BYE".to_string(),
        None => "TBD".to_string(),
    }
}

// ── Commands ────────────────────────────────────────────────────────────

pub fn seeds_command(size: u32) -> String {
    generate_seed_order(size)
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn create_command(
    config: &AppConfig,
    name: &str,
    created_by: Option<&str>,
    description: Option<&str>,
    participants: &[String],
) -> Result<BracketDocument, String> {
    let names = normalize_names(participants, config.min_participants).map_err(|e| e.to_string())?;
    let created_by = created_by.unwrap_or(&config.default_created_by);
    let mut builder = BracketBuilder::new(name, created_by).settings(config.bracket_settings());
    if let Some(description) = description {
        builder = builder.description(description);
    }
    let doc = builder.build(&names, now()).map_err(|e| e.to_string())?;
    info!(
        "created bracket {} ({}) with {} entrants over {} rounds",
        doc.name,
        doc.id,
        names.len(),
        doc.rounds.len()
    );
    Ok(doc)
}

pub fn advance_command(
    config: &AppConfig,
    path: &Path,
    match_id: &str,
    winner: &str,
    score1: Option<u32>,
    score2: Option<u32>,
    dry_run: bool,
) -> Result<BracketDocument, String> {
    with_document(path, config, dry_run, |doc| {
        if doc.match_by_id(match_id).is_none() {
            warn!("no match {match_id} in {}, nothing changed", doc.name);
            return Ok(());
        }
        let winner_id = resolve_entrant(doc, winner).ok_or_else(|| format!("Unknown entrant {winner}."))?;
        advance_winner(doc, match_id, &winner_id, now()).map_err(|e| e.to_string())?;
        if score1.is_some() || score2.is_some() {
            set_scores(doc, match_id, score1, score2, now()).map_err(|e| e.to_string())?;
        }
        info!("{} wins {match_id}, bracket is {:?}", slot_label(doc, Some(winner_id.as_str())), doc.status);
        Ok(())
    })
}

pub fn reset_command(
    config: &AppConfig,
    path: &Path,
    match_id: &str,
    dry_run: bool,
) -> Result<BracketDocument, String> {
    with_document(path, config, dry_run, |doc| {
        reset_match(doc, match_id, now()).map_err(|e| e.to_string())?;
        info!("reset {match_id} and its dependents");
        Ok(())
    })
}

/// Plain text view of the bracket, one round per block.
pub fn show_command(doc: &BracketDocument) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{:?}]", doc.name, doc.status);
    if let Some(description) = doc.description.as_deref() {
        let _ = writeln!(out, "{description}");
    }
    for round in &doc.rounds {
        let _ = writeln!(out, "\n{}", round.name);
        for m in doc.round_matches(round.round_number) {
            let winner = m
                .winner_id
                .as_deref()
                .map(|id| format!(" -> {}", slot_label(doc, Some(id))))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  {:<6} {} vs {}{winner}",
                m.id,
                slot_label(doc, m.participant1_id.as_deref()),
                slot_label(doc, m.participant2_id.as_deref()),
            );
        }
    }
    let ready = ready_matches(doc)
        .into_iter()
        .map(|m| m.id.as_str())
        .collect::<Vec<_>>();
    if !ready.is_empty() {
        let _ = writeln!(out, "\nReady: {}", ready.join(", "));
    }
    if let Some(champion) = doc.champion().and_then(Participant::name) {
        let _ = writeln!(out, "\nChampion: {champion}");
    }
    out
}
