//! Field extraction from persisted detail pages
//!
//! Each field has an explicit derivation rule with a documented failure
//! mode, mapping known side-panel keys and page sections to cleaned string
//! values. Extraction is a pure function of the document content plus the
//! target's address: byte-identical input always produces a byte-identical
//! record.

use crate::extract::record::StructuredRecord;
use crate::extract::ExtractionError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Trailing site-name suffix stripped from document titles
const TITLE_SUFFIX: &str = " - MyAnimeList.net";

fn selector(pattern: &str) -> Selector {
    Selector::parse(pattern).expect("hard-coded selector is valid")
}

fn users_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"by\s(.+)\susers").expect("hard-coded pattern is valid"))
}

/// Derives a structured record from one raw document
///
/// # Arguments
///
/// * `html` - The persisted detail page content
/// * `source_address` - The original target's address, copied into the record
///
/// # Returns
///
/// * `Ok(StructuredRecord)` - Every required field was present
/// * `Err(ExtractionError)` - A required field was absent or malformed; no
///   partial record is produced
pub fn parse_record(html: &str, source_address: &str) -> Result<StructuredRecord, ExtractionError> {
    let document = Html::parse_document(html);
    let info = info_panel(&document);

    let title = document
        .select(&selector("title"))
        .next()
        .map(|el| el.text().collect::<String>())
        .ok_or(ExtractionError::MissingField("animeTitle"))?
        .replace(TITLE_SUFFIX, "");

    let kind = info_field(&info, "Type", "animeType")?;
    let num_episodes = info_field(&info, "Episodes", "animeNumEpisode")?;
    let (release_date, end_date) = split_aired(&info_field(&info, "Aired", "releaseDate")?);
    let num_members = info_field(&info, "Members", "animeNumMembers")?.replace(',', "");

    let score_field = info_field(&info, "Score", "animeScore")?;
    let score = score_field
        .split_whitespace()
        .next()
        .ok_or_else(|| ExtractionError::MalformedField {
            field: "animeScore",
            reason: "empty Score entry".to_string(),
        })?
        .to_string();

    let scoring_users = users_pattern()
        .captures(&score_field)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| ExtractionError::MalformedField {
            field: "animeUsers",
            reason: format!("no 'by N users' pattern in '{}'", score_field),
        })?
        .split(',')
        .next()
        .unwrap_or("")
        .to_string();

    let ranked = info_field(&info, "Ranked", "animeRank")?;
    let rank_token =
        ranked
            .split_whitespace()
            .next()
            .ok_or_else(|| ExtractionError::MalformedField {
                field: "animeRank",
                reason: "empty Ranked entry".to_string(),
            })?;
    let rank = strip_edges(rank_token).to_string();

    let popularity = strip_first(&info_field(&info, "Popularity", "animePopularity")?).to_string();

    let description = document
        .select(&selector(r#"p[itemprop="description"]"#))
        .next()
        .map(|el| el.text().collect::<String>().replace('\t', ""))
        .ok_or(ExtractionError::MissingField("animeDescription"))?;

    let related = related_titles(&document);
    let characters = character_names(&document);
    let voice_actors = voice_actor_names(&document)?;
    let staff = staff_pairs(&document)?;

    Ok(StructuredRecord {
        title,
        kind,
        num_episodes,
        release_date,
        end_date,
        num_members,
        score,
        scoring_users,
        rank,
        popularity,
        description,
        related,
        characters,
        voice_actors,
        staff,
        source_address: source_address.to_string(),
    })
}

/// Collects the side-panel key-value block
///
/// Each `div.spaceit_pad` entry contributes one pair: its text is trimmed at
/// the end and split on whitespace; the key is the first token with its
/// final character (the colon) removed, the value is the remaining tokens
/// joined by single spaces. Later duplicate keys overwrite earlier ones.
fn info_panel(document: &Html) -> HashMap<String, String> {
    let mut info = HashMap::new();

    for entry in document.select(&selector("div.spaceit_pad")) {
        let text = entry.text().collect::<String>();
        let trimmed = text.trim_end();
        let mut tokens = trimmed.split_whitespace();

        let key_token = match tokens.next() {
            Some(token) => token,
            None => continue,
        };

        let key = strip_last(key_token).to_string();
        let value = tokens.collect::<Vec<_>>().join(" ");
        info.insert(key, value);
    }

    info
}

fn info_field(
    info: &HashMap<String, String>,
    key: &str,
    field: &'static str,
) -> Result<String, ExtractionError> {
    info.get(key)
        .cloned()
        .ok_or(ExtractionError::MissingField(field))
}

/// Splits an airing range on its `" to "` delimiter
///
/// Exactly one delimiter yields `(start, end)`; anything else yields the
/// whole string as the start and an empty end.
fn split_aired(value: &str) -> (String, String) {
    let parts: Vec<&str> = value.split(" to ").collect();
    match parts.as_slice() {
        [start, end] => (start.to_string(), end.to_string()),
        _ => (value.to_string(), String::new()),
    }
}

/// De-duplicated link texts of the related-titles table, in document order
fn related_titles(document: &Html) -> String {
    let table = match document
        .select(&selector("table.anime_detail_related_anime"))
        .next()
    {
        Some(table) => table,
        None => return String::new(),
    };

    let mut seen = HashSet::new();
    let mut titles = Vec::new();
    for anchor in table.select(&selector("a")) {
        let text = anchor.text().collect::<String>();
        if seen.insert(text.clone()) {
            titles.push(text);
        }
    }

    list_literal(&titles)
}

/// Character section header texts
fn character_names(document: &Html) -> String {
    let names: Vec<String> = document
        .select(&selector("h3.h3_characters_voice_actors"))
        .map(|el| el.text().collect::<String>())
        .collect();

    list_literal(&names)
}

/// Linked voice-actor names from the fixed table-cell class
fn voice_actor_names(document: &Html) -> Result<String, ExtractionError> {
    let mut names = Vec::new();

    for cell in document.select(&selector("td.va-t.ar.pl4.pr4")) {
        let anchor =
            cell.select(&selector("a"))
                .next()
                .ok_or_else(|| ExtractionError::MalformedField {
                    field: "animeVoices",
                    reason: "voice actor cell without a link".to_string(),
                })?;
        names.push(anchor.text().collect::<String>());
    }

    Ok(list_literal(&names))
}

/// `[name, role]` pairs from the second characters-list block
///
/// Cells whose link text is empty after end-trimming (picture cells) are
/// skipped. Fewer than two blocks on the page yields an empty string, not an
/// empty list literal.
fn staff_pairs(document: &Html) -> Result<String, ExtractionError> {
    let blocks: Vec<ElementRef> = document
        .select(&selector("div.detail-characters-list.clearfix"))
        .collect();

    if blocks.len() < 2 {
        return Ok(String::new());
    }

    let mut pairs = Vec::new();
    for cell in blocks[1].select(&selector("td")) {
        let anchor =
            cell.select(&selector("a"))
                .next()
                .ok_or_else(|| ExtractionError::MalformedField {
                    field: "animeStaff",
                    reason: "staff cell without a link".to_string(),
                })?;

        let name = anchor.text().collect::<String>().trim_end().to_string();
        if name.is_empty() {
            continue;
        }

        let role_div =
            cell.select(&selector("div"))
                .next()
                .ok_or_else(|| ExtractionError::MalformedField {
                    field: "animeStaff",
                    reason: "staff cell without a role".to_string(),
                })?;
        let role_text = role_div.text().collect::<String>();
        let role = strip_first(role_text.trim_end()).to_string();

        pairs.push((name, role));
    }

    Ok(pair_list_literal(&pairs))
}

/// Drops the first character of a string, if any
fn strip_first(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next();
    chars.as_str()
}

/// Drops the last character of a string, if any
fn strip_last(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next_back();
    chars.as_str()
}

/// Drops the first and last characters of a string
fn strip_edges(s: &str) -> &str {
    let mut chars = s.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// Renders a string in the legacy dataset's quoted-literal notation
///
/// Single quotes unless the string itself contains one (and no double
/// quote), with backslashes, quotes and control whitespace escaped. Records
/// must stay byte-compatible with the existing dataset, which uses this
/// notation for all list-valued columns.
fn string_literal(s: &str) -> String {
    let has_single = s.contains('\'');
    let has_double = s.contains('"');
    let quote = if has_single && !has_double { '"' } else { '\'' };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Renders a flat list literal: `['a', 'b']`
fn list_literal(items: &[String]) -> String {
    let rendered: Vec<String> = items.iter().map(|s| string_literal(s)).collect();
    format!("[{}]", rendered.join(", "))
}

/// Renders a nested pair-list literal: `[['name', 'role'], ...]`
fn pair_list_literal(pairs: &[(String, String)]) -> String {
    let rendered: Vec<String> = pairs
        .iter()
        .map(|(name, role)| format!("[{}, {}]", string_literal(name), string_literal(role)))
        .collect();
    format!("[{}]", rendered.join(", "))
}
