//! Catalog loading from JSON and CSV.
//!
//! # CSV format
//! ```csv
//! id,source,target,alts_target,alts_source,type,tags,notes,tokens
//! ,the house,la maison,,,word,home,,
//! ,good morning,bonjour,salut,,word,greetings,,
//! ```
//! List cells (`alts_*`, `tags`, `tokens`) split on `|` or `;`. Fields may
//! be double-quoted; commas inside quotes are literal. Rows missing source
//! or target text are dropped silently.

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::CatalogError;
use crate::matching::normalize;
use crate::types::{CatalogItem, ItemKind};

const MAX_DERIVED_ID_LEN: usize = 64;

const TOKEN_TRIM: &[char] = &[
    '.', ',', '!', '?', ';', ':', '(', ')', '\u{00AB}', '\u{00BB}', '"', '\u{201C}', '\u{201D}',
];

/// Catalog row before id/kind/token derivation.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    source: String,
    #[serde(default)]
    target: String,
    #[serde(default)]
    alts_target: Vec<String>,
    #[serde(default)]
    alts_source: Vec<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    tokens: Vec<String>,
}

/// Load a catalog from a JSON array of rows.
pub fn from_json(content: &str) -> Result<Vec<CatalogItem>, CatalogError> {
    let raw: Vec<RawItem> = serde_json::from_str(content)?;
    Ok(raw.into_iter().filter_map(finish).collect())
}

/// Load a catalog from CSV text. The first non-empty line is the header.
pub fn from_csv(content: &str) -> Result<Vec<CatalogItem>, CatalogError> {
    let mut lines = content
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty());

    let header: Vec<String> = match lines.next() {
        Some(line) => split_row(line).iter().map(|h| h.trim().to_string()).collect(),
        None => return Err(CatalogError::MissingHeader),
    };

    let items = lines
        .map(|line| {
            let fields = split_row(line);
            let cell = |name: &str| -> String {
                header
                    .iter()
                    .position(|h| h == name)
                    .and_then(|idx| fields.get(idx))
                    .map(|v| v.trim().to_string())
                    .unwrap_or_default()
            };
            let id = cell("id");
            RawItem {
                id: if id.is_empty() { None } else { Some(id) },
                source: cell("source"),
                target: cell("target"),
                alts_target: split_list(&cell("alts_target")),
                alts_source: split_list(&cell("alts_source")),
                kind: Some(cell("type")),
                tags: split_list(&cell("tags")),
                notes: cell("notes"),
                tokens: split_list(&cell("tokens")),
            }
        })
        .filter_map(finish)
        .collect();

    Ok(items)
}

/// Content hash of the catalog identity: `id|source|target` per item.
/// Persisted progress is only reused when this hash matches.
pub fn catalog_hash(items: &[CatalogItem]) -> String {
    let mut hasher = Sha256::new();
    for item in items {
        hasher.update(item.id.as_bytes());
        hasher.update(b"|");
        hasher.update(item.source_text.as_bytes());
        hasher.update(b"|");
        hasher.update(item.target_text.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

/// Derive a stable id from target-language text.
pub fn derive_id(target_text: &str) -> String {
    normalize(target_text)
        .replace(' ', "_")
        .chars()
        .take(MAX_DERIVED_ID_LEN)
        .collect()
}

/// Whitespace tokenization with punctuation trimmed off each token.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|t| t.replace(TOKEN_TRIM, ""))
        .filter(|t| !t.is_empty())
        .collect()
}

fn finish(raw: RawItem) -> Option<CatalogItem> {
    let source_text = raw.source.trim().to_string();
    let target_text = raw.target.trim().to_string();
    if source_text.is_empty() || target_text.is_empty() {
        return None;
    }

    let id = match raw.id {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => derive_id(&target_text),
    };

    let kind = match raw.kind {
        Some(k) if k.to_lowercase().contains("sent") => ItemKind::Sentence,
        _ => ItemKind::Word,
    };

    let target_tokens = if raw.tokens.is_empty() {
        tokenize(&target_text)
    } else {
        raw.tokens
    };

    Some(CatalogItem {
        id,
        source_text,
        target_text,
        alternates: raw.alts_target,
        alternates_source: raw.alts_source,
        kind,
        tags: raw.tags,
        notes: raw.notes,
        target_tokens,
    })
}

/// Split one CSV line, honoring double quotes.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

fn split_list(cell: &str) -> Vec<String> {
    cell.split(['|', ';'])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
