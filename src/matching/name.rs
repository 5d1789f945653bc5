// src/matching/name.rs - Commune name normalization, search terms and similarity
use once_cell::sync::Lazy;
use regex::Regex;

use crate::matching::sequence::similarity_ratio;
use crate::utils::constants::COMMUNE_SIMILARITY_THRESHOLD;

/// Articles that may lead a commune name ("LA ROCHELLE") or be carried as a
/// parenthesized suffix ("ROCHELLE (LA)").
pub const ARTICLES: [&str; 3] = ["LA", "LE", "LES"];

static LEADING_ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(LA|LE|LES) (.+)$").expect("leading article pattern"));
static PARENTHESIZED_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\([^)]+\)\s*").expect("parenthesized suffix pattern"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Canonical form of a commune name: uppercased, trimmed, whitespace runs
/// collapsed, and a leading article moved to a parenthesized suffix
/// (`"LA ROCHELLE"` becomes `"ROCHELLE (LA)"`).
///
/// A name already carrying the suffix form is kept as is, so both spellings
/// of one commune normalize to the same string and the function is idempotent.
pub fn normalize_commune_name(name: &str) -> String {
    let collapsed = WHITESPACE_RUN
        .replace_all(name.trim(), " ")
        .to_uppercase();
    if collapsed.is_empty() {
        return collapsed;
    }

    if let Some(caps) = LEADING_ARTICLE.captures(&collapsed) {
        let article = &caps[1];
        let base = &caps[2];
        if !has_article_suffix(base) {
            return format!("{} ({})", base, article);
        }
    }
    collapsed
}

/// True when the (uppercased) name ends in `(LA)`, `(LE)` or `(LES)`.
fn has_article_suffix(upper: &str) -> bool {
    ARTICLES
        .iter()
        .any(|article| upper.ends_with(&format!(" ({})", article)))
}

/// Split a leading article off the raw name, keeping the original case of
/// the remainder: `"La Rochelle"` gives `Some(("LA", "Rochelle"))`.
fn split_leading_article(raw: &str) -> Option<(&'static str, &str)> {
    let upper = raw.to_uppercase();
    // Longest first so "LES " is not read as "LE" + "S ...".
    for article in ["LES", "LA", "LE"] {
        let prefix_len = article.len() + 1;
        if upper.starts_with(&format!("{} ", article)) && raw.is_char_boundary(prefix_len) {
            return Some((article, &raw[prefix_len..]));
        }
    }
    None
}

/// Search terms used to find candidate records for a raw commune name.
///
/// Always starts with the raw name, followed by its trimmed and
/// whitespace-collapsed form. A leading article adds the bare base and the
/// base with `" (LA)"` appended; a parenthesized suffix adds the base without
/// it and, when the suffix is exactly `(LA)`, the `"LA " + base` form.
/// Article and suffix detection run on the collapsed form.
/// Duplicates are dropped, first insertion wins.
pub fn generate_search_terms(raw: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    let mut push = |term: String| {
        if !term.trim().is_empty() && !terms.contains(&term) {
            terms.push(term);
        }
    };

    push(raw.to_string());
    let cleaned = WHITESPACE_RUN.replace_all(raw.trim(), " ").to_string();
    push(cleaned.clone());

    if let Some((_, base)) = split_leading_article(&cleaned) {
        push(base.to_string());
        push(format!("{} (LA)", base));
    }

    if cleaned.contains('(') {
        let base = PARENTHESIZED_SUFFIX.replace_all(&cleaned, " ").trim().to_string();
        let base = WHITESPACE_RUN.replace_all(&base, " ").to_string();
        if cleaned.to_uppercase().contains("(LA)") {
            push(format!("LA {}", base));
        }
        push(base);
    }

    terms
}

/// Ratcliff/Obershelp ratio between the normalized forms of two names.
pub fn commune_similarity(search_name: &str, found_name: &str) -> f64 {
    similarity_ratio(
        &normalize_commune_name(search_name),
        &normalize_commune_name(found_name),
    )
}

/// Whether `found_name` denotes the same commune as `search_name`.
pub fn is_similar_commune(search_name: &str, found_name: &str) -> bool {
    commune_similarity(search_name, found_name) >= COMMUNE_SIMILARITY_THRESHOLD
}
