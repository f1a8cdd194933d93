use std::sync::OnceLock;

use regex::Regex;

/// Structured filters extracted from a search request. These are
/// authoritative for query execution; any inline tokens left in the echoed
/// query string are display-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub category: Option<String>,
    pub file_types: Vec<String>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.file_types.is_empty()
    }
}

/// Outcome of parsing one raw query string plus file-type selections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub filters: FilterSet,
    /// The query text with the category token removed; drives retrieval.
    pub residual: String,
    /// The raw query with one inline `file_type:<value>` token appended per
    /// distinct selection, echoed back to the client.
    pub echoed_query: String,
}

fn category_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"category:([^\s]+)\s*").expect("static pattern compiles"))
}

/// Parse a raw query string into structured filters and residual text.
///
/// Only the first `category:<token>` occurrence is honored; any later ones
/// stay in the residual text as plain words. A bare `category:` with no
/// value fails the pattern and is treated as absent; parsing never rejects
/// input.
pub fn parse(raw_query: &str, selected_file_types: &[String]) -> ParsedQuery {
    let mut filters = FilterSet::default();

    let residual = match category_regex().captures(raw_query) {
        Some(caps) => {
            filters.category = Some(caps[1].to_string());
            // Strip every occurrence, matching the single-capture behavior:
            // the first match defines the filter, the rest just disappear
            // from the text.
            category_regex().replace_all(raw_query, "").trim().to_string()
        }
        None => raw_query.trim().to_string(),
    };

    let mut echoed_query = raw_query.to_string();
    for file_type in selected_file_types {
        if filters.file_types.iter().any(|ft| ft == file_type) {
            continue;
        }
        filters.file_types.push(file_type.clone());
        echoed_query.push_str(&format!(" file_type:{file_type}"));
    }

    ParsedQuery {
        filters,
        residual,
        echoed_query,
    }
}
