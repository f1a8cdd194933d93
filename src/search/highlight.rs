use pulldown_cmark::{html, Parser};
use regex::RegexBuilder;

use crate::models::{Hit, SearchMode};

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";

/// Mark matched spans in one field of the hit, depending on the mode that
/// produced the match.
///
/// Title mode wraps case-insensitive occurrences of the whole query phrase
/// in the name field (the complete phrase only, never its individual
/// tokens). Keywords mode wraps every case-insensitive occurrence of each
/// whitespace-split query token in the summary, one substitution pass per
/// token, left to right; a pass never rescans its own insertions, but a
/// later token can match text an earlier marker introduced. Advanced mode
/// does not highlight.
///
/// A failed substitution leaves the hit unhighlighted, never dropped.
pub fn annotate(hit: &mut Hit, mode: SearchMode, query_text: &str) {
    let query = query_text.trim();
    if query.is_empty() {
        return;
    }

    match mode {
        SearchMode::Title => {
            hit.fields.name = mark_phrase(&hit.fields.name, query);
        }
        SearchMode::Keywords => {
            hit.fields.summary = mark_tokens(&hit.fields.summary, query);
        }
        SearchMode::Advanced => {}
    }
}

/// Render the summary field from Markdown into HTML for display. Runs after
/// highlighting; purely presentational.
pub fn render_summary(hit: &mut Hit) {
    let mut rendered = String::with_capacity(hit.fields.summary.len() * 2);
    html::push_html(&mut rendered, Parser::new(&hit.fields.summary));
    hit.fields.summary = rendered;
}

fn mark_phrase(text: &str, phrase: &str) -> String {
    let re = RegexBuilder::new(&regex::escape(phrase))
        .case_insensitive(true)
        .build();

    match re {
        Ok(re) => re
            .replace_all(text, |caps: &regex::Captures| {
                format!("{MARK_OPEN}{}{MARK_CLOSE}", &caps[0])
            })
            .to_string(),
        Err(e) => {
            tracing::debug!("phrase highlight skipped: {e}");
            text.to_string()
        }
    }
}

fn mark_tokens(text: &str, query: &str) -> String {
    let mut result = text.to_string();

    for token in query.split_whitespace() {
        let re = RegexBuilder::new(&regex::escape(token))
            .case_insensitive(true)
            .build();

        match re {
            Ok(re) => {
                result = re
                    .replace_all(&result, |caps: &regex::Captures| {
                        format!("{MARK_OPEN}{}{MARK_CLOSE}", &caps[0])
                    })
                    .to_string();
            }
            Err(e) => {
                tracing::debug!("token highlight skipped for {token:?}: {e}");
            }
        }
    }

    result
}
