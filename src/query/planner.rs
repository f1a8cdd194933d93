use crate::models::SearchMode;
use crate::query::parser::FilterSet;

/// Field names in the document index schema.
pub const FIELD_NAME: &str = "name";
pub const FIELD_NAME_EXACT: &str = "name.keyword";
pub const FIELD_SUMMARY: &str = "summary";
pub const FIELD_KEYWORDS: &str = "keywords";
pub const FIELD_CATEGORY_FACET: &str = "category.keyword";
pub const FIELD_FILE_TYPE_FACET: &str = "file_type.keyword";
pub const FIELD_UPDATED_AT: &str = "updated_at";
pub const FIELD_SPARSE_EMBEDDING: &str = "sparse_embedding";

/// A keyword/field-based text match over an ordered field list. Field order
/// is a relevance hint for backends that honor it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalSubQuery {
    pub fields: Vec<&'static str>,
    pub text: String,
}

/// A learned-sparse expansion match. Carries the raw residual text; the
/// expansion itself happens index-side against the sparse-embedding field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticSubQuery {
    pub vector_field: &'static str,
    pub text: String,
}

/// The three facet dimensions computed over the filtered candidate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetSpec {
    /// Terms over the category keyword sub-field.
    pub category_field: &'static str,
    /// Calendar-year histogram over the update timestamp, keyed by 4-digit
    /// year strings.
    pub year_field: &'static str,
    /// Terms over the file-type keyword sub-field.
    pub file_type_field: &'static str,
}

impl Default for FacetSpec {
    fn default() -> Self {
        Self {
            category_field: FIELD_CATEGORY_FACET,
            year_field: FIELD_UPDATED_AT,
            file_type_field: FIELD_FILE_TYPE_FACET,
        }
    }
}

/// One complete retrieval request: up to two sub-queries plus the facet
/// spec, all sharing the same filter set. With neither sub-query present
/// the plan is a match-all browse over the filters.
#[derive(Debug, Clone)]
pub struct PlanSpec {
    pub lexical: Option<LexicalSubQuery>,
    pub semantic: Option<SemanticSubQuery>,
    pub filters: FilterSet,
    pub facets: FacetSpec,
}

impl PlanSpec {
    /// True when no text signal exists and ordering falls back to the
    /// backend's native match-all relevance.
    pub fn is_browse(&self) -> bool {
        self.lexical.is_none() && self.semantic.is_none()
    }
}

fn lexical_fields(mode: SearchMode) -> Vec<&'static str> {
    match mode {
        SearchMode::Title => vec![FIELD_NAME_EXACT],
        SearchMode::Keywords => vec![FIELD_KEYWORDS],
        SearchMode::Advanced => vec![FIELD_NAME, FIELD_SUMMARY, FIELD_KEYWORDS],
    }
}

/// Build the retrieval plan for one request.
///
/// Empty residual text degrades to a match-all browse plan. The semantic
/// sub-query is only attached when the sparse model is ready; otherwise the
/// request silently runs lexical-only. Filters apply identically to every
/// sub-query so the fused lists are comparable.
pub fn plan(
    residual_text: &str,
    filters: FilterSet,
    mode: SearchMode,
    semantic_ready: bool,
) -> PlanSpec {
    let text = residual_text.trim();

    if text.is_empty() {
        return PlanSpec {
            lexical: None,
            semantic: None,
            filters,
            facets: FacetSpec::default(),
        };
    }

    let lexical = Some(LexicalSubQuery {
        fields: lexical_fields(mode),
        text: text.to_string(),
    });

    let semantic = semantic_ready.then(|| SemanticSubQuery {
        vector_field: FIELD_SPARSE_EMBEDDING,
        text: text.to_string(),
    });

    PlanSpec {
        lexical,
        semantic,
        filters,
        facets: FacetSpec::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_builds_browse_plan() {
        let spec = plan("", FilterSet::default(), SearchMode::Advanced, true);
        assert!(spec.is_browse());
        // Facets are identical in shape to a text-query plan.
        assert_eq!(spec.facets, FacetSpec::default());
    }

    #[test]
    fn test_advanced_mode_field_order() {
        let spec = plan("neural nets", FilterSet::default(), SearchMode::Advanced, true);
        let lexical = spec.lexical.expect("lexical sub-query");
        assert_eq!(lexical.fields, vec![FIELD_NAME, FIELD_SUMMARY, FIELD_KEYWORDS]);
        let semantic = spec.semantic.expect("semantic sub-query");
        assert_eq!(semantic.text, "neural nets");
        assert_eq!(semantic.vector_field, FIELD_SPARSE_EMBEDDING);
    }

    #[test]
    fn test_title_mode_uses_exact_field() {
        let spec = plan("quarterly report", FilterSet::default(), SearchMode::Title, true);
        assert_eq!(spec.lexical.expect("lexical").fields, vec![FIELD_NAME_EXACT]);
    }

    #[test]
    fn test_keywords_mode_restricts_to_keyword_field() {
        let spec = plan("rust", FilterSet::default(), SearchMode::Keywords, true);
        assert_eq!(spec.lexical.expect("lexical").fields, vec![FIELD_KEYWORDS]);
    }

    #[test]
    fn test_model_not_ready_degrades_to_lexical_only() {
        let spec = plan("neural nets", FilterSet::default(), SearchMode::Advanced, false);
        assert!(spec.lexical.is_some());
        assert!(spec.semantic.is_none());
    }

    #[test]
    fn test_filters_carried_on_plan() {
        let filters = FilterSet {
            category: Some("tutorial".to_string()),
            file_types: vec!["pdf".to_string()],
        };
        let spec = plan("machine learning", filters.clone(), SearchMode::Advanced, true);
        assert_eq!(spec.filters, filters);
    }
}
