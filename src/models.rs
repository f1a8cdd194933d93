use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document as stored in (and returned from) the document index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub file_type: String,
    pub updated_at: DateTime<Utc>,
}

/// A document submitted for indexing. The id is optional; adapters assign
/// one when it is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentUpsert {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub fields: Document,
}

/// Which retrieval field set a search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Exact-match lookup on the document name.
    Title,
    /// Keyword-field match only.
    Keywords,
    /// Name + summary + keywords, in that relevance order.
    #[default]
    Advanced,
}

/// Which sub-query list(s) produced a fused hit. Derived during fusion, not
/// stored in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedMode {
    Lexical,
    Semantic,
    Both,
}

/// A single ranked result.
#[derive(Debug, Clone, Serialize)]
pub struct Hit {
    pub id: String,
    pub score: f32,
    pub matched_mode: MatchedMode,
    #[serde(flatten)]
    pub fields: Document,
}

/// One facet bucket: a distinct value and the number of filtered documents
/// carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetBucket {
    pub key: String,
    pub count: u64,
}

/// Facet counts for the three fixed dimensions, in backend bucket order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Facets {
    #[serde(rename = "Category")]
    pub category: Vec<FacetBucket>,
    #[serde(rename = "Year")]
    pub year: Vec<FacetBucket>,
    #[serde(rename = "File Types")]
    pub file_types: Vec<FacetBucket>,
}

/// The assembled, paginated outcome of one search request.
#[derive(Debug, Clone)]
pub struct RankedResultSet {
    pub hits: Vec<Hit>,
    pub total_matches: u64,
    pub facets: Facets,
    pub offset: usize,
}

/// GET /search query parameters. `file_type` may repeat.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub mode: SearchMode,
    #[serde(default)]
    pub from_: usize,
    #[serde(default)]
    pub file_type: Vec<String>,
}

/// GET /search response payload.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<Hit>,
    /// The submitted query string with inline `file_type:` tokens appended,
    /// echoed back for display.
    pub query: String,
    pub from_: usize,
    pub total: u64,
    pub aggs: Facets,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_mode_deserializes_from_snake_case() {
        let mode: SearchMode = serde_json::from_str("\"advanced\"").unwrap();
        assert_eq!(mode, SearchMode::Advanced);
        let mode: SearchMode = serde_json::from_str("\"title\"").unwrap();
        assert_eq!(mode, SearchMode::Title);
    }

    #[test]
    fn test_matched_mode_serializes_to_snake_case() {
        let json = serde_json::to_value(MatchedMode::Both).unwrap();
        assert_eq!(json, "both");
    }

    #[test]
    fn test_document_upsert_flattens_fields() {
        let json = serde_json::json!({
            "id": "doc-1",
            "name": "intro.pdf",
            "summary": "An introduction.",
            "file_type": "pdf",
            "updated_at": "2024-03-01T00:00:00Z",
        });
        let up: DocumentUpsert = serde_json::from_value(json).unwrap();
        assert_eq!(up.id.as_deref(), Some("doc-1"));
        assert_eq!(up.fields.name, "intro.pdf");
        assert!(up.fields.category.is_none());
    }
}
