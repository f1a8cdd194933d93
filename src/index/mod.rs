//! The document index collaborator: an external store supporting point
//! lookup, bulk upsert, and execution of a planned multi-stage retrieval
//! request returning ranked hits plus aggregation buckets.

pub mod elastic;

use async_trait::async_trait;

use crate::error::SearchError;
use crate::models::{Document, DocumentUpsert, FacetBucket};
use crate::query::PlanSpec;

pub use elastic::ElasticBackend;

/// One ranked hit as returned by a single sub-query, before fusion.
#[derive(Debug, Clone)]
pub struct ScoredDoc {
    pub id: String,
    pub score: f32,
    pub fields: Document,
}

/// Raw facet buckets per dimension, in backend order, before display
/// filtering.
#[derive(Debug, Clone, Default)]
pub struct FacetCounts {
    pub category: Vec<FacetBucket>,
    pub year: Vec<FacetBucket>,
    pub file_types: Vec<FacetBucket>,
}

/// Everything one plan execution produces.
#[derive(Debug, Clone, Default)]
pub struct IndexResults {
    pub lexical_hits: Vec<ScoredDoc>,
    pub semantic_hits: Vec<ScoredDoc>,
    pub facets: FacetCounts,
    /// Number of documents satisfying the filters, independent of page size.
    pub total: u64,
}

/// Per-document failure inside an otherwise successful bulk call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BulkItemError {
    /// Position of the failed document in the submitted batch.
    pub index: usize,
    pub id: Option<String>,
    pub reason: String,
}

/// Receipt for a bulk upsert: the successful subset is acknowledged even
/// when individual documents failed.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct BulkReceipt {
    pub indexed: usize,
    pub errors: Vec<BulkItemError>,
}

/// The external document index. Implementations own persistence and
/// per-sub-query scoring; ranking across sub-queries stays in the core.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Execute a retrieval plan. Implementations must fetch at least
    /// `offset + limit` candidates per sub-query so fused pagination never
    /// truncates, and must compute facets over the same filtered set the
    /// sub-queries run against.
    async fn execute(
        &self,
        plan: &PlanSpec,
        offset: usize,
        limit: usize,
    ) -> Result<IndexResults, SearchError>;

    /// Upsert a batch of documents, collecting per-document failures.
    async fn bulk_upsert(&self, documents: &[DocumentUpsert]) -> Result<BulkReceipt, SearchError>;

    /// Point lookup by id. `Ok(None)` when the document does not exist.
    async fn get_by_id(&self, id: &str) -> Result<Option<Document>, SearchError>;
}
