use crate::index::{FacetCounts, IndexResults};
use crate::models::{FacetBucket, Facets, RankedResultSet};
use crate::search::fusion::rrf_fuse;

/// Fuse the sub-query rankings and page the fused list.
///
/// Pagination always applies to the fused order, never to either input
/// list: the backend fetched enough candidates per side that slicing here
/// cannot drop a relevant fused hit.
pub fn assemble(results: IndexResults, offset: usize, limit: usize) -> RankedResultSet {
    let fused = rrf_fuse(results.lexical_hits, results.semantic_hits);

    let hits = fused
        .into_iter()
        .skip(offset)
        .take(limit)
        .collect();

    RankedResultSet {
        hits,
        total_matches: results.total,
        facets: display_facets(results.facets),
        offset,
    }
}

/// Convert raw backend buckets into display facets.
///
/// Calendar years with no matching documents are noise and are dropped.
/// Category and file-type buckets keep their zero-count entries so facet
/// UIs stay stable while filters toggle.
fn display_facets(raw: FacetCounts) -> Facets {
    Facets {
        category: raw.category,
        year: drop_empty(raw.year),
        file_types: raw.file_types,
    }
}

fn drop_empty(buckets: Vec<FacetBucket>) -> Vec<FacetBucket> {
    buckets.into_iter().filter(|b| b.count > 0).collect()
}
