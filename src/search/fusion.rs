use std::collections::HashMap;

use crate::index::ScoredDoc;
use crate::models::{Hit, MatchedMode};

/// RRF smoothing constant.
pub const RRF_K: f32 = 60.0;

struct FusedEntry {
    fields: crate::models::Document,
    score: f32,
    lexical_rank: Option<usize>,
    semantic_rank: Option<usize>,
}

/// Merge the two sub-query rankings into one ordered, deduplicated list.
///
/// Each hit contributes `1 / (RRF_K + rank)` per list it appears in (rank is
/// 1-based within that list); the fused score is the sum. Order is
/// descending fused score, ties broken by lexical rank, then semantic rank,
/// then id.
///
/// With only one non-empty input list fusion is the identity: the output
/// keeps that list's native order and native scores.
pub fn rrf_fuse(lexical_hits: Vec<ScoredDoc>, semantic_hits: Vec<ScoredDoc>) -> Vec<Hit> {
    if semantic_hits.is_empty() {
        return passthrough(lexical_hits, MatchedMode::Lexical);
    }
    if lexical_hits.is_empty() {
        return passthrough(semantic_hits, MatchedMode::Semantic);
    }

    let mut entries: HashMap<String, FusedEntry> = HashMap::new();

    for (i, doc) in lexical_hits.into_iter().enumerate() {
        let rank = i + 1;
        let entry = entries.entry(doc.id).or_insert_with(|| FusedEntry {
            fields: doc.fields,
            score: 0.0,
            lexical_rank: None,
            semantic_rank: None,
        });
        entry.lexical_rank = Some(rank);
        entry.score += 1.0 / (RRF_K + rank as f32);
    }

    for (i, doc) in semantic_hits.into_iter().enumerate() {
        let rank = i + 1;
        let entry = entries.entry(doc.id).or_insert_with(|| FusedEntry {
            fields: doc.fields,
            score: 0.0,
            lexical_rank: None,
            semantic_rank: None,
        });
        entry.semantic_rank = Some(rank);
        entry.score += 1.0 / (RRF_K + rank as f32);
    }

    let mut fused: Vec<(String, FusedEntry)> = entries.into_iter().collect();
    fused.sort_by(|(a_id, a), (b_id, b)| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| rank_key(a.lexical_rank).cmp(&rank_key(b.lexical_rank)))
            .then_with(|| rank_key(a.semantic_rank).cmp(&rank_key(b.semantic_rank)))
            .then_with(|| a_id.cmp(b_id))
    });

    fused
        .into_iter()
        .map(|(id, entry)| {
            let matched_mode = match (entry.lexical_rank, entry.semantic_rank) {
                (Some(_), Some(_)) => MatchedMode::Both,
                (Some(_), None) => MatchedMode::Lexical,
                (None, _) => MatchedMode::Semantic,
            };
            Hit {
                id,
                score: entry.score,
                matched_mode,
                fields: entry.fields,
            }
        })
        .collect()
}

fn passthrough(hits: Vec<ScoredDoc>, matched_mode: MatchedMode) -> Vec<Hit> {
    hits.into_iter()
        .map(|doc| Hit {
            id: doc.id,
            score: doc.score,
            matched_mode,
            fields: doc.fields,
        })
        .collect()
}

fn rank_key(rank: Option<usize>) -> usize {
    rank.unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn doc(id: &str, score: f32) -> ScoredDoc {
        ScoredDoc {
            id: id.to_string(),
            score,
            fields: crate::models::Document {
                name: format!("{id}.pdf"),
                summary: format!("summary of {id}"),
                keywords: vec![],
                category: None,
                file_type: "pdf".to_string(),
                updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            },
        }
    }

    #[test]
    fn test_empty_inputs() {
        assert!(rrf_fuse(vec![], vec![]).is_empty());
    }

    #[test]
    fn test_single_list_is_identity() {
        let hits = rrf_fuse(vec![doc("a", 9.0), doc("b", 4.0)], vec![]);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[1].id, "b");
        // Native scores survive, no RRF rewrite.
        assert_eq!(hits[0].score, 9.0);
        assert!(hits.iter().all(|h| h.matched_mode == MatchedMode::Lexical));
    }

    #[test]
    fn test_semantic_only_list_is_identity() {
        let hits = rrf_fuse(vec![], vec![doc("x", 0.8)]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].matched_mode, MatchedMode::Semantic);
        assert_eq!(hits[0].score, 0.8);
    }

    #[test]
    fn test_dedup_and_matched_mode_both() {
        let hits = rrf_fuse(
            vec![doc("a", 5.0), doc("b", 3.0)],
            vec![doc("b", 0.9), doc("c", 0.7)],
        );
        assert_eq!(hits.len(), 3);
        let b = hits.iter().find(|h| h.id == "b").unwrap();
        assert_eq!(b.matched_mode, MatchedMode::Both);
        // b: rank 2 lexical + rank 1 semantic beats single-list hits.
        assert_eq!(hits[0].id, "b");
        let expected = 1.0 / (RRF_K + 2.0) + 1.0 / (RRF_K + 1.0);
        assert!((b.score - expected).abs() < 1e-6);
    }

    #[test]
    fn test_both_lists_score_strictly_exceeds_single_list_contribution() {
        let hits = rrf_fuse(vec![doc("a", 5.0), doc("b", 3.0)], vec![doc("a", 0.9)]);
        let a = hits.iter().find(|h| h.id == "a").unwrap();
        let lexical_only = 1.0 / (RRF_K + 1.0);
        let semantic_only = 1.0 / (RRF_K + 1.0);
        assert!(a.score > lexical_only);
        assert!(a.score > semantic_only);
    }

    #[test]
    fn test_fusion_is_order_invariant_in_arguments() {
        let list_a = vec![doc("a", 5.0), doc("b", 3.0), doc("c", 1.0)];
        let list_b = vec![doc("a", 0.9), doc("c", 0.8)];

        let forward = rrf_fuse(list_a.clone(), list_b.clone());
        let swapped = rrf_fuse(list_b, list_a);

        let forward_ids: Vec<&str> = forward.iter().map(|h| h.id.as_str()).collect();
        let swapped_ids: Vec<&str> = swapped.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(forward_ids, swapped_ids);
        for (f, s) in forward.iter().zip(swapped.iter()) {
            assert!((f.score - s.score).abs() < 1e-6);
        }
    }

    #[test]
    fn test_tie_broken_by_lexical_rank_then_id() {
        // d and e each appear only at semantic rank 3 / lexical rank 3
        // respectively: equal contributions, lexical-ranked hit wins.
        let lexical = vec![doc("a", 5.0), doc("b", 4.0), doc("e", 3.0)];
        let semantic = vec![doc("a", 0.9), doc("b", 0.8), doc("d", 0.7)];
        let hits = rrf_fuse(lexical, semantic);
        let e_pos = hits.iter().position(|h| h.id == "e").unwrap();
        let d_pos = hits.iter().position(|h| h.id == "d").unwrap();
        assert!(e_pos < d_pos);
    }

    #[test]
    fn test_equal_score_prefers_lexical_rank() {
        let lexical = vec![doc("b", 2.0), doc("a", 2.0)];
        let semantic = vec![doc("a", 0.9), doc("b", 0.9)];
        let hits = rrf_fuse(lexical, semantic);
        // b: lex 1 + sem 2, a: lex 2 + sem 1. Same score, tie falls to
        // lexical rank, so b leads.
        assert_eq!(hits[0].id, "b");
        assert_eq!(hits[1].id, "a");
    }
}
