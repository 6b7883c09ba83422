//! Reciprocal Rank Fusion (RRF) for combining ranked lists
//!
//! RRF is a simple, effective method for fusing results from multiple
//! retrievers. k=60 is the standard value from the original paper
//! (Cormack et al., 2009).
//!
//! Rank positions here run 0-indexed and continuously across the
//! concatenated per-query lists - they do NOT reset at each list boundary.
//! Later lists therefore contribute smaller increments, while a passage
//! surfaced by several queries still accumulates one term per occurrence
//! and outranks single-query passages. `test_cross_list_boost` pins this
//! down against the per-list-reset variant.

use std::collections::HashMap;

use crate::store::ScoredPassage;

/// Fused result with accumulated score
#[derive(Debug, Clone)]
pub struct FusedPassage {
    pub content: String,
    pub source: Option<String>,
    pub score: f64,
}

/// Reciprocal Rank Fusion over per-query result lists
///
/// Score for passage p = Σ 1/(rank + k) over every occurrence of p in the
/// flattened stream, where rank is the occurrence's position in that
/// stream. Passages are identified by content equality. Final ordering is
/// by descending score; ties keep first-encounter order (the sort is
/// stable over insertion order).
///
/// Returns the full fused list; callers truncate to the context size they
/// need.
pub fn rrf_fuse(per_query_results: &[Vec<ScoredPassage>], k: usize) -> Vec<FusedPassage> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut fused: Vec<FusedPassage> = Vec::new();

    for (rank, passage) in per_query_results.iter().flatten().enumerate() {
        let increment = 1.0 / (rank + k) as f64;

        match index.get(passage.content.as_str()) {
            Some(&slot) => fused[slot].score += increment,
            None => {
                index.insert(passage.content.clone(), fused.len());
                fused.push(FusedPassage {
                    content: passage.content.clone(),
                    source: passage.source.clone(),
                    score: increment,
                });
            }
        }
    }

    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    fused
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn passage(content: &str) -> ScoredPassage {
        ScoredPassage {
            content: content.to_string(),
            source: None,
            score: 0.5,
        }
    }

    #[test]
    fn test_single_list_preserves_order() {
        let lists = vec![vec![passage("a"), passage("b")]];

        let fused = rrf_fuse(&lists, 60);

        assert_eq!(fused.len(), 2);
        assert_eq!(fused[0].content, "a");
        assert_eq!(fused[1].content, "b");
        // Rank 0: 1/60, rank 1: 1/61
        assert_relative_eq!(fused[0].score, 1.0 / 60.0);
        assert_relative_eq!(fused[1].score, 1.0 / 61.0);
    }

    #[test]
    fn test_cross_list_boost() {
        // Flattened ranks: a:0, b:1, b:2, c:3. Ranks keep counting into the
        // second list instead of restarting at 0, so b's two occurrences
        // score 1/61 + 1/62 and beat a's single best-rank 1/60.
        let lists = vec![
            vec![passage("a"), passage("b")],
            vec![passage("b"), passage("c")],
        ];

        let fused = rrf_fuse(&lists, 60);

        assert_eq!(fused[0].content, "b");
        assert_relative_eq!(fused[0].score, 1.0 / 61.0 + 1.0 / 62.0);
        assert_eq!(fused[1].content, "a");
        assert_relative_eq!(fused[1].score, 1.0 / 60.0);

        // Under per-list rank reset b would score 1/61 + 1/60 instead;
        // make sure we did not produce that.
        assert!((fused[0].score - (1.0 / 61.0 + 1.0 / 60.0)).abs() > 1e-9);
    }

    #[test]
    fn test_union_of_all_lists() {
        let lists = vec![
            vec![passage("a"), passage("b")],
            vec![],
            vec![passage("c")],
        ];

        let fused = rrf_fuse(&lists, 60);

        let contents: Vec<&str> = fused.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents.len(), 3);
        assert!(contents.contains(&"a"));
        assert!(contents.contains(&"b"));
        assert!(contents.contains(&"c"));
    }

    #[test]
    fn test_duplicate_within_one_list_accumulates() {
        let lists = vec![vec![passage("a"), passage("a")]];

        let fused = rrf_fuse(&lists, 60);

        assert_eq!(fused.len(), 1);
        assert_relative_eq!(fused[0].score, 1.0 / 60.0 + 1.0 / 61.0);
    }

    #[test]
    fn test_later_lists_contribute_smaller_increments() {
        // Continuous ranks: the head of the second list sits at rank 1,
        // below the head of the first list at rank 0.
        let lists = vec![vec![passage("x")], vec![passage("y")]];

        let fused = rrf_fuse(&lists, 60);

        assert_eq!(fused[0].content, "x");
        assert_relative_eq!(fused[0].score, 1.0 / 60.0);
        assert_eq!(fused[1].content, "y");
        assert_relative_eq!(fused[1].score, 1.0 / 61.0);
    }

    #[test]
    fn test_idempotent_over_same_input() {
        let lists = vec![
            vec![passage("a"), passage("b")],
            vec![passage("b"), passage("c")],
        ];

        let first = rrf_fuse(&lists, 60);
        let second = rrf_fuse(&lists, 60);

        assert_eq!(first.len(), second.len());
        for (x, y) in first.iter().zip(second.iter()) {
            assert_eq!(x.content, y.content);
            assert_relative_eq!(x.score, y.score);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(rrf_fuse(&[], 60).is_empty());
        assert!(rrf_fuse(&[vec![], vec![]], 60).is_empty());
    }
}
