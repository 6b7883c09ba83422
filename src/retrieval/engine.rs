//! Retriever - parallel passage-store fan-out
//!
//! One store query per expanded query, all in flight at once. The store
//! calls are blocking I/O, so the pool is sized to the query count (the
//! expander caps that at 5) rather than to the CPU count.

use rayon::prelude::*;

use crate::store::{PassageStore, ScoredPassage};

/// Fans queries out against the passage store on a bounded worker pool
pub struct Retriever<'a> {
    store: &'a dyn PassageStore,
    k: usize,
}

impl<'a> Retriever<'a> {
    /// Create a retriever fetching up to `k` passages per query
    pub fn new(store: &'a dyn PassageStore, k: usize) -> Self {
        Self { store, k }
    }

    /// Run every query concurrently and collect results in input order.
    ///
    /// The output always has one entry per input query, positioned by
    /// submission index regardless of completion order. A failing store
    /// call is logged and yields an empty list for that position; sibling
    /// queries are unaffected.
    pub fn retrieve(&self, queries: &[String]) -> Vec<Vec<ScoredPassage>> {
        if queries.is_empty() {
            return Vec::new();
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(queries.len())
            .build();

        match pool {
            Ok(pool) => pool.install(|| self.fan_out(queries)),
            Err(e) => {
                tracing::warn!("failed to build retrieval pool, using shared pool: {}", e);
                self.fan_out(queries)
            }
        }
    }

    fn fan_out(&self, queries: &[String]) -> Vec<Vec<ScoredPassage>> {
        // par_iter + collect keeps results indexed by input position
        queries
            .par_iter()
            .map(|query| match self.store.query(query, self.k) {
                Ok(passages) => passages,
                Err(e) => {
                    tracing::warn!("passage query '{}' failed, substituting empty result: {:#}", query, e);
                    Vec::new()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Store whose behavior is keyed on the query text
    struct KeyedStore {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        delay: Option<Duration>,
    }

    impl KeyedStore {
        fn new(delay: Option<Duration>) -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                delay,
            }
        }
    }

    impl PassageStore for KeyedStore {
        fn query(&self, text: &str, k: usize) -> Result<Vec<ScoredPassage>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if text.contains("boom") {
                anyhow::bail!("store exploded");
            }

            Ok((0..k)
                .map(|i| ScoredPassage {
                    content: format!("{}-passage-{}", text, i),
                    source: None,
                    score: 1.0 - i as f32 * 0.1,
                })
                .collect())
        }
    }

    fn queries(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_results_positioned_by_submission_order() {
        let store = KeyedStore::new(None);
        let retriever = Retriever::new(&store, 2);

        let results = retriever.retrieve(&queries(&["q1", "q2", "q3"]));

        assert_eq!(results.len(), 3);
        assert_eq!(results[0][0].content, "q1-passage-0");
        assert_eq!(results[1][0].content, "q2-passage-0");
        assert_eq!(results[2][0].content, "q3-passage-0");
    }

    #[test]
    fn test_failed_query_is_isolated() {
        let store = KeyedStore::new(None);
        let retriever = Retriever::new(&store, 2);

        let results = retriever.retrieve(&queries(&["q1", "boom", "q3"]));

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].len(), 2);
        assert!(results[1].is_empty());
        assert_eq!(results[2].len(), 2);
    }

    #[test]
    fn test_queries_run_concurrently() {
        let store = KeyedStore::new(Some(Duration::from_millis(50)));
        let retriever = Retriever::new(&store, 1);

        retriever.retrieve(&queries(&["q1", "q2", "q3"]));

        // The dedicated pool has one thread per query, so the sleeps overlap
        assert!(store.max_in_flight.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn test_per_query_native_ranking_preserved() {
        let store = KeyedStore::new(None);
        let retriever = Retriever::new(&store, 3);

        let results = retriever.retrieve(&queries(&["q1"]));

        let scores: Vec<f32> = results[0].iter().map(|p| p.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_empty_query_set() {
        let store = KeyedStore::new(None);
        let retriever = Retriever::new(&store, 5);

        assert!(retriever.retrieve(&[]).is_empty());
    }
}
