//! Bounded-concurrency frontier expansion.
//!
//! Drives breadth-first traversal of an identifier graph: each identifier is
//! expanded at most once, expansions for sibling identifiers run
//! concurrently up to a configured bound, and identifiers returned by an
//! expansion are fed back into the frontier until nothing new appears.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::error::{Error, Result};

/// Default bound on in-flight expansions.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// Expand a frontier of identifiers until no new ones remain.
///
/// `expand` is invoked at most once per unique identifier; the identifiers
/// it returns join the frontier. Sibling expansions run concurrently, at
/// most `max_in_flight` at a time, and their completion order is
/// unspecified. Any expansion failure aborts the whole traversal.
pub async fn concurrent_expand<F, Fut>(
    expand: F,
    seeds: HashSet<String>,
    max_in_flight: usize,
) -> Result<()>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<HashSet<String>>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let mut visited: HashSet<String> = HashSet::new();
    let mut pending: Vec<String> = seeds.into_iter().collect();
    let mut in_flight = JoinSet::new();

    loop {
        for id in pending.drain(..) {
            if !visited.insert(id.clone()) {
                continue;
            }
            debug!("expanding {id}");
            let semaphore = Arc::clone(&semaphore);
            let future = expand(id);
            in_flight.spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| Error::Internal(format!("expansion semaphore closed: {e}")))?;
                future.await
            });
        }

        match in_flight.join_next().await {
            Some(joined) => {
                let discovered = joined
                    .map_err(|e| Error::Internal(format!("expansion task panicked: {e}")))??;
                pending.extend(discovered);
            }
            // Frontier drained and no expansions in flight: traversal done.
            None => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn graph(edges: &[(&str, &[&str])]) -> HashMap<String, HashSet<String>> {
        edges
            .iter()
            .map(|(node, children)| {
                (
                    node.to_string(),
                    children.iter().map(|c| c.to_string()).collect(),
                )
            })
            .collect()
    }

    async fn expand_counting(
        graph: HashMap<String, HashSet<String>>,
        seeds: HashSet<String>,
    ) -> HashMap<String, usize> {
        let counts: Arc<Mutex<HashMap<String, usize>>> = Arc::new(Mutex::new(HashMap::new()));
        let expand = {
            let counts = Arc::clone(&counts);
            move |id: String| {
                let counts = Arc::clone(&counts);
                let children = graph.get(&id).cloned().unwrap_or_default();
                async move {
                    *counts.lock().unwrap().entry(id).or_insert(0) += 1;
                    Ok(children)
                }
            }
        };
        concurrent_expand(expand, seeds, 4).await.unwrap();
        Arc::try_unwrap(counts).unwrap().into_inner().unwrap()
    }

    #[tokio::test]
    async fn test_expands_transitive_graph_once_each() {
        let graph = graph(&[
            ("a", &["c"][..]),
            ("b", &[][..]),
            ("c", &["d"][..]),
            ("d", &[][..]),
        ]);
        let seeds: HashSet<String> = ["a".to_string(), "b".to_string()].into();
        let counts = expand_counting(graph, seeds).await;
        assert_eq!(counts.len(), 4);
        assert!(counts.values().all(|&count| count == 1));
    }

    #[tokio::test]
    async fn test_diamond_references_expand_once() {
        // a and b both point at shared; shared must expand a single time.
        let graph = graph(&[
            ("a", &["shared"][..]),
            ("b", &["shared"][..]),
            ("shared", &[][..]),
        ]);
        let seeds: HashSet<String> = ["a".to_string(), "b".to_string()].into();
        let counts = expand_counting(graph, seeds).await;
        assert_eq!(counts.get("shared"), Some(&1));
    }

    #[tokio::test]
    async fn test_cycles_terminate() {
        let graph = graph(&[("a", &["b"][..]), ("b", &["a"][..])]);
        let seeds: HashSet<String> = ["a".to_string()].into();
        let counts = expand_counting(graph, seeds).await;
        assert_eq!(counts.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_seed_set_is_a_noop() {
        let expand = |_: String| async move { Ok(HashSet::new()) };
        concurrent_expand(expand, HashSet::new(), 4).await.unwrap();
    }

    #[tokio::test]
    async fn test_expansion_failure_aborts() {
        let expand = |id: String| async move {
            if id == "bad" {
                Err(Error::RemoteService("boom".to_string()))
            } else {
                Ok(["bad".to_string()].into())
            }
        };
        let seeds: HashSet<String> = ["ok".to_string()].into();
        let err = concurrent_expand(expand, seeds, 4).await.unwrap_err();
        assert!(matches!(err, Error::RemoteService(_)));
    }
}
