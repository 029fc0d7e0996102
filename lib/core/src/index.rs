//! Exact cosine index over facility embeddings
//!
//! The index is a set of immutable snapshots. `build` assembles a complete
//! snapshot off-lock and swaps it in; `search` clones the current snapshot
//! under a short read guard and scores against it. An in-flight search
//! therefore always sees one whole index, either the one before a rebuild
//! or the one after.

use crate::{Error, FacilityId, Result, Vector};
use ordered_float::OrderedFloat;
use parking_lot::RwLock;
use rayon::prelude::*;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use std::sync::Arc;

/// Below this many vectors scoring runs on the calling thread
const PARALLEL_SCAN_THRESHOLD: usize = 4_096;

#[derive(Debug)]
struct IndexSnapshot {
    ids: Vec<FacilityId>,
    vectors: Vec<Vector>,
    dim: usize,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct VectorIndex {
    current: RwLock<Option<Arc<IndexSnapshot>>>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the index contents with `entries`.
    ///
    /// Ids are deduplicated (last one wins) and stored in ascending order, so
    /// rebuilding from identical input yields an equivalent index. Returns the
    /// generation of the new snapshot.
    pub fn build<I>(&self, entries: I) -> Result<u64>
    where
        I: IntoIterator<Item = (FacilityId, Vector)>,
    {
        let by_id: BTreeMap<FacilityId, Vector> = entries.into_iter().collect();

        let dim = by_id.values().next().map(Vector::dim).unwrap_or(0);
        if let Some(bad) = by_id.values().find(|v| v.dim() != dim) {
            return Err(Error::InvalidDimension {
                expected: dim,
                actual: bad.dim(),
            });
        }

        let (ids, vectors): (Vec<_>, Vec<_>) = by_id
            .into_iter()
            .map(|(id, vector)| (id, vector.normalized()))
            .unzip();

        let mut current = self.current.write();
        let generation = current.as_ref().map_or(1, |s| s.generation + 1);
        *current = Some(Arc::new(IndexSnapshot {
            ids,
            vectors,
            dim,
            generation,
        }));
        Ok(generation)
    }

    /// Top-`k` facilities by cosine similarity, ties broken by ascending id
    pub fn search(&self, query: &Vector, k: usize) -> Result<Vec<(FacilityId, f32)>> {
        let snapshot = self.snapshot()?;

        if k == 0 || snapshot.ids.is_empty() {
            return Ok(Vec::new());
        }
        if query.dim() != snapshot.dim {
            return Err(Error::InvalidDimension {
                expected: snapshot.dim,
                actual: query.dim(),
            });
        }

        let query = query.normalized();
        let scores: Vec<f32> = if snapshot.vectors.len() >= PARALLEL_SCAN_THRESHOLD {
            snapshot.vectors.par_iter().map(|v| v.dot(&query)).collect()
        } else {
            snapshot.vectors.iter().map(|v| v.dot(&query)).collect()
        };

        // the heap top is the weakest kept hit: lowest score, then highest id
        let mut heap: BinaryHeap<(Reverse<OrderedFloat<f32>>, FacilityId)> =
            BinaryHeap::with_capacity(k + 1);
        for (id, score) in snapshot.ids.iter().zip(scores) {
            heap.push((Reverse(OrderedFloat(score)), *id));
            if heap.len() > k {
                heap.pop();
            }
        }

        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|(Reverse(score), id)| (id, score.into_inner()))
            .collect())
    }

    pub fn is_built(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn len(&self) -> usize {
        self.current.read().as_ref().map_or(0, |s| s.ids.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dim(&self) -> Option<usize> {
        self.current.read().as_ref().map(|s| s.dim)
    }

    /// 0 before the first build, then incremented by every build
    pub fn generation(&self) -> u64 {
        self.current.read().as_ref().map_or(0, |s| s.generation)
    }

    pub fn contains(&self, id: FacilityId) -> bool {
        self.current
            .read()
            .as_ref()
            .is_some_and(|s| s.ids.binary_search(&id).is_ok())
    }

    fn snapshot(&self) -> Result<Arc<IndexSnapshot>> {
        self.current.read().clone().ok_or(Error::IndexNotBuilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn entries() -> Vec<(FacilityId, Vector)> {
        vec![
            (FacilityId(3), Vector::new(vec![1.0, 0.0, 0.0])),
            (FacilityId(1), Vector::new(vec![0.0, 1.0, 0.0])),
            (FacilityId(2), Vector::new(vec![1.0, 1.0, 0.0])),
        ]
    }

    #[test]
    fn test_search_before_build_fails() {
        let index = VectorIndex::new();
        assert_eq!(
            index.search(&Vector::new(vec![1.0, 0.0, 0.0]), 5),
            Err(Error::IndexNotBuilt)
        );
        assert_eq!(index.generation(), 0);
    }

    #[test]
    fn test_search_orders_by_cosine() {
        let index = VectorIndex::new();
        index.build(entries()).unwrap();

        let results = index.search(&Vector::new(vec![1.0, 0.2, 0.0]), 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, FacilityId(3));
        assert_eq!(results[1].0, FacilityId(2));
        assert!(results[0].1 >= results[1].1);
    }

    #[test]
    fn test_ties_break_by_ascending_id() {
        let index = VectorIndex::new();
        index
            .build(vec![
                (FacilityId(9), Vector::new(vec![1.0, 0.0])),
                (FacilityId(4), Vector::new(vec![2.0, 0.0])),
                (FacilityId(7), Vector::new(vec![1.0, 0.0])),
            ])
            .unwrap();

        let results = index.search(&Vector::new(vec![1.0, 0.0]), 3).unwrap();
        let ids: Vec<_> = results.iter().map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![4, 7, 9]);

        let top_two = index.search(&Vector::new(vec![1.0, 0.0]), 2).unwrap();
        assert_eq!(top_two.iter().map(|(id, _)| id.0).collect::<Vec<_>>(), vec![4, 7]);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let index = VectorIndex::new();
        let query = Vector::new(vec![0.3, 0.7, 0.1]);

        index.build(entries()).unwrap();
        let first = index.search(&query, 3).unwrap();
        let gen = index.build(entries().into_iter().rev()).unwrap();
        let second = index.search(&query, 3).unwrap();

        assert_eq!(first, second);
        assert_eq!(gen, 2);
    }

    #[test]
    fn test_dimension_checks() {
        let index = VectorIndex::new();
        let err = index
            .build(vec![
                (FacilityId(1), Vector::new(vec![1.0, 0.0])),
                (FacilityId(2), Vector::new(vec![1.0, 0.0, 0.0])),
            ])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDimension { .. }));
        assert!(!index.is_built());

        index.build(entries()).unwrap();
        assert!(matches!(
            index.search(&Vector::new(vec![1.0]), 1),
            Err(Error::InvalidDimension { expected: 3, actual: 1 })
        ));
        assert!(index.search(&Vector::new(vec![1.0, 0.0, 0.0]), 0).unwrap().is_empty());
    }

    #[test]
    fn test_empty_build_answers_empty() {
        let index = VectorIndex::new();
        index.build(Vec::new()).unwrap();
        assert!(index.is_built());
        assert!(index.search(&Vector::new(vec![1.0]), 3).unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_search_sees_whole_snapshots() {
        let index = Arc::new(VectorIndex::new());
        let small: Vec<_> = (0..10u64).map(|i| (FacilityId(i), Vector::new(vec![1.0, i as f32]))).collect();
        let large: Vec<_> = (0..50u64).map(|i| (FacilityId(i), Vector::new(vec![1.0, i as f32]))).collect();
        index.build(small.clone()).unwrap();

        let writer = {
            let index = index.clone();
            thread::spawn(move || {
                for round in 0..50 {
                    let entries = if round % 2 == 0 { large.clone() } else { small.clone() };
                    index.build(entries).unwrap();
                }
            })
        };

        for _ in 0..200 {
            let hits = index.search(&Vector::new(vec![1.0, 0.0]), 100).unwrap();
            assert!(hits.len() == 10 || hits.len() == 50, "partial snapshot: {}", hits.len());
        }
        writer.join().unwrap();
    }
}
