//! Exact nearest-neighbour search by cosine distance.
//!
//! Every query is a linear scan over the whole vocabulary with a bounded
//! max-heap holding the best `k` candidates, so the cost is
//! O(|V| * D + |V| * log k) per query and nothing is indexed up front.
//!
//! Ranking rules:
//! - smaller distance ranks first
//! - equal distances keep vocabulary order
//! - candidates whose distance is undefined (zero-norm or non-finite query or entry) rank
//!   after every defined candidate and report [`MAX_COSINE_DISTANCE`]

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::error::{QueryError, QueryResult};
use crate::vector::{Expression, MAX_COSINE_DISTANCE, RankedMatch, VectorStore, WordId};

/// Computes the cosine distance `1 - cos(a, b)`, clamped to `[0, 2]`.
///
/// Returns `None` when the angle is undefined: either vector has zero norm
/// or contains a non-finite component. Sums run in `f64` so large finite
/// components do not overflow the norms.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Option<f32> {
    debug_assert_eq!(a.len(), b.len(), "Vectors must have same dimension");

    let (dot, norm_a, norm_b) = a.iter().zip(b.iter()).fold(
        (0.0f64, 0.0f64, 0.0f64),
        |(dot, na, nb), (&x, &y)| {
            let (x, y) = (f64::from(x), f64::from(y));
            (dot + x * y, na + x * x, nb + y * y)
        },
    );

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !similarity.is_finite() {
        return None;
    }
    Some(((1.0 - similarity) as f32).clamp(0.0, MAX_COSINE_DISTANCE))
}

/// Heap entry ordered by (undefined, distance, vocabulary position).
#[derive(Debug, Clone, Copy)]
struct Candidate {
    undefined: bool,
    distance: f32,
    id: WordId,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.undefined
            .cmp(&other.undefined)
            .then_with(|| self.distance.total_cmp(&other.distance))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Returns the `k` vocabulary entries closest to `query`, skipping `exclude`.
///
/// The result holds `min(k, available)` matches in non-decreasing distance
/// order, where `available` is the number of vocabulary words not excluded.
pub fn nearest<'a>(
    store: &'a VectorStore,
    query: &[f32],
    exclude: &HashSet<&str>,
    k: usize,
) -> QueryResult<Vec<RankedMatch<'a>>> {
    if k == 0 {
        return Err(QueryError::InvalidArgument {
            reason: "k must be at least 1".to_string(),
        });
    }
    store.dimension().validate_vector(query)?;

    let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k.min(store.len()) + 1);
    for (id, word, vector) in store.iter() {
        if exclude.contains(word) {
            continue;
        }
        let candidate = match cosine_distance(query, vector) {
            Some(distance) => Candidate {
                undefined: false,
                distance,
                id,
            },
            None => Candidate {
                undefined: true,
                distance: MAX_COSINE_DISTANCE,
                id,
            },
        };

        if heap.len() < k {
            heap.push(candidate);
        } else if heap.peek().is_some_and(|worst| candidate < *worst) {
            heap.pop();
            heap.push(candidate);
        }
    }

    Ok(heap
        .into_sorted_vec()
        .into_iter()
        .map(|c| RankedMatch {
            id: c.id,
            word: store.id_to_word(c.id),
            distance: c.distance,
            vector: store.vector(c.id),
        })
        .collect())
}

/// Evaluates `expression` and returns the `k` nearest words to the result,
/// excluding the words used in the expression.
pub fn nearest_to_expression<'a>(
    store: &'a VectorStore,
    expression: &Expression,
    k: usize,
) -> QueryResult<Vec<RankedMatch<'a>>> {
    let query = expression.evaluate(store)?;
    let exclude: HashSet<&str> = expression.operands().collect();
    nearest(store, &query, &exclude, k)
}
