//! K-means clustering behind the [`Clusterer`] capability.
//!
//! The cluster cache only depends on the [`Clusterer`] trait; this module
//! provides the default implementation, a pure Rust K-means that uses
//! cosine similarity as its metric and K-means++ for centroid seeding.
//!
//! # Algorithm Details
//! - Distance metric: cosine distance (not Euclidean)
//! - Initialization: K-means++
//! - Restarts: `n_init` independent runs, lowest inertia wins
//! - Convergence: no assignment changes, or mean centroid movement below tolerance
//!
//! # Performance Characteristics
//! - O(n * k * d * iterations * n_init) time
//! - O(k * d) space for centroids
//! - Assignment step runs on a rayon pool when more than one thread is configured

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Epsilon for floating-point comparisons.
const EPSILON: f32 = 1e-10;

/// Partitions vectors into a fixed number of groups.
///
/// Implementations return one label per input vector, each in `[0, k)`.
pub trait Clusterer {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Assigns every vector in `vectors` to one of `k` clusters.
    fn cluster(&self, vectors: &[&[f32]], k: usize) -> Result<Vec<usize>, ClusteringError>;
}

/// Errors that can occur during clustering operations.
#[derive(Error, Debug)]
pub enum ClusteringError {
    #[error(
        "Empty vector set provided for clustering\nSuggestion: Load at least one word before clustering"
    )]
    EmptyVectorSet,

    #[error("Invalid cluster count: {0}\nSuggestion: Use k between 1 and the number of vectors")]
    InvalidClusterCount(usize),

    #[error(
        "Dimension mismatch in vectors\nSuggestion: Ensure all vectors come from the same embedding file"
    )]
    DimensionMismatch,

    #[error(
        "Failed to initialize centroids\nSuggestion: Check that vectors contain valid floating-point values"
    )]
    InitializationFailed,

    #[error("Failed to build clustering thread pool: {0}")]
    ThreadPool(String),
}

/// Tuning knobs for [`KMeansClusterer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansConfig {
    /// Number of independent K-means++ restarts
    #[serde(default = "default_n_init")]
    pub n_init: usize,

    /// Maximum Lloyd iterations per restart
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Convergence tolerance for mean centroid movement
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,

    /// Seed for reproducible runs; restarts use `seed + restart`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Worker threads for the assignment step (1 = sequential)
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_n_init() -> usize {
    10
}
fn default_max_iterations() -> usize {
    100
}
fn default_tolerance() -> f32 {
    1e-4
}
fn default_threads() -> usize {
    num_cpus::get()
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_init: default_n_init(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            seed: None,
            threads: default_threads(),
        }
    }
}

/// Result of a single K-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansResult {
    /// Cluster centroids, unit length
    pub centroids: Vec<Vec<f32>>,

    /// Cluster label for each input vector, in `[0, k)`
    pub assignments: Vec<usize>,

    /// Sum of cosine distances from each vector to its centroid
    pub inertia: f32,

    /// Number of iterations until convergence
    pub iterations: usize,
}

/// Cosine K-means with K-means++ seeding and restarts.
#[derive(Debug, Clone, Default)]
pub struct KMeansClusterer {
    config: KMeansConfig,
}

impl KMeansClusterer {
    pub fn new(config: KMeansConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    /// Runs every restart and keeps the lowest-inertia result.
    pub fn fit(&self, vectors: &[&[f32]], k: usize) -> Result<KMeansResult, ClusteringError> {
        validate_input(vectors, k)?;

        if self.config.threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.threads)
                .build()
                .map_err(|e| ClusteringError::ThreadPool(e.to_string()))?;
            pool.install(|| self.fit_restarts(vectors, k, true))
        } else {
            self.fit_restarts(vectors, k, false)
        }
    }

    fn fit_restarts(
        &self,
        vectors: &[&[f32]],
        k: usize,
        parallel: bool,
    ) -> Result<KMeansResult, ClusteringError> {
        let mut best: Option<KMeansResult> = None;

        for restart in 0..self.config.n_init.max(1) {
            let mut rng = match self.config.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(restart as u64)),
                None => StdRng::from_os_rng(),
            };
            let result = kmeans_clustering(vectors, k, &self.config, &mut rng, parallel)?;
            debug!(
                restart,
                inertia = result.inertia,
                iterations = result.iterations,
                "k-means restart finished"
            );
            if best.as_ref().is_none_or(|b| result.inertia < b.inertia) {
                best = Some(result);
            }
        }

        best.ok_or(ClusteringError::InitializationFailed)
    }
}

impl Clusterer for KMeansClusterer {
    fn name(&self) -> &str {
        "kmeans"
    }

    fn cluster(&self, vectors: &[&[f32]], k: usize) -> Result<Vec<usize>, ClusteringError> {
        self.fit(vectors, k).map(|result| result.assignments)
    }
}

fn validate_input(vectors: &[&[f32]], k: usize) -> Result<(), ClusteringError> {
    if vectors.is_empty() {
        return Err(ClusteringError::EmptyVectorSet);
    }

    if k == 0 || k > vectors.len() {
        return Err(ClusteringError::InvalidClusterCount(k));
    }

    let dimension = vectors[0].len();
    if vectors.iter().any(|v| v.len() != dimension) {
        return Err(ClusteringError::DimensionMismatch);
    }
    Ok(())
}

/// Performs one K-means run on a set of vectors using cosine similarity.
///
/// # Algorithm
/// 1. Initialize centroids using K-means++ method
/// 2. Iterate until convergence or max iterations:
///    - Assign each vector to nearest centroid (by cosine similarity)
///    - Update centroids as mean of assigned vectors
///    - Check convergence based on centroid movement
#[must_use = "clustering results should be used or the computation is wasted"]
pub fn kmeans_clustering<R: Rng>(
    vectors: &[&[f32]],
    k: usize,
    config: &KMeansConfig,
    rng: &mut R,
    parallel: bool,
) -> Result<KMeansResult, ClusteringError> {
    validate_input(vectors, k)?;

    let mut centroids = initialize_centroids_kmeans_plus_plus(vectors, k, rng)?;
    let mut assignments: Vec<usize> = Vec::new();
    let mut iterations = 0;
    let max_iterations = config.max_iterations.max(1);

    loop {
        iterations += 1;

        let new_assignments = assign_all(vectors, &centroids, parallel);

        let converged = new_assignments == assignments;
        assignments = new_assignments;

        if converged || iterations >= max_iterations {
            break;
        }

        let new_centroids = update_centroids(vectors, &assignments, k, rng);

        let centroid_movement = calculate_centroid_movement(&centroids, &new_centroids);
        centroids = new_centroids;

        if centroid_movement < config.tolerance {
            // Labels must reflect the final centroids
            assignments = assign_all(vectors, &centroids, parallel);
            break;
        }
    }

    if iterations >= max_iterations {
        warn!("k-means did not fully converge after {max_iterations} iterations");
    }

    let inertia = vectors
        .iter()
        .zip(&assignments)
        .map(|(vector, &label)| 1.0 - cosine_similarity(vector, &centroids[label]))
        .sum();

    Ok(KMeansResult {
        centroids,
        assignments,
        inertia,
        iterations,
    })
}

fn assign_all(vectors: &[&[f32]], centroids: &[Vec<f32>], parallel: bool) -> Vec<usize> {
    let centroid_refs: Vec<&[f32]> = centroids.iter().map(|c| c.as_slice()).collect();
    if parallel {
        vectors
            .par_iter()
            .map(|vector| assign_to_nearest_centroid(vector, &centroid_refs))
            .collect()
    } else {
        vectors
            .iter()
            .map(|vector| assign_to_nearest_centroid(vector, &centroid_refs))
            .collect()
    }
}

/// Assigns a vector to the nearest centroid based on cosine similarity.
///
/// Ties go to the lowest centroid index.
pub fn assign_to_nearest_centroid(vector: &[f32], centroids: &[&[f32]]) -> usize {
    let mut best_similarity = f32::NEG_INFINITY;
    let mut best_cluster = 0;

    for (i, centroid) in centroids.iter().enumerate() {
        let similarity = cosine_similarity(vector, centroid);
        if similarity > best_similarity {
            best_similarity = similarity;
            best_cluster = i;
        }
    }

    best_cluster
}

/// Updates centroids as the normalized mean of their assigned vectors.
fn update_centroids<R: Rng>(
    vectors: &[&[f32]],
    assignments: &[usize],
    k: usize,
    rng: &mut R,
) -> Vec<Vec<f32>> {
    let dimension = vectors[0].len();
    let mut new_centroids = vec![vec![0.0; dimension]; k];
    let mut cluster_sizes = vec![0usize; k];

    for (vector, &label) in vectors.iter().zip(assignments.iter()) {
        for (sum, &value) in new_centroids[label].iter_mut().zip(vector.iter()) {
            *sum += value;
        }
        cluster_sizes[label] += 1;
    }

    for (centroid, &size) in new_centroids.iter_mut().zip(cluster_sizes.iter()) {
        if size == 0 {
            // Empty cluster: reseed from a random vector
            let random_idx = rng.random_range(0..vectors.len());
            *centroid = normalize_vector_copy(vectors[random_idx]);
        } else {
            for value in centroid.iter_mut() {
                *value /= size as f32;
            }
            normalize_vector(centroid);
        }
    }

    new_centroids
}

/// Computes cosine similarity between two vectors.
///
/// Returns a value in `[-1, 1]`; zero-norm input yields 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vectors must have same dimension");

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// K-means++ seeding: each new centroid is drawn with probability
/// proportional to its squared cosine distance from the nearest existing one.
fn initialize_centroids_kmeans_plus_plus<R: Rng>(
    vectors: &[&[f32]],
    k: usize,
    rng: &mut R,
) -> Result<Vec<Vec<f32>>, ClusteringError> {
    let mut centroids = Vec::with_capacity(k);

    let first_idx = rng.random_range(0..vectors.len());
    centroids.push(normalize_vector_copy(vectors[first_idx]));

    // Squared distance from each vector to its nearest centroid so far
    let mut min_distances = vec![f32::MAX; vectors.len()];

    for _ in 1..k {
        let newest = centroids.last().ok_or(ClusteringError::InitializationFailed)?;
        let mut total_distance = 0.0f32;

        for (slot, vector) in min_distances.iter_mut().zip(vectors.iter()) {
            let distance = 1.0 - cosine_similarity(vector, newest);
            *slot = slot.min(distance * distance);
            total_distance += *slot;
        }

        if total_distance < EPSILON {
            // Fewer distinct directions than clusters: fill with unused rows
            let idx = centroids.len() % vectors.len();
            centroids.push(normalize_vector_copy(vectors[idx]));
            continue;
        }

        let target = rng.random::<f32>() * total_distance;
        let mut cumulative = 0.0;
        let mut chosen = vectors.len() - 1;
        for (i, &distance) in min_distances.iter().enumerate() {
            cumulative += distance;
            if cumulative >= target {
                chosen = i;
                break;
            }
        }
        centroids.push(normalize_vector_copy(vectors[chosen]));
    }

    if centroids.len() != k {
        return Err(ClusteringError::InitializationFailed);
    }

    Ok(centroids)
}

/// Mean cosine distance moved by centroids between iterations.
fn calculate_centroid_movement(old: &[Vec<f32>], new: &[Vec<f32>]) -> f32 {
    old.iter()
        .zip(new.iter())
        .map(|(old_c, new_c)| 1.0 - cosine_similarity(old_c, new_c))
        .sum::<f32>()
        / old.len() as f32
}

/// Normalizes a vector in-place to unit length.
fn normalize_vector(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > EPSILON {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
    // If norm is too small, leave vector as-is (effectively zero vector)
}

fn normalize_vector_copy(vector: &[f32]) -> Vec<f32> {
    let mut normalized = vector.to_vec();
    normalize_vector(&mut normalized);
    normalized
}
