//! Type-safe wrappers and core types for the embedding vocabulary.
//!
//! Newtypes keep word positions and vector dimensions from being mixed up
//! with plain counts.

use serde::Serialize;

use crate::error::QueryError;

/// Largest value a cosine distance can take (opposite directions).
pub const MAX_COSINE_DISTANCE: f32 = 2.0;

/// Position of a word in the loaded vocabulary.
///
/// Ids are dense and zero-based: the first record of the embedding source is
/// `WordId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WordId(u32);

impl WordId {
    /// Creates a new `WordId`.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying u32 value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the id as a row index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for WordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type-safe wrapper for vector dimensions.
///
/// A dimension is never zero: the loader rejects records without components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VectorDimension(usize);

impl VectorDimension {
    /// Creates a new `VectorDimension`.
    ///
    /// Returns `None` if the dimension is zero.
    #[must_use]
    pub const fn new(dim: usize) -> Option<Self> {
        if dim == 0 { None } else { Some(Self(dim)) }
    }

    /// Returns the underlying dimension value.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }

    /// Validates that a vector has the expected dimension.
    pub fn validate_vector(&self, vector: &[f32]) -> Result<(), QueryError> {
        if vector.len() != self.0 {
            return Err(QueryError::DimensionMismatch {
                expected: self.0,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for VectorDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A nearest-neighbour hit borrowed from the vector store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMatch<'a> {
    /// Position of the matched word in the vocabulary
    pub id: WordId,
    /// The matched word
    pub word: &'a str,
    /// Cosine distance to the query, in `[0, 2]`
    pub distance: f32,
    /// The matched word's vector
    #[serde(skip)]
    pub vector: &'a [f32],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_id() {
        let id = WordId::new(42);
        assert_eq!(id.get(), 42);
        assert_eq!(id.index(), 42);
        assert_eq!(id.to_string(), "42");
        assert!(WordId::new(1) < WordId::new(2));
    }

    #[test]
    fn test_vector_dimension() {
        let dim = VectorDimension::new(50).unwrap();
        assert_eq!(dim.get(), 50);
        assert!(VectorDimension::new(0).is_none());

        assert!(dim.validate_vector(&[0.1; 50]).is_ok());
        assert!(matches!(
            dim.validate_vector(&[0.1; 3]),
            Err(QueryError::DimensionMismatch {
                expected: 50,
                actual: 3
            })
        ));
    }
}
