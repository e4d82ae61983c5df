//! Immutable in-memory table of word embeddings.
//!
//! Vectors are kept row-major in a single contiguous buffer so a full scan
//! walks memory linearly. The word index is built alongside the rows and is
//! never touched again after [`VectorStore::load`] returns.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{LoadError, LoadResult};
use crate::vector::{VectorDimension, WordId};

/// Read-only vocabulary of words and their vectors.
#[derive(Debug, Clone)]
pub struct VectorStore {
    words: Vec<String>,
    data: Vec<f32>,
    index: HashMap<String, WordId>,
    dimension: VectorDimension,
}

impl VectorStore {
    /// Loads at most `max_entries` records from a GloVe-format text source.
    ///
    /// Each non-blank line is `<word> <f1> ... <fD>`. The dimension is taken
    /// from the first record; any later record with a different component
    /// count aborts the load.
    pub fn load<R: BufRead>(source: R, max_entries: usize) -> LoadResult<Self> {
        let mut words = Vec::new();
        let mut data = Vec::new();
        let mut index = HashMap::new();
        let mut first_lines: Vec<usize> = Vec::new();
        let mut dimension: Option<VectorDimension> = None;

        for (line_idx, line) in source.lines().enumerate() {
            if words.len() >= max_entries {
                break;
            }
            let line_no = line_idx + 1;
            let line = line.map_err(|source| LoadError::Io {
                path: "<source>".into(),
                source,
            })?;

            let mut tokens = line.split_whitespace();
            let Some(word) = tokens.next() else {
                continue;
            };

            let row_start = data.len();
            for token in tokens {
                // `NaN`, `inf` and out-of-range literals parse but cannot be ranked
                let value = token
                    .parse::<f32>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| LoadError::InvalidNumber {
                        line: line_no,
                        word: word.to_string(),
                        token: token.to_string(),
                    })?;
                data.push(value);
            }
            let components = data.len() - row_start;

            let dim = match dimension {
                Some(dim) => dim,
                None => {
                    let dim =
                        VectorDimension::new(components).ok_or_else(|| LoadError::ZeroDimension {
                            line: line_no,
                            word: word.to_string(),
                        })?;
                    debug!(dimension = dim.get(), "inferred vector dimension from first record");
                    dimension = Some(dim);
                    dim
                }
            };

            if components != dim.get() {
                return Err(LoadError::MalformedRecord {
                    line: line_no,
                    word: word.to_string(),
                    expected: dim.get(),
                    actual: components,
                });
            }

            let id = WordId::new(words.len() as u32);
            if let Some(existing) = index.insert(word.to_string(), id) {
                return Err(LoadError::DuplicateWord {
                    line: line_no,
                    first_line: first_lines[existing.index()],
                    word: word.to_string(),
                });
            }
            words.push(word.to_string());
            first_lines.push(line_no);
        }

        let dimension = dimension.ok_or(LoadError::Empty)?;
        Ok(Self {
            words,
            data,
            index,
            dimension,
        })
    }

    /// Opens `path` and loads at most `max_entries` records from it.
    pub fn load_file(path: impl AsRef<Path>, max_entries: usize) -> LoadResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let store = Self::load(BufReader::new(file), max_entries).map_err(|e| match e {
            LoadError::Io { source, .. } => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        info!(
            path = %path.display(),
            words = store.len(),
            dimension = store.dimension.get(),
            "loaded embeddings"
        );
        Ok(store)
    }

    /// Looks up the position of `word`.
    #[must_use]
    pub fn word_to_id(&self, word: &str) -> Option<WordId> {
        self.index.get(word).copied()
    }

    /// Returns the word stored at `id`.
    ///
    /// # Panics
    /// Panics if `id` is not a position in this vocabulary.
    #[must_use]
    pub fn id_to_word(&self, id: WordId) -> &str {
        &self.words[id.index()]
    }

    /// Returns the vector stored at `id`.
    ///
    /// # Panics
    /// Panics if `id` is not a position in this vocabulary.
    #[must_use]
    pub fn vector(&self, id: WordId) -> &[f32] {
        let dim = self.dimension.get();
        let start = id.index() * dim;
        &self.data[start..start + dim]
    }

    /// Returns the vector for `word`, if present.
    #[must_use]
    pub fn vector_of(&self, word: &str) -> Option<&[f32]> {
        self.word_to_id(word).map(|id| self.vector(id))
    }

    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    #[must_use]
    pub fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    /// Number of words in the vocabulary.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in vocabulary order.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Iterates `(id, word, vector)` in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (WordId, &str, &[f32])> + '_ {
        self.words
            .iter()
            .zip(self.data.chunks_exact(self.dimension.get()))
            .enumerate()
            .map(|(i, (word, vector))| (WordId::new(i as u32), word.as_str(), vector))
    }

    /// One slice per vocabulary entry, in vocabulary order.
    #[must_use]
    pub fn rows(&self) -> Vec<&[f32]> {
        self.data.chunks_exact(self.dimension.get()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn load_str(text: &str, max: usize) -> LoadResult<VectorStore> {
        VectorStore::load(Cursor::new(text), max)
    }

    #[test]
    fn test_load_basic() {
        let store = load_str("the 0.1 0.2 0.3\nof -0.5 0.0 1.5\n", 10).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.dimension().get(), 3);
        assert_eq!(store.word_to_id("of"), Some(WordId::new(1)));
        assert_eq!(store.id_to_word(WordId::new(0)), "the");
        assert_eq!(store.vector(WordId::new(1)), &[-0.5, 0.0, 1.5]);
        assert_eq!(store.vector_of("the"), Some(&[0.1f32, 0.2, 0.3][..]));
        assert!(store.word_to_id("missing").is_none());
    }

    #[test]
    fn test_load_stops_at_max_entries() {
        let store = load_str("a 1 0\nb 0 1\nc 1 1\n", 2).unwrap();
        assert_eq!(store.len(), 2);
        assert!(!store.contains("c"));
    }

    #[test]
    fn test_load_fewer_records_than_max() {
        let store = load_str("a 1 0\nb 0 1\n", 10_000).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let store = load_str("a 1 0\n\n   \nb 0 1\n", 10).unwrap();
        assert_eq!(store.words(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_malformed_record_is_fatal() {
        let err = load_str("a 1 0\nb 0 1 2\n", 10).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MalformedRecord {
                line: 2,
                expected: 2,
                actual: 3,
                ..
            }
        ));

        let err = load_str("a 1 0 3\nb 0\n", 10).unwrap_err();
        assert!(matches!(err, LoadError::MalformedRecord { actual: 1, .. }));
    }

    #[test]
    fn test_invalid_number() {
        let err = load_str("a 1 zero\n", 10).unwrap_err();
        assert!(matches!(err, LoadError::InvalidNumber { ref token, .. } if token == "zero"));
    }

    #[test]
    fn test_non_finite_components_are_rejected() {
        for bad in ["NaN", "nan", "inf", "-inf", "infinity", "1e39"] {
            let err = load_str(&format!("a 1 0\nb {bad} 0\n"), 10).unwrap_err();
            assert!(
                matches!(err, LoadError::InvalidNumber { line: 2, ref token, .. } if token == bad),
                "{bad} should be rejected, got {err:?}"
            );
        }
        assert!(load_str("a 3.4e38 -1e-45\n", 10).is_ok());
    }

    #[test]
    fn test_duplicate_word() {
        let err = load_str("a 1 0\nb 0 1\na 1 1\n", 10).unwrap_err();
        assert!(matches!(
            err,
            LoadError::DuplicateWord {
                line: 3,
                first_line: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_and_zero_dimension() {
        assert!(matches!(load_str("", 10), Err(LoadError::Empty)));
        assert!(matches!(load_str("\n\n", 10), Err(LoadError::Empty)));
        assert!(matches!(
            load_str("lonely\n", 10),
            Err(LoadError::ZeroDimension { line: 1, .. })
        ));
    }

    #[test]
    fn test_iter_and_rows_follow_vocabulary_order() {
        let store = load_str("x 1 2\ny 3 4\nz 5 6\n", 10).unwrap();
        let words: Vec<&str> = store.iter().map(|(_, w, _)| w).collect();
        assert_eq!(words, vec!["x", "y", "z"]);
        let rows = store.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], &[5.0, 6.0]);
    }

    #[test]
    fn test_load_file_reports_path() {
        let err = VectorStore::load_file("/definitely/not/here.txt", 10).unwrap_err();
        match err {
            LoadError::Io { path, .. } => {
                assert_eq!(path, std::path::PathBuf::from("/definitely/not/here.txt"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
