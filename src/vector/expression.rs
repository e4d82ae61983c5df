//! Word arithmetic expressions: `start [(+|-) word]...`.
//!
//! Tokens are whitespace separated. After the start word, tokens alternate
//! between an operator and an operand, so `king - man + woman` is three
//! words and two operators.

use crate::error::{ParseError, QueryError, QueryResult};
use crate::vector::VectorStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
}

impl Operator {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "+" => Some(Self::Plus),
            "-" => Some(Self::Minus),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
        }
    }
}

/// A parsed arithmetic expression over vocabulary words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    start: String,
    terms: Vec<(Operator, String)>,
}

impl Expression {
    /// Parses an expression such as `"paris - france + italy"`.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let mut tokens = input.split_whitespace().enumerate();

        let start = match tokens.next() {
            None => return Err(ParseError::Empty),
            Some((_, token)) if Operator::from_token(token).is_some() => {
                return Err(ParseError::LeadingOperator {
                    operator: token.to_string(),
                });
            }
            Some((_, token)) => token.to_string(),
        };

        let mut terms = Vec::new();
        while let Some((position, token)) = tokens.next() {
            let Some(operator) = Operator::from_token(token) else {
                return Err(if is_operator_like(token) {
                    ParseError::UnknownOperator {
                        position,
                        operator: token.to_string(),
                    }
                } else {
                    ParseError::MissingOperator {
                        position,
                        word: token.to_string(),
                    }
                });
            };

            match tokens.next() {
                None => {
                    return Err(ParseError::MissingOperand {
                        position,
                        operator: token.to_string(),
                    });
                }
                Some((next_position, next)) if Operator::from_token(next).is_some() => {
                    return Err(ParseError::ConsecutiveOperators {
                        position: next_position,
                        operator: next.to_string(),
                    });
                }
                Some((_, word)) => terms.push((operator, word.to_string())),
            }
        }

        Ok(Self { start, terms })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    /// Words subtracted from the start vector, in expression order.
    pub fn minus_words(&self) -> impl Iterator<Item = &str> {
        self.words_with(Operator::Minus)
    }

    /// Words added to the start vector, in expression order.
    pub fn plus_words(&self) -> impl Iterator<Item = &str> {
        self.words_with(Operator::Plus)
    }

    /// Every word in the expression, start word first.
    pub fn operands(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.start.as_str()).chain(self.terms.iter().map(|(_, w)| w.as_str()))
    }

    fn words_with(&self, operator: Operator) -> impl Iterator<Item = &str> {
        self.terms
            .iter()
            .filter(move |(op, _)| *op == operator)
            .map(|(_, word)| word.as_str())
    }

    /// Combines the word vectors: `start - sum(minus) + sum(plus)`.
    ///
    /// Words are looked up start first, then minus words, then plus words;
    /// the first word missing from the vocabulary is reported and nothing
    /// else is computed.
    pub fn evaluate(&self, store: &VectorStore) -> QueryResult<Vec<f32>> {
        let lookup = |word: &str| {
            store.vector_of(word).ok_or_else(|| QueryError::UnknownWord {
                word: word.to_string(),
            })
        };

        let mut result = lookup(self.start.as_str())?.to_vec();
        let minus = self.minus_words().map(lookup).collect::<QueryResult<Vec<_>>>()?;
        let plus = self.plus_words().map(lookup).collect::<QueryResult<Vec<_>>>()?;

        for vector in minus {
            for (acc, value) in result.iter_mut().zip(vector) {
                *acc -= value;
            }
        }
        for vector in plus {
            for (acc, value) in result.iter_mut().zip(vector) {
                *acc += value;
            }
        }
        Ok(result)
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start)?;
        for (operator, word) in &self.terms {
            write!(f, " {} {word}", operator.symbol())?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Tokens made only of symbols (`*`, `--`, `+=`) are treated as operators.
fn is_operator_like(token: &str) -> bool {
    token.chars().all(|c| c.is_ascii_punctuation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn royal_store() -> VectorStore {
        VectorStore::load(
            Cursor::new("king 1 0\nqueen 0.9 0.1\nman 1 1\nwoman 0.8 1\n"),
            100,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_mixed_expression() {
        let expr = Expression::parse("king - man + woman").unwrap();
        assert_eq!(expr.start(), "king");
        assert_eq!(expr.minus_words().collect::<Vec<_>>(), vec!["man"]);
        assert_eq!(expr.plus_words().collect::<Vec<_>>(), vec!["woman"]);
        assert_eq!(
            expr.operands().collect::<Vec<_>>(),
            vec!["king", "man", "woman"]
        );
        assert_eq!(expr.to_string(), "king - man + woman");
    }

    #[test]
    fn test_parse_single_word_and_extra_whitespace() {
        let expr = Expression::parse("  president  ").unwrap();
        assert_eq!(expr.start(), "president");
        assert_eq!(expr.operands().count(), 1);

        let expr: Expression = "war\t-  violence +\npeace".parse().unwrap();
        assert_eq!(expr.to_string(), "war - violence + peace");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Expression::parse("   "), Err(ParseError::Empty));
        assert!(matches!(
            Expression::parse("- king"),
            Err(ParseError::LeadingOperator { .. })
        ));
        assert_eq!(
            Expression::parse("king - - man"),
            Err(ParseError::ConsecutiveOperators {
                position: 2,
                operator: "-".to_string()
            })
        );
        assert_eq!(
            Expression::parse("king +"),
            Err(ParseError::MissingOperand {
                position: 1,
                operator: "+".to_string()
            })
        );
        assert_eq!(
            Expression::parse("king man"),
            Err(ParseError::MissingOperator {
                position: 1,
                word: "man".to_string()
            })
        );
        assert_eq!(
            Expression::parse("king * man"),
            Err(ParseError::UnknownOperator {
                position: 1,
                operator: "*".to_string()
            })
        );
    }

    #[test]
    fn test_evaluate_king_man_woman() {
        let store = royal_store();
        let vector = Expression::parse("king - man + woman")
            .unwrap()
            .evaluate(&store)
            .unwrap();
        assert_eq!(vector.len(), 2);
        assert!((vector[0] - 0.8).abs() < 1e-6);
        assert!(vector[1].abs() < 1e-6);
    }

    #[test]
    fn test_evaluate_order_independent_within_tolerance() {
        let store = royal_store();
        let a = Expression::parse("king + man + woman - queen")
            .unwrap()
            .evaluate(&store)
            .unwrap();
        let b = Expression::parse("king - queen + woman + man")
            .unwrap()
            .evaluate(&store)
            .unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_evaluate_single_word_copies_vector() {
        let store = royal_store();
        let vector = Expression::parse("queen").unwrap().evaluate(&store).unwrap();
        assert_eq!(vector, vec![0.9, 0.1]);
    }

    #[test]
    fn test_evaluate_reports_first_unknown_word() {
        let store = royal_store();
        let err = Expression::parse("king + prince - duke")
            .unwrap()
            .evaluate(&store)
            .unwrap_err();
        // minus words are looked up before plus words
        assert!(matches!(err, QueryError::UnknownWord { ref word } if word == "duke"));

        let err = Expression::parse("emperor - man")
            .unwrap()
            .evaluate(&store)
            .unwrap_err();
        assert!(matches!(err, QueryError::UnknownWord { ref word } if word == "emperor"));
    }
}
