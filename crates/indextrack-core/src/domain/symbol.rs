use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 15;

/// Normalized instrument ticker as the quote provider spells it.
///
/// Index tickers carry a leading caret (`^GSPC`), currency pairs a trailing
/// `=X`, and foreign listings an exchange suffix (`0700.HK`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a symbol to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        if let Some(first) = normalized.chars().next() {
            if !(first.is_ascii_alphanumeric() || first == '^') {
                return Err(ValidationError::SymbolInvalidStart { ch: first });
            }
        }

        for (index, ch) in normalized.chars().enumerate().skip(1) {
            let valid = ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '=');
            if !valid {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Market indices are quoted with a leading caret.
    pub fn is_index(&self) -> bool {
        self.0.starts_with('^')
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_symbol() {
        let parsed = Symbol::parse(" acwi ").expect("symbol should parse");
        assert_eq!(parsed.as_str(), "ACWI");
        assert!(!parsed.is_index());
    }

    #[test]
    fn accepts_index_and_suffixed_tickers() {
        let index = Symbol::parse("^gspc").expect("index should parse");
        assert_eq!(index.as_str(), "^GSPC");
        assert!(index.is_index());

        assert!(Symbol::parse("EURUSD=X").is_ok());
        assert!(Symbol::parse("0700.HK").is_ok());
        assert!(Symbol::parse("BRK-B").is_ok());
    }

    #[test]
    fn rejects_invalid_start() {
        let err = Symbol::parse(".SPX").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolInvalidStart { ch: '.' }));
    }

    #[test]
    fn rejects_caret_after_first_position() {
        let err = Symbol::parse("A^B").expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::SymbolInvalidChar { ch: '^', index: 1 }
        ));
    }

    #[test]
    fn rejects_path_characters() {
        let err = Symbol::parse("ACWI/../x").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolInvalidChar { ch: '/', .. }));
    }
}
