//! PDR statement tokenizer
//!
//! PDRs use an ODL/PVL-like grammar: a flat sequence of `KEY = VALUE;`
//! statements, with `OBJECT = TYPE;` / `END_OBJECT = TYPE;` delimiting
//! groups. Providers are sloppy about whitespace (`OBJECT=FILE_GROUP;` is
//! common), so splitting happens on the `;` terminator, not on lines.
//!
//! The tokenizer is a lazy iterator and stops at the first malformed
//! statement: a truncated manifest must fail loudly rather than under-report
//! files.

use sdp_common::{Result, SdpError};

/// Raw field value, with quoting remembered
///
/// Quotes are stripped here; numeric interpretation is left to the record
/// extractor because PVL typing (number vs string) matters for checksums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub text: String,
    pub quoted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `KEY = VALUE;`
    Field { key: String, value: Value },
    /// `OBJECT = TYPE;`
    GroupOpen(String),
    /// `END_OBJECT = TYPE;`
    GroupClose(String),
}

/// One statement, tagged with the line it started on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub line: usize,
    pub kind: TokenKind,
}

/// Lazy statement iterator over raw manifest text
pub struct Tokenizer<'a> {
    rest: &'a str,
    line: usize,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            line: 1,
            failed: false,
        }
    }

    fn parse_statement(stmt: &str, line: usize) -> Result<Token> {
        let Some((key, value)) = stmt.split_once('=') else {
            return Err(SdpError::MalformedManifest {
                line,
                message: format!("not a `KEY = VALUE` statement: {}", stmt),
            });
        };

        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(SdpError::MalformedManifest {
                line,
                message: format!("invalid statement key: {}", stmt),
            });
        }

        let raw = value.trim();
        let quoted = raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"');
        let text = if quoted { &raw[1..raw.len() - 1] } else { raw };
        if text.is_empty() && !quoted {
            return Err(SdpError::MalformedManifest {
                line,
                message: format!("statement has no value: {}", stmt),
            });
        }

        let kind = match key {
            "OBJECT" => TokenKind::GroupOpen(text.to_string()),
            "END_OBJECT" => TokenKind::GroupClose(text.to_string()),
            _ => TokenKind::Field {
                key: key.to_string(),
                value: Value {
                    text: text.to_string(),
                    quoted,
                },
            },
        };

        Ok(Token { line, kind })
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            // A trailing statement without its `;` is still consumed, so a
            // truncated manifest surfaces its final fragment as an error.
            let (raw, advance) = match self.rest.find(';') {
                Some(idx) => (&self.rest[..idx], idx + 1),
                None => (self.rest, self.rest.len()),
            };
            if advance == 0 {
                return None;
            }

            let leading = raw.len() - raw.trim_start().len();
            let stmt_line = self.line + raw[..leading].matches('\n').count();
            self.line += raw.matches('\n').count();
            self.rest = &self.rest[advance..];

            let stmt = raw.trim();
            if stmt.is_empty() {
                continue;
            }

            let result = Self::parse_statement(stmt, stmt_line);
            if result.is_err() {
                self.failed = true;
            }
            return Some(result);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Tokenizer::new(input).collect::<Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn test_field_statement() {
        let toks = tokens("TOTAL_FILE_COUNT = 2;\n");
        assert_eq!(toks.len(), 1);
        assert_eq!(
            toks[0].kind,
            TokenKind::Field {
                key: "TOTAL_FILE_COUNT".to_string(),
                value: Value {
                    text: "2".to_string(),
                    quoted: false
                },
            }
        );
        assert_eq!(toks[0].line, 1);
    }

    #[test]
    fn test_group_delimiters_without_spaces() {
        let toks = tokens("OBJECT=FILE_GROUP;\nEND_OBJECT = FILE_GROUP;\n");
        assert_eq!(
            toks[0].kind,
            TokenKind::GroupOpen("FILE_GROUP".to_string())
        );
        assert_eq!(
            toks[1].kind,
            TokenKind::GroupClose("FILE_GROUP".to_string())
        );
        assert_eq!(toks[1].line, 2);
    }

    #[test]
    fn test_quoted_value_is_stripped() {
        let toks = tokens("FILE_CKSUM_VALUE = \"5eb63bbb\";");
        match &toks[0].kind {
            TokenKind::Field { value, .. } => {
                assert_eq!(value.text, "5eb63bbb");
                assert!(value.quoted);
            },
            other => panic!("unexpected token: {:?}", other),
        }
    }

    #[test]
    fn test_blank_lines_and_whitespace_ignored() {
        let toks = tokens("\n\n  KEY = VALUE;  \n\n  OTHER = 3;\n\n");
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[0].line, 3);
        assert_eq!(toks[1].line, 5);
    }

    #[test]
    fn test_malformed_statement_stops_iteration() {
        let mut tokenizer = Tokenizer::new("KEY = VALUE;\ngarbage here\nNEXT = 1;");
        assert!(tokenizer.next().unwrap().is_ok());
        let err = tokenizer.next().unwrap().unwrap_err();
        match err {
            SdpError::MalformedManifest { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(tokenizer.next().is_none());
    }

    #[test]
    fn test_missing_value_is_malformed() {
        let mut tokenizer = Tokenizer::new("KEY = ;");
        assert!(tokenizer.next().unwrap().is_err());
    }

    #[test]
    fn test_restartable() {
        let input = "A = 1;\nB = 2;";
        assert_eq!(tokens(input), tokens(input));
    }
}
