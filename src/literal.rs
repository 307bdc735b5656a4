//! Strict parser for list/tuple literals of strings.
//!
//! Table rows are persisted in record dumps as literals such as
//! `['营业收入', '1,024', None]`. This module reads them back without
//! evaluating anything: only strings, `None`, and (nested) lists or tuples are
//! accepted, and anything else is a [`LiteralError`] carrying the byte offset.

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// `None`
    None,
    /// A quoted string
    Str(String),
    /// A list `[..]` or tuple `(..)`
    List(Vec<Literal>),
}

impl Literal {
    /// Cell text of a scalar literal; `None` becomes the empty string.
    pub fn as_cell(&self) -> Option<&str> {
        match self {
            Literal::None => Some(""),
            Literal::Str(s) => Some(s),
            Literal::List(_) => None,
        }
    }
}

/// Errors raised by the literal parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    /// Input ended in the middle of a value.
    #[error("unexpected end of input at offset {0}")]
    UnexpectedEnd(usize),

    /// A character that cannot start or continue a value.
    #[error("unexpected character '{found}' at offset {offset}")]
    Unexpected {
        /// Byte offset of the character
        offset: usize,
        /// The offending character
        found: char,
    },

    /// Unknown or truncated escape sequence inside a string.
    #[error("invalid escape sequence at offset {0}")]
    InvalidEscape(usize),

    /// Extra input after a complete value.
    #[error("trailing input at offset {0}")]
    Trailing(usize),

    /// The value parsed but has the wrong shape (e.g. a row that is not a list).
    #[error("expected {0}")]
    Shape(&'static str),
}

/// Parse a single literal value.
pub fn parse_literal(input: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser::new(input);
    let value = parser.value()?;
    parser.skip_whitespace();
    match parser.chars.peek() {
        Some(&(offset, _)) => Err(LiteralError::Trailing(offset)),
        None => Ok(value),
    }
}

/// Parse a row literal (`['a', None, 'b']`) into cell strings.
pub fn parse_row(input: &str) -> Result<Vec<String>, LiteralError> {
    match parse_literal(input)? {
        Literal::List(items) => row_cells(&items),
        _ => Err(LiteralError::Shape("a list of cells")),
    }
}

/// Parse a grid literal (`[['a', 'b'], ['c', 'd']]`) into rows of cells.
pub fn parse_grid(input: &str) -> Result<Vec<Vec<String>>, LiteralError> {
    match parse_literal(input)? {
        Literal::List(rows) => rows
            .iter()
            .map(|row| match row {
                Literal::List(items) => row_cells(items),
                _ => Err(LiteralError::Shape("a list of rows")),
            })
            .collect(),
        _ => Err(LiteralError::Shape("a list of rows")),
    }
}

/// Format a row as a literal that [`parse_row`] reads back.
pub fn row_literal(cells: &[String]) -> String {
    let quoted: Vec<String> = cells.iter().map(|c| quote(c)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Format a grid as a literal that [`parse_grid`] reads back.
pub fn grid_literal(rows: &[Vec<String>]) -> String {
    let rows: Vec<String> = rows.iter().map(|r| row_literal(r)).collect();
    format!("[{}]", rows.join(", "))
}

fn row_cells(items: &[Literal]) -> Result<Vec<String>, LiteralError> {
    items
        .iter()
        .map(|item| {
            item.as_cell()
                .map(str::to_string)
                .ok_or(LiteralError::Shape("a string or None cell"))
        })
        .collect()
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

struct Parser<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn end(&self) -> usize {
        self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn value(&mut self) -> Result<Literal, LiteralError> {
        self.skip_whitespace();
        let end = self.end();
        let (offset, c) = *self.chars.peek().ok_or(LiteralError::UnexpectedEnd(end))?;
        match c {
            '[' => {
                self.chars.next();
                self.sequence(']')
            }
            '(' => {
                self.chars.next();
                self.sequence(')')
            }
            '\'' | '"' => {
                self.chars.next();
                self.string(c).map(Literal::Str)
            }
            'N' => self.keyword("None").map(|_| Literal::None),
            found => Err(LiteralError::Unexpected { offset, found }),
        }
    }

    fn sequence(&mut self, close: char) -> Result<Literal, LiteralError> {
        let mut items = Vec::new();
        self.skip_whitespace();
        if let Some(&(_, c)) = self.chars.peek() {
            if c == close {
                self.chars.next();
                return Ok(Literal::List(items));
            }
        }

        loop {
            items.push(self.value()?);
            self.skip_whitespace();
            match self.chars.next() {
                Some((_, ',')) => {
                    self.skip_whitespace();
                    // trailing comma
                    if let Some(&(_, c)) = self.chars.peek() {
                        if c == close {
                            self.chars.next();
                            return Ok(Literal::List(items));
                        }
                    }
                }
                Some((_, c)) if c == close => return Ok(Literal::List(items)),
                Some((offset, found)) => return Err(LiteralError::Unexpected { offset, found }),
                None => return Err(LiteralError::UnexpectedEnd(self.end())),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        let mut out = String::new();
        loop {
            let (offset, c) = self
                .chars
                .next()
                .ok_or(LiteralError::UnexpectedEnd(self.end()))?;
            if c == quote {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let (_, escaped) = self
                .chars
                .next()
                .ok_or(LiteralError::InvalidEscape(offset))?;
            match escaped {
                '\\' | '\'' | '"' => out.push(escaped),
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'x' => out.push(self.hex_char(2, offset)?),
                'u' => out.push(self.hex_char(4, offset)?),
                _ => return Err(LiteralError::InvalidEscape(offset)),
            }
        }
    }

    fn hex_char(&mut self, digits: usize, offset: usize) -> Result<char, LiteralError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let (_, c) = self
                .chars
                .next()
                .ok_or(LiteralError::InvalidEscape(offset))?;
            let digit = c.to_digit(16).ok_or(LiteralError::InvalidEscape(offset))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or(LiteralError::InvalidEscape(offset))
    }

    fn keyword(&mut self, word: &str) -> Result<(), LiteralError> {
        for expected in word.chars() {
            match self.chars.next() {
                Some((_, c)) if c == expected => {}
                Some((at, found)) => return Err(LiteralError::Unexpected { offset: at, found }),
                None => return Err(LiteralError::UnexpectedEnd(self.end())),
            }
        }
        // reject identifiers such as `Nonesuch`
        if let Some(&(at, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                return Err(LiteralError::Unexpected { offset: at, found: c });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row_with_none_and_quotes() {
        let row = parse_row(r#"['营业收入', None, "it's", '1,024']"#).unwrap();
        assert_eq!(row, vec!["营业收入", "", "it's", "1,024"]);
    }

    #[test]
    fn test_parse_tuple_and_trailing_comma() {
        let row = parse_row("('a', 'b',)").unwrap();
        assert_eq!(row, vec!["a", "b"]);
        assert_eq!(parse_row("[]").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_parse_grid() {
        let grid = parse_grid("[['Name', 'Age'], ['Ann', '30']]").unwrap();
        assert_eq!(grid, vec![vec!["Name", "Age"], vec!["Ann", "30"]]);
    }

    #[test]
    fn test_escapes() {
        let row = parse_row(r"['a\nb', 'c\\d', '\x41中']").unwrap();
        assert_eq!(row, vec!["a\nb", "c\\d", "A中"]);
    }

    #[test]
    fn test_rejects_code() {
        assert!(matches!(
            parse_literal("__import__('os')"),
            Err(LiteralError::Unexpected { offset: 0, found: '_' })
        ));
        assert!(matches!(
            parse_literal("['a'] + ['b']"),
            Err(LiteralError::Trailing(6))
        ));
        assert!(parse_literal("Nonesuch").is_err());
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            parse_literal("['a'"),
            Err(LiteralError::UnexpectedEnd(4))
        ));
        assert!(matches!(
            parse_literal("['a' 'b']"),
            Err(LiteralError::Unexpected { found: '\'', .. })
        ));
        assert!(matches!(
            parse_literal(r"['\q']"),
            Err(LiteralError::InvalidEscape(_))
        ));
        assert!(matches!(parse_row("'a'"), Err(LiteralError::Shape(_))));
        assert!(matches!(parse_grid("['a']"), Err(LiteralError::Shape(_))));
    }

    #[test]
    fn test_literal_writers_round_trip_special_chars() {
        let grid = vec![vec!["it's".to_string(), "a\\b\nc".to_string()]];
        assert_eq!(parse_grid(&grid_literal(&grid)).unwrap(), grid);
    }
}
