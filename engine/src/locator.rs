//! Source locator for registry documents
//!
//! The review-comment API anchors comments to file + line, while the policy
//! engine thinks in terms of object key paths. This module bridges the two:
//! it scans raw JSON text and maps every object key, addressed by a
//! `+`-joined path of ancestor keys, to the text span where it was declared.
//!
//! Lookup of a missing key is not an error: it degrades to a span pointing
//! at the top of the file, so a problem can always be annotated somewhere.
//! Malformed JSON, on the other hand, aborts the whole run.

use std::iter::Peekable;
use std::str::Chars;

use sdk::errors::BotError;

/// Separator between key-path segments
pub const PATH_SEPARATOR: char = '+';

/// A 1-based line / 1-based column position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u64,
    pub column: u64,
}

/// The text span covering one object property, key through value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// The degenerate span returned when a key path has no match.
    ///
    /// Line 1, column 0: a missing key silently points at the top of the
    /// file rather than surfacing a lookup failure.
    pub const fn fallback() -> Self {
        Self {
            start: Position { line: 1, column: 0 },
            end: Position { line: 1, column: 0 },
        }
    }
}

/// One located object key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLocation {
    /// `+`-joined path of ancestor keys, leading separator stripped
    pub path: String,
    pub span: Span,
}

/// Scan `text` and return every object key with its source span, in document
/// order, parents before children. Keys inside arrays are not addressable.
pub fn locate_all(text: &str) -> Result<Vec<KeyLocation>, BotError> {
    let mut scanner = Scanner::new(text);
    let mut locations = Vec::new();

    scanner.skip_whitespace();
    scanner.parse_value("", &mut locations)?;
    scanner.skip_whitespace();
    if scanner.peek().is_some() {
        return Err(scanner.error("trailing characters after document"));
    }

    Ok(locations)
}

/// The span of the first key matching `key_path`, or the fallback span when
/// no key matches. Only malformed JSON fails.
pub fn locate(text: &str, key_path: &str) -> Result<Span, BotError> {
    Ok(locate_all(text)?
        .into_iter()
        .find(|location| location.path == key_path)
        .map(|location| location.span)
        .unwrap_or_else(Span::fallback))
}

/// Minimal JSON scanner tracking line/column while collecting key spans.
///
/// Values themselves are validated only as far as needed to walk the
/// structure; the registry text is also parsed by serde_json upstream, which
/// is authoritative for well-formedness.
struct Scanner<'a> {
    input: Peekable<Chars<'a>>,
    line: u64,
    column: u64,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            input: text.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Position the next character will occupy
    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.input.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.input.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> BotError {
        BotError::Parse {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.advance();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), BotError> {
        match self.advance() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    /// `prefix` is the internal key path so far, always either empty or
    /// starting with the separator.
    fn parse_value(&mut self, prefix: &str, out: &mut Vec<KeyLocation>) -> Result<(), BotError> {
        match self.peek() {
            Some('{') => self.parse_object(prefix, out),
            Some('[') => self.parse_array(prefix),
            Some('"') => self.parse_string().map(|_| ()),
            Some(c) if c == '-' || c.is_ascii_digit() || c.is_ascii_alphabetic() => {
                self.parse_literal()
            }
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_object(&mut self, prefix: &str, out: &mut Vec<KeyLocation>) -> Result<(), BotError> {
        self.expect('{')?;
        self.skip_whitespace();

        if self.peek() == Some('}') {
            self.advance();
            return Ok(());
        }

        loop {
            self.skip_whitespace();

            let start = self.position();
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();

            let path = format!("{prefix}{PATH_SEPARATOR}{key}");
            let mut children = Vec::new();
            self.parse_value(&path, &mut children)?;
            let end = self.position();

            // The separator is a single byte, so stripping the leading one
            // by slice is safe.
            out.push(KeyLocation {
                path: path[1..].to_string(),
                span: Span { start, end },
            });
            out.append(&mut children);

            self.skip_whitespace();
            match self.advance() {
                Some(',') => continue,
                Some('}') => return Ok(()),
                Some(c) => return Err(self.error(format!("expected ',' or '}}', found '{c}'"))),
                None => return Err(self.error("unterminated object")),
            }
        }
    }

    fn parse_array(&mut self, prefix: &str) -> Result<(), BotError> {
        self.expect('[')?;
        self.skip_whitespace();

        if self.peek() == Some(']') {
            self.advance();
            return Ok(());
        }

        loop {
            self.skip_whitespace();

            // Keys inside arrays are not addressable; discard their spans.
            let mut ignored = Vec::new();
            self.parse_value(prefix, &mut ignored)?;

            self.skip_whitespace();
            match self.advance() {
                Some(',') => continue,
                Some(']') => return Ok(()),
                Some(c) => return Err(self.error(format!("expected ',' or ']', found '{c}'"))),
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, BotError> {
        self.expect('"')?;
        let mut value = String::new();

        loop {
            match self.advance() {
                None => return Err(self.error("unterminated string")),
                Some('"') => return Ok(value),
                Some('\\') => value.push(self.parse_escape()?),
                Some(c) if (c as u32) < 0x20 => {
                    return Err(self.error("control character in string"));
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, BotError> {
        match self.advance() {
            Some('"') => Ok('"'),
            Some('\\') => Ok('\\'),
            Some('/') => Ok('/'),
            Some('b') => Ok('\u{0008}'),
            Some('f') => Ok('\u{000C}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('u') => self.parse_unicode_escape(),
            Some(c) => Err(self.error(format!("invalid escape '\\{c}'"))),
            None => Err(self.error("unterminated escape")),
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char, BotError> {
        let high = self.parse_hex4()?;

        // Surrogate pair: a high surrogate must be followed by an escaped
        // low surrogate.
        if (0xD800..=0xDBFF).contains(&high) {
            self.expect('\\')?;
            self.expect('u')?;
            let low = self.parse_hex4()?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(self.error("invalid low surrogate"));
            }
            let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(code).ok_or_else(|| self.error("invalid unicode escape"));
        }

        char::from_u32(high).ok_or_else(|| self.error("invalid unicode escape"))
    }

    fn parse_hex4(&mut self) -> Result<u32, BotError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .advance()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("invalid unicode escape"))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    /// Numbers, `true`, `false`, and `null`
    fn parse_literal(&mut self) -> Result<(), BotError> {
        let mut token = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.') {
                token.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if token == "true" || token == "false" || token == "null" || token.parse::<f64>().is_ok() {
            Ok(())
        } else {
            Err(self.error(format!("unexpected token '{token}'")))
        }
    }
}
