//! Text tokenizer.
//!
//! Converts validated UTF-8 input into a stream of tokens for the parser.
//! Handles escape sequences, surrogate pairs and the configured whitespace
//! class.
//!
//! # Requirements
//!
//! - Input must be valid UTF-8; unpaired surrogate escapes are rejected
//! - Strings are unescaped before the parser sees them
//! - Numbers follow the JSON grammar (sign, integer, fraction, exponent)
//! - Whitespace is the four JSON bytes, or any Unicode `White_Space`
//!   character when the class is `Unicode`

use super::error::{TextError, TextResult};
use super::limits::Limits;
use crate::config::WhitespaceClass;

/// Token types produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Left brace `{`
    LeftBrace,
    /// Right brace `}`
    RightBrace,
    /// Left bracket `[`
    LeftBracket,
    /// Right bracket `]`
    RightBracket,
    /// Colon `:`
    Colon,
    /// Comma `,`
    Comma,
    /// Null literal
    Null,
    /// True literal
    True,
    /// False literal
    False,
    /// String value (unescaped)
    String(String),
    /// Number literal, raw text
    Number(NumberLiteral),
    /// End of input
    Eof,
}

/// A number literal as written, with its shape recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberLiteral {
    /// The literal text.
    pub text: String,
    /// True if the literal has neither fraction nor exponent.
    pub integral: bool,
}

/// Tokenizer over a document's text.
pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    token_start: usize,
    limits: Limits,
    whitespace: WhitespaceClass,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a [u8], limits: Limits, whitespace: WhitespaceClass) -> TextResult<Self> {
        if input.len() as u64 > limits.max_input_size {
            return Err(TextError::InputTooLarge {
                got: input.len() as u64,
                limit: limits.max_input_size,
            });
        }

        let input = std::str::from_utf8(input).map_err(|_| TextError::InvalidUtf8)?;

        Ok(Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            token_start: 0,
            limits,
            whitespace,
        })
    }

    /// Byte offset where the most recent token started.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    fn invalid(&self) -> TextError {
        TextError::InvalidJson {
            offset: self.token_start,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.bytes.get(self.pos).copied();
        if b.is_some() {
            self.pos += 1;
        }
        b
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => {
                    self.pos += 1;
                }
                _ if b >= 0x80 && self.whitespace == WhitespaceClass::Unicode => {
                    match self.input[self.pos..].chars().next() {
                        Some(ch) if ch.is_whitespace() => self.pos += ch.len_utf8(),
                        _ => break,
                    }
                }
                // vertical tab and form feed
                0x0B | 0x0C if self.whitespace == WhitespaceClass::Unicode => {
                    self.pos += 1;
                }
                _ => break,
            }
        }
    }

    /// Read the next token from the input.
    pub fn next_token(&mut self) -> TextResult<Token> {
        self.skip_whitespace();
        self.token_start = self.pos;

        let token = match self.peek() {
            None => Token::Eof,
            Some(b'{') => Token::LeftBrace,
            Some(b'}') => Token::RightBrace,
            Some(b'[') => Token::LeftBracket,
            Some(b']') => Token::RightBracket,
            Some(b':') => Token::Colon,
            Some(b',') => Token::Comma,
            Some(b'"') => return self.read_string(),
            Some(b'-') | Some(b'0'..=b'9') => return self.read_number(),
            Some(b't') => return self.read_literal(b"true", Token::True),
            Some(b'f') => return self.read_literal(b"false", Token::False),
            Some(b'n') => return self.read_literal(b"null", Token::Null),
            Some(_) => return Err(self.invalid()),
        };
        if token != Token::Eof {
            self.pos += 1;
        }
        Ok(token)
    }

    fn read_string(&mut self) -> TextResult<Token> {
        self.advance();

        let mut result = String::new();
        loop {
            match self.peek() {
                None => return Err(self.invalid()),
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    let ch = self.read_escape_sequence()?;
                    result.push(ch);
                }
                Some(b) if b < 0x20 => return Err(self.invalid()),
                Some(b) if b < 0x80 => {
                    self.pos += 1;
                    result.push(b as char);
                }
                Some(_) => {
                    // input is a validated str, so a full char is present
                    let ch = self.input[self.pos..]
                        .chars()
                        .next()
                        .ok_or(TextError::InvalidUtf8)?;
                    self.pos += ch.len_utf8();
                    result.push(ch);
                }
            }

            if result.len() as u64 > self.limits.max_string_length {
                return Err(TextError::StringTooLong {
                    got: result.len() as u64,
                    limit: self.limits.max_string_length,
                });
            }
        }

        Ok(Token::String(result))
    }

    fn read_escape_sequence(&mut self) -> TextResult<char> {
        match self.advance() {
            None => Err(self.invalid()),
            Some(b'"') => Ok('"'),
            Some(b'\\') => Ok('\\'),
            Some(b'/') => Ok('/'),
            Some(b'b') => Ok('\x08'),
            Some(b'f') => Ok('\x0C'),
            Some(b'n') => Ok('\n'),
            Some(b'r') => Ok('\r'),
            Some(b't') => Ok('\t'),
            Some(b'u') => self.read_unicode_escape(),
            Some(_) => Err(self.invalid()),
        }
    }

    fn read_unicode_escape(&mut self) -> TextResult<char> {
        let codepoint = self.read_hex4()?;

        if (0xD800..=0xDBFF).contains(&codepoint) {
            if self.advance() != Some(b'\\') || self.advance() != Some(b'u') {
                return Err(TextError::InvalidUtf8);
            }
            let low = self.read_hex4()?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(TextError::InvalidUtf8);
            }
            let combined = 0x10000 + ((codepoint as u32 - 0xD800) << 10) + (low as u32 - 0xDC00);
            return char::from_u32(combined).ok_or(TextError::InvalidUtf8);
        }

        if (0xDC00..=0xDFFF).contains(&codepoint) {
            return Err(TextError::InvalidUtf8);
        }

        char::from_u32(codepoint as u32).ok_or(TextError::InvalidUtf8)
    }

    fn read_hex4(&mut self) -> TextResult<u16> {
        let mut value: u16 = 0;
        for _ in 0..4 {
            let b = self.advance().ok_or_else(|| self.invalid())?;
            let digit = match b {
                b'0'..=b'9' => b - b'0',
                b'a'..=b'f' => b - b'a' + 10,
                b'A'..=b'F' => b - b'A' + 10,
                _ => return Err(self.invalid()),
            };
            value = (value << 4) | (digit as u16);
        }
        Ok(value)
    }

    fn read_digits(&mut self) -> usize {
        let start = self.pos;
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
        self.pos - start
    }

    fn read_number(&mut self) -> TextResult<Token> {
        let start = self.pos;
        let mut integral = true;

        if self.peek() == Some(b'-') {
            self.pos += 1;
        }

        match self.peek() {
            Some(b'0') => {
                self.pos += 1;
                if let Some(b'0'..=b'9') = self.peek() {
                    return Err(self.invalid());
                }
            }
            Some(b'1'..=b'9') => {
                self.read_digits();
            }
            _ => return Err(self.invalid()),
        }

        if self.peek() == Some(b'.') {
            self.pos += 1;
            integral = false;
            if self.read_digits() == 0 {
                return Err(self.invalid());
            }
        }

        if let Some(b'e') | Some(b'E') = self.peek() {
            self.pos += 1;
            integral = false;
            if let Some(b'+') | Some(b'-') = self.peek() {
                self.pos += 1;
            }
            if self.read_digits() == 0 {
                return Err(self.invalid());
            }
        }

        Ok(Token::Number(NumberLiteral {
            text: self.input[start..self.pos].to_string(),
            integral,
        }))
    }

    fn read_literal(&mut self, expected: &[u8], token: Token) -> TextResult<Token> {
        for &b in expected {
            if self.advance() != Some(b) {
                return Err(self.invalid());
            }
        }
        Ok(token)
    }
}
