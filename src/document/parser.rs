//! Text parser.
//!
//! Recursive descent parser producing a [`Document`]. Number literals are
//! interpreted according to the configured [`NumberKind`], and whitespace
//! according to the configured [`WhitespaceClass`].
//!
//! # Requirements
//!
//! - Reject duplicate keys after unescaping
//! - Keep object members in source order
//! - Reject numbers that are not finite in the configured kind
//! - Enforce nesting depth, object field count and array length limits

use std::collections::HashSet;

use super::error::{TextError, TextResult};
use super::lexer::{Lexer, NumberLiteral, Token};
use super::limits::Limits;
use super::types::{Document, Number};
use crate::config::{Config, NumberKind, WhitespaceClass};

/// Options controlling how text is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Size limits.
    pub limits: Limits,
    /// Number interpretation.
    pub number_kind: NumberKind,
    /// Accepted whitespace.
    pub whitespace: WhitespaceClass,
}

impl ParseOptions {
    /// Options matching a codec configuration, with default limits.
    pub fn from_config(config: &Config) -> Self {
        Self {
            limits: Limits::default(),
            number_kind: config.number_kind,
            whitespace: config.whitespace,
        }
    }

    /// Replace the limits.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Recursive descent parser over a [`Lexer`].
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    options: ParseOptions,
    depth: u64,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input.
    pub fn new(input: &'a [u8], options: ParseOptions) -> TextResult<Self> {
        let mut lexer = Lexer::new(input, options.limits, options.whitespace)?;
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            options,
            depth: 0,
        })
    }

    /// Parse the whole input as one document.
    pub fn parse(&mut self) -> TextResult<Document> {
        let value = self.parse_value()?;

        if self.current != Token::Eof {
            return Err(self.invalid());
        }

        Ok(value)
    }

    fn invalid(&self) -> TextError {
        TextError::InvalidJson {
            offset: self.lexer.token_start(),
        }
    }

    fn advance(&mut self) -> TextResult<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn parse_value(&mut self) -> TextResult<Document> {
        match &self.current {
            Token::Null => {
                self.advance()?;
                Ok(Document::Null)
            }
            Token::True => {
                self.advance()?;
                Ok(Document::Bool(true))
            }
            Token::False => {
                self.advance()?;
                Ok(Document::Bool(false))
            }
            Token::String(s) => {
                let value = Document::String(s.clone());
                self.advance()?;
                Ok(value)
            }
            Token::Number(literal) => {
                let value = Document::Number(parse_number(literal, self.options.number_kind)?);
                self.advance()?;
                Ok(value)
            }
            Token::LeftBrace => self.parse_object(),
            Token::LeftBracket => self.parse_array(),
            _ => Err(self.invalid()),
        }
    }

    fn enter(&mut self) -> TextResult<()> {
        self.depth += 1;
        if self.depth > self.options.limits.max_nesting_depth {
            return Err(TextError::NestingTooDeep {
                got: self.depth,
                limit: self.options.limits.max_nesting_depth,
            });
        }
        Ok(())
    }

    fn parse_object(&mut self) -> TextResult<Document> {
        self.enter()?;
        self.advance()?;

        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        if self.current == Token::RightBrace {
            self.advance()?;
            self.depth -= 1;
            return Ok(Document::Object(entries));
        }

        loop {
            let key = match &self.current {
                Token::String(s) => s.clone(),
                _ => return Err(self.invalid()),
            };
            self.advance()?;

            if !seen.insert(key.clone()) {
                return Err(TextError::DuplicateKey(key));
            }

            if self.current != Token::Colon {
                return Err(self.invalid());
            }
            self.advance()?;

            let value = self.parse_value()?;
            entries.push((key, value));

            if entries.len() as u64 > self.options.limits.max_object_fields {
                return Err(TextError::TooManyFields {
                    got: entries.len() as u64,
                    limit: self.options.limits.max_object_fields,
                });
            }

            match &self.current {
                Token::Comma => {
                    self.advance()?;
                    if self.current == Token::RightBrace {
                        return Err(self.invalid());
                    }
                }
                Token::RightBrace => {
                    self.advance()?;
                    break;
                }
                _ => return Err(self.invalid()),
            }
        }

        self.depth -= 1;
        Ok(Document::Object(entries))
    }

    fn parse_array(&mut self) -> TextResult<Document> {
        self.enter()?;
        self.advance()?;

        let mut items = Vec::new();

        if self.current == Token::RightBracket {
            self.advance()?;
            self.depth -= 1;
            return Ok(Document::Array(items));
        }

        loop {
            items.push(self.parse_value()?);

            if items.len() as u64 > self.options.limits.max_array_length {
                return Err(TextError::ArrayTooLong {
                    got: items.len() as u64,
                    limit: self.options.limits.max_array_length,
                });
            }

            match &self.current {
                Token::Comma => {
                    self.advance()?;
                    if self.current == Token::RightBracket {
                        return Err(self.invalid());
                    }
                }
                Token::RightBracket => {
                    self.advance()?;
                    break;
                }
                _ => return Err(self.invalid()),
            }
        }

        self.depth -= 1;
        Ok(Document::Array(items))
    }
}

/// Interpret a number literal under a number kind.
pub fn parse_number(literal: &NumberLiteral, kind: NumberKind) -> TextResult<Number> {
    let out_of_range = || TextError::NumberOutOfRange(literal.text.clone());

    let number = match kind {
        NumberKind::IntPreferring if literal.integral => match literal.text.parse::<i64>() {
            Ok(i) => Number::Int(i),
            Err(_) => Number::Float(literal.text.parse::<f64>().map_err(|_| out_of_range())?),
        },
        NumberKind::IntPreferring | NumberKind::Float64 => {
            Number::Float(literal.text.parse::<f64>().map_err(|_| out_of_range())?)
        }
        NumberKind::Float32 => {
            let f = literal.text.parse::<f32>().map_err(|_| out_of_range())?;
            if !f.is_finite() {
                return Err(out_of_range());
            }
            Number::Float(f64::from(f))
        }
    };

    if !number.as_f64().is_finite() {
        return Err(out_of_range());
    }
    Ok(number)
}

/// Parse text with the given options.
pub fn parse_with(input: &[u8], options: ParseOptions) -> TextResult<Document> {
    let mut parser = Parser::new(input, options)?;
    parser.parse()
}

/// Parse text the way a codec with this configuration would.
pub fn parse(input: &[u8], config: &Config) -> TextResult<Document> {
    parse_with(input, ParseOptions::from_config(config))
}
