//! JSON Pointers (RFC 6901) over [`Document`].
//!
//! A pointer is a sequence of reference tokens. The token `-` addresses the
//! slot one past the end of an array: it can be written to (append) but
//! never read.
//!
//! # Requirements
//!
//! - `~0` and `~1` escape `~` and `/` inside tokens
//! - Pointer enumeration is post-order: children before their container,
//!   the root last, every array followed by its append pointer
//! - `set` never creates intermediate containers; the parent must exist

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::types::Document;

/// The append marker token.
pub const APPEND: &str = "-";

/// Errors raised while parsing or resolving a pointer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointerError {
    /// Malformed pointer text.
    #[error("malformed pointer {0:?}")]
    Syntax(String),

    /// Nothing exists at the pointer (or at its parent, for writes).
    #[error("no value at {0}")]
    NotFound(String),

    /// An array was addressed with a token that is not an index.
    #[error("invalid array index {segment:?} in {pointer}")]
    InvalidIndex {
        /// The full pointer.
        pointer: String,
        /// The offending token.
        segment: String,
    },

    /// A token was applied to a scalar.
    #[error("cannot index into {kind} at {pointer}")]
    NotAContainer {
        /// The full pointer.
        pointer: String,
        /// Type name of the scalar.
        kind: &'static str,
    },
}

/// A parsed JSON Pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPointer {
    segments: Vec<String>,
}

impl JsonPointer {
    /// The root pointer (empty string).
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a pointer from unescaped tokens.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse pointer text.
    pub fn parse(text: &str) -> Result<Self, PointerError> {
        if text.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = text.strip_prefix('/') else {
            return Err(PointerError::Syntax(text.to_string()));
        };

        let mut segments = Vec::new();
        for raw in rest.split('/') {
            segments.push(unescape(raw).ok_or_else(|| PointerError::Syntax(text.to_string()))?);
        }
        Ok(Self { segments })
    }

    /// Pointer to a child of this one.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Pointer to the parent, or None at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    /// Unescaped tokens.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last token, or None at the root.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Number of tokens.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this is the root pointer.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns true if the last token is the append marker.
    pub fn is_append(&self) -> bool {
        self.last() == Some(APPEND)
    }

    /// Returns true for pointers that address no existing slot: the root
    /// and append pointers.
    pub fn is_terminal(&self) -> bool {
        self.is_root() || self.is_append()
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            f.write_str("/")?;
            f.write_str(&escape(segment))?;
        }
        Ok(())
    }
}

impl FromStr for JsonPointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(ch);
        }
    }
    Some(out)
}

fn parse_index(pointer: &JsonPointer, segment: &str) -> Result<usize, PointerError> {
    let invalid = || PointerError::InvalidIndex {
        pointer: pointer.to_string(),
        segment: segment.to_string(),
    };
    let well_formed = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'));
    if !well_formed {
        return Err(invalid());
    }
    segment.parse().map_err(|_| invalid())
}

/// Enumerate every pointer in a document, post-order, deduplicated.
pub fn list_pointers(doc: &Document) -> Vec<JsonPointer> {
    let mut out = Vec::new();
    collect(doc, &JsonPointer::root(), &mut out);

    let mut seen = HashSet::new();
    out.retain(|p| seen.insert(p.clone()));
    out
}

fn collect(doc: &Document, at: &JsonPointer, out: &mut Vec<JsonPointer>) {
    match doc {
        Document::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect(item, &at.child(i.to_string()), out);
            }
            out.push(at.child(APPEND));
        }
        Document::Object(entries) => {
            for (key, value) in entries {
                collect(value, &at.child(key.as_str()), out);
            }
        }
        _ => {}
    }
    out.push(at.clone());
}

/// Read the value a pointer addresses.
pub fn get<'a>(doc: &'a Document, pointer: &JsonPointer) -> Result<&'a Document, PointerError> {
    let mut current = doc;
    for segment in pointer.segments() {
        current = match current {
            Document::Object(_) => current
                .get(segment)
                .ok_or_else(|| PointerError::NotFound(pointer.to_string()))?,
            Document::Array(items) => {
                if segment == APPEND {
                    return Err(PointerError::NotFound(pointer.to_string()));
                }
                let index = parse_index(pointer, segment)?;
                items
                    .get(index)
                    .ok_or_else(|| PointerError::NotFound(pointer.to_string()))?
            }
            scalar => {
                return Err(PointerError::NotAContainer {
                    pointer: pointer.to_string(),
                    kind: scalar.type_name(),
                })
            }
        };
    }
    Ok(current)
}

fn get_mut<'a>(
    doc: &'a mut Document,
    pointer: &JsonPointer,
    segments: &[String],
) -> Result<&'a mut Document, PointerError> {
    let mut current = doc;
    for segment in segments {
        current = match current {
            Document::Object(entries) => entries
                .iter_mut()
                .find(|(k, _)| k == segment)
                .map(|(_, v)| v)
                .ok_or_else(|| PointerError::NotFound(pointer.to_string()))?,
            Document::Array(items) => {
                if segment == APPEND {
                    return Err(PointerError::NotFound(pointer.to_string()));
                }
                let index = parse_index(pointer, segment)?;
                items
                    .get_mut(index)
                    .ok_or_else(|| PointerError::NotFound(pointer.to_string()))?
            }
            scalar => {
                return Err(PointerError::NotAContainer {
                    pointer: pointer.to_string(),
                    kind: scalar.type_name(),
                })
            }
        };
    }
    Ok(current)
}

/// Write a value at a pointer.
///
/// The root pointer replaces the whole document. Array tokens replace an
/// existing slot, `-` appends. Object tokens insert or replace.
pub fn set(doc: &mut Document, pointer: &JsonPointer, value: Document) -> Result<(), PointerError> {
    let Some((last, parents)) = pointer.segments().split_last() else {
        *doc = value;
        return Ok(());
    };

    match get_mut(doc, pointer, parents)? {
        Document::Object(entries) => {
            match entries.iter_mut().find(|(k, _)| k == last) {
                Some((_, slot)) => *slot = value,
                None => entries.push((last.clone(), value)),
            }
            Ok(())
        }
        Document::Array(items) => {
            if last == APPEND {
                items.push(value);
                return Ok(());
            }
            let index = parse_index(pointer, last)?;
            let slot = items
                .get_mut(index)
                .ok_or_else(|| PointerError::NotFound(pointer.to_string()))?;
            *slot = value;
            Ok(())
        }
        scalar => Err(PointerError::NotAContainer {
            pointer: pointer.to_string(),
            kind: scalar.type_name(),
        }),
    }
}
