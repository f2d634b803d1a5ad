//! Seeded random document texts.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha20Rng;

use crate::config::seeded_rng;
use crate::document::{to_text, Document, Number};

/// Root kinds a generated document can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    /// `null`
    Null,
    /// `true` or `false`
    Bool,
    /// Integer literal.
    Integer,
    /// Literal with a fraction or exponent.
    Float,
    /// String.
    String,
    /// Array.
    Array,
    /// Object.
    Object,
}

impl RootKind {
    /// All root kinds, drawn uniformly.
    pub const ALL: [RootKind; 7] = [
        RootKind::Null,
        RootKind::Bool,
        RootKind::Integer,
        RootKind::Float,
        RootKind::String,
        RootKind::Array,
        RootKind::Object,
    ];
}

// A member named exactly "-" reads as an append slot to the pointer engine,
// so "-" only ever appears inside longer atoms.
const STRING_ATOMS: &[&str] = &[
    "a", "b", "z", "key", "value", " ", "0", "a-b", "~", "/", "\"", "\\", "\n", "\t", "\u{1}",
    "\u{7f}", "\u{e9}", "\u{df}", "\u{4e2d}\u{6587}", "\u{2028}", "\u{1f600}", "~[]{}",
];

/// Bounded, seeded stream of compact document texts.
#[derive(Debug, Clone)]
pub struct RandomDocuments {
    rng: ChaCha20Rng,
    remaining: usize,
    max_depth: usize,
    max_width: usize,
}

impl RandomDocuments {
    /// Yield `count` documents drawn from `seed`.
    pub fn new(seed: u64, count: usize) -> Self {
        Self {
            rng: seeded_rng(seed),
            remaining: count,
            max_depth: 4,
            max_width: 5,
        }
    }

    /// Limit container nesting.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Limit container width.
    #[must_use]
    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    /// Draw one document of the given root kind.
    pub fn document(&mut self, kind: RootKind) -> Document {
        self.value(kind, 0)
    }

    fn value(&mut self, kind: RootKind, depth: usize) -> Document {
        match kind {
            RootKind::Null => Document::Null,
            RootKind::Bool => Document::Bool(self.rng.gen()),
            RootKind::Integer => {
                Document::Number(Number::Int(self.rng.gen_range(-1_000_000_000_000i64..1_000_000_000_000)))
            }
            RootKind::Float => Document::Number(Number::Float(self.float())),
            RootKind::String => Document::String(self.string()),
            RootKind::Array => {
                let width = self.width(depth);
                let items = (0..width)
                    .map(|_| {
                        let kind = self.child_kind(depth);
                        self.value(kind, depth + 1)
                    })
                    .collect();
                Document::Array(items)
            }
            RootKind::Object => {
                let width = self.width(depth);
                let mut obj = Document::Object(Vec::with_capacity(width));
                for _ in 0..width {
                    let key = self.string();
                    let kind = self.child_kind(depth);
                    let value = self.value(kind, depth + 1);
                    if obj.get(&key).is_none() {
                        obj.insert(key, value);
                    }
                }
                obj
            }
        }
    }

    fn width(&mut self, depth: usize) -> usize {
        if depth >= self.max_depth {
            0
        } else {
            self.rng.gen_range(0..=self.max_width)
        }
    }

    fn child_kind(&mut self, depth: usize) -> RootKind {
        if depth + 1 >= self.max_depth {
            RootKind::ALL[self.rng.gen_range(0..5)]
        } else {
            RootKind::ALL[self.rng.gen_range(0..RootKind::ALL.len())]
        }
    }

    fn float(&mut self) -> f64 {
        // Stays inside f32 range so every number kind can decode it.
        let mantissa: f64 = self.rng.gen_range(-1.0..1.0);
        let exponent: i32 = self.rng.gen_range(-20..20);
        mantissa * 10f64.powi(exponent)
    }

    fn string(&mut self) -> String {
        let len = self.rng.gen_range(0..6);
        (0..len)
            .filter_map(|_| STRING_ATOMS.choose(&mut self.rng).copied())
            .collect()
    }
}

impl Iterator for RandomDocuments {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let kind = RootKind::ALL[self.rng.gen_range(0..RootKind::ALL.len())];
        Some(to_text(&self.document(kind)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
