//! Binding between the engine and one concrete token vocabulary.
//!
//! The engine never looks at token text on its own. It needs a kind enum it can
//! compare and map to a raw `u16` (for [`TokenSet`] membership), plus the value,
//! context and error types the grammar's rule bodies work with.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use rowan::TextRange;

use crate::EngineError;

/// A token vocabulary plus the types a grammar over it produces.
pub trait Language: Sized + 'static {
    /// Token kind. Raw values must stay below [`TokenSet::CAPACITY`].
    type Kind: Copy + Eq + Hash + Debug + Display + Send + Sync + 'static;

    /// Uniform return value of every rule body.
    type Value: Send + 'static;

    /// Mutable per-parse state threaded through every rule call.
    type Context: 'static;

    /// Error type rule bodies return. Engine failures convert into it.
    type Error: From<EngineError> + 'static;

    /// Kind reported when the token stream is exhausted.
    const EOF: Self::Kind;

    fn kind_to_raw(kind: Self::Kind) -> u16;
}

/// Zero-copy token: kind + span, text retrieved via [`token_text`] when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<K> {
    pub kind: K,
    pub span: TextRange,
}

impl<K> Token<K> {
    #[inline]
    pub fn new(kind: K, span: TextRange) -> Self {
        Self { kind, span }
    }
}

/// Retrieves the text slice for a token. O(1) slice into source.
#[inline]
pub fn token_text<'s, K>(source: &'s str, token: &Token<K>) -> &'s str {
    &source[std::ops::Range::<usize>::from(token.span)]
}

/// 256-bit bitset of raw token kinds for O(1) membership testing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenSet([u64; 4]);

impl TokenSet {
    pub const CAPACITY: u16 = 256;

    pub const EMPTY: TokenSet = TokenSet([0; 4]);

    /// Panics at compile time (in const context) if a raw kind exceeds the capacity.
    pub const fn from_raw(kinds: &[u16]) -> Self {
        let mut words = [0u64; 4];
        let mut i = 0;
        while i < kinds.len() {
            let raw = kinds[i];
            assert!(raw < Self::CAPACITY, "token kind exceeds TokenSet capacity");
            words[(raw / 64) as usize] |= 1 << (raw % 64);
            i += 1;
        }
        TokenSet(words)
    }

    pub fn of<L: Language>(kinds: &[L::Kind]) -> Self {
        let mut set = Self::EMPTY;
        for &kind in kinds {
            set.insert_raw(L::kind_to_raw(kind));
        }
        set
    }

    pub fn single<L: Language>(kind: L::Kind) -> Self {
        Self::of::<L>(&[kind])
    }

    pub fn insert_raw(&mut self, raw: u16) {
        assert!(raw < Self::CAPACITY, "token kind exceeds TokenSet capacity");
        self.0[(raw / 64) as usize] |= 1 << (raw % 64);
    }

    pub fn insert<L: Language>(&mut self, kind: L::Kind) {
        self.insert_raw(L::kind_to_raw(kind));
    }

    #[inline]
    pub const fn contains_raw(&self, raw: u16) -> bool {
        if raw >= Self::CAPACITY {
            return false;
        }
        self.0[(raw / 64) as usize] & (1 << (raw % 64)) != 0
    }

    #[inline]
    pub fn contains<L: Language>(&self, kind: L::Kind) -> bool {
        self.contains_raw(L::kind_to_raw(kind))
    }

    #[inline]
    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet([
            self.0[0] | other.0[0],
            self.0[1] | other.0[1],
            self.0[2] | other.0[2],
            self.0[3] | other.0[3],
        ])
    }

    #[inline]
    pub const fn intersection(self, other: TokenSet) -> TokenSet {
        TokenSet([
            self.0[0] & other.0[0],
            self.0[1] & other.0[1],
            self.0[2] & other.0[2],
            self.0[3] & other.0[3],
        ])
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0[0] == 0 && self.0[1] == 0 && self.0[2] == 0 && self.0[3] == 0
    }

    pub fn is_subset(&self, other: &TokenSet) -> bool {
        self.intersection(*other) == *self
    }

    /// Raw kinds in ascending order.
    pub fn iter_raw(&self) -> impl Iterator<Item = u16> + '_ {
        (0..Self::CAPACITY).filter(move |&raw| self.contains_raw(raw))
    }

    pub fn len(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter_raw()).finish()
    }
}
