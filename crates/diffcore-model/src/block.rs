use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// BlockId
// ---------------------------------------------------------------------------

/// Stable identity for a [`Block`], independent of its position in either
/// document's flat block list.
///
/// The diff core uses this (rather than `==` on block content) to enforce
/// the "a block appears at most once as `left` / at most once as `right`"
/// invariant, since two distinct blocks may hold identical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub Uuid);

impl BlockId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// BlockKind
// ---------------------------------------------------------------------------

/// Structural role of a block within the parsed document tree.
///
/// Carried through opaquely: the diff core never branches on it except
/// where the move/split detector needs to reconstruct a renderable pair.
/// Callers that own the parser are free to match on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading { level: u8 },
    Paragraph,
    Blockquote,
    CodeBlock { lang: Option<String> },
    List { ordered: bool },
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// An opaque handle to a source node plus its derived plaintext.
///
/// `text` is assumed to already be the output of the external
/// `block_to_text` conversion (canonicalized, idempotent); the diff core
/// never re-derives it. `line` is carried only for downstream rendering and
/// plays no part in alignment or diffing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub text: String,
    pub line: Option<usize>,
}

impl Block {
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            id: BlockId::new(),
            kind,
            text: text.into(),
            line: None,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// A single whitespace-delimited word plus its trailing whitespace.
///
/// `raw` is `word` followed by the whitespace run that followed it in the
/// source text (empty for the final token of a string whose last character
/// is non-whitespace). Concatenating every token's `raw` reproduces the
/// tokenized string exactly; see `diffcore::tokenize::join`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The non-space run itself, e.g. `"fox,"`.
    pub word: String,
    /// `word` plus any trailing whitespace, e.g. `"fox, "`.
    pub raw: String,
    /// Lower-cased, leading/trailing-punctuation-stripped form used for
    /// fuzzy matching, e.g. `"fox"`.
    pub normalized: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
