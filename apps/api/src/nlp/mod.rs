//! Language processing — a small rule-based English pipeline.
//!
//! `Pipeline` is loaded once at startup and shared read-only. It produces a
//! `Doc` with tokens, entity-like spans and (when the model supports it) noun
//! chunks. The `Blank` model is the degraded fallback: tokens only.

pub mod stopwords;

use tracing::{info, warn};
use unicode_segmentation::UnicodeSegmentation;

pub use stopwords::Stopwords;

/// Which pipeline variant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Tokens, entity spans and noun chunks.
    EnglishRules,
    /// Tokens only. No phrase chunking, no entities.
    Blank,
}

impl ModelKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "en_rules" | "en" | "english" => Some(ModelKind::EnglishRules),
            "blank" => Some(ModelKind::Blank),
            _ => None,
        }
    }
}

/// A single token of an analysed document.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub is_alpha: bool,
}

/// Result of running the pipeline over one text.
#[derive(Debug, Clone, Default)]
pub struct Doc {
    pub text: String,
    pub tokens: Vec<Token>,
    pub entities: Vec<String>,
    /// `None` when the model has no phrase-chunking capability.
    pub noun_chunks: Option<Vec<String>>,
}

/// Read-only language model.
#[derive(Debug, Clone)]
pub struct Pipeline {
    kind: ModelKind,
    stopwords: Stopwords,
}

impl Pipeline {
    pub fn new(kind: ModelKind) -> Self {
        Self {
            kind,
            stopwords: Stopwords::english(),
        }
    }

    /// Resolves a model by name. Unknown names degrade to `Blank` rather than
    /// failing startup.
    pub fn load(name: &str) -> Self {
        let kind = ModelKind::from_name(name).unwrap_or_else(|| {
            warn!("Unknown NLP model '{name}', falling back to blank pipeline");
            ModelKind::Blank
        });
        let pipeline = Self::new(kind);
        info!(
            "NLP pipeline loaded: {:?} (noun chunks: {}, {} stopwords)",
            kind,
            pipeline.supports_noun_chunks(),
            pipeline.stopwords.len()
        );
        pipeline
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn stopwords(&self) -> &Stopwords {
        &self.stopwords
    }

    pub fn supports_noun_chunks(&self) -> bool {
        self.kind == ModelKind::EnglishRules
    }

    pub fn analyze(&self, text: &str) -> Doc {
        let tokens = tokenize(text);

        let (entities, noun_chunks) = match self.kind {
            ModelKind::EnglishRules => (
                compound_terms(text),
                Some(noun_chunks(&tokens, &self.stopwords)),
            ),
            ModelKind::Blank => (Vec::new(), None),
        };

        Doc {
            text: text.to_string(),
            tokens,
            entities,
            noun_chunks,
        }
    }
}

/// Splits on Unicode word boundaries, dropping whitespace segments.
pub fn tokenize(text: &str) -> Vec<Token> {
    text.split_word_bounds()
        .filter(|s| !s.trim().is_empty())
        .map(|s| Token {
            text: s.to_string(),
            is_alpha: s.chars().all(char::is_alphabetic),
        })
        .collect()
}

/// Maximal runs of alphabetic, non-stopword tokens. Any other token closes
/// the current chunk.
fn noun_chunks(tokens: &[Token], stopwords: &Stopwords) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for token in tokens {
        if token.is_alpha && !stopwords.contains(&token.text.to_lowercase()) {
            current.push(&token.text);
        } else if !current.is_empty() {
            chunks.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        chunks.push(current.join(" "));
    }
    chunks
}

const JOINERS: [char; 4] = ['.', '-', '+', '#'];

/// Whitespace-delimited terms such as `next.js`, `scikit-learn` or `c++`,
/// which word segmentation would split apart.
fn compound_terms(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_start_matches(|c: char| !c.is_alphanumeric())
                .trim_end_matches(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
        })
        .filter(|w| w.chars().any(char::is_alphanumeric) && w.contains(&JOINERS[..]))
        .map(str::to_string)
        .collect()
}
