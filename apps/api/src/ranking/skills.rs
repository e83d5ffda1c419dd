//! Skill Extraction — matches text against a fixed skill vocabulary.
//!
//! Candidate spans come from three sources of the language model: noun
//! chunks (skipped when the model cannot chunk), entity-like spans, and
//! alphabetic tokens of length ≥ 3. A substring pass then catches multi-word
//! terms that span detection fragments.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::nlp::Pipeline;

/// Canonical lowercase skill terms.
pub const DEFAULT_SKILLS: &[&str] = &[
    "python", "java", "javascript", "typescript", "react", "next.js", "node", "express",
    "sql", "postgresql", "mysql", "mongodb", "docker", "kubernetes", "git",
    "machine learning", "deep learning", "nlp", "scikit-learn", "pandas", "numpy",
    "tensorflow", "pytorch", "streamlit", "fastapi", "flask",
    "aws", "azure", "gcp",
    "power bi", "tableau",
];

const MIN_TOKEN_LEN: usize = 3;

/// Immutable set of canonical skill strings, shared by all extraction calls.
#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    terms: HashSet<String>,
    multi_word: Vec<String>,
}

impl SkillVocabulary {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: HashSet<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        let mut multi_word: Vec<String> = terms.iter().filter(|t| t.contains(' ')).cloned().collect();
        multi_word.sort();

        Self { terms, multi_word }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_SKILLS)
    }
}

pub struct SkillExtractor {
    pipeline: Arc<Pipeline>,
    vocabulary: Arc<SkillVocabulary>,
}

impl SkillExtractor {
    pub fn new(pipeline: Arc<Pipeline>, vocabulary: Arc<SkillVocabulary>) -> Self {
        Self {
            pipeline,
            vocabulary,
        }
    }

    /// Returns the vocabulary terms present in `text`, sorted ascending.
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        if text.is_empty() {
            return found;
        }

        let doc = self.pipeline.analyze(&text.to_lowercase());

        let chunks = doc.noun_chunks.iter().flatten();
        let tokens = doc
            .tokens
            .iter()
            .filter(|t| t.is_alpha && t.text.chars().count() >= MIN_TOKEN_LEN)
            .map(|t| &t.text);

        for span in chunks.chain(doc.entities.iter()).chain(tokens) {
            let span = span.trim().to_lowercase();
            if self.vocabulary.contains(&span) {
                found.insert(span);
            }
        }

        for term in &self.vocabulary.multi_word {
            if doc.text.contains(term.as_str()) {
                found.insert(term.clone());
            }
        }

        found
    }
}
