//! Similarity Scorer — TF-IDF over unigrams and bigrams, cosine against the JD.
//!
//! The vector space is built per call from {job description, resume_1..n}
//! and dropped when the call returns. Weighting:
//!   tf     = raw term count
//!   idf    = ln((1 + n) / (1 + df)) + 1
//!   vector = l2-normalised tf × idf
//! so cosine similarity reduces to a dot product.

use std::collections::BTreeMap;

use regex::Regex;

use crate::errors::RankError;

/// Words of two or more word characters; single letters never become terms.
const TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

type SparseVector = BTreeMap<String, f64>;

pub struct SimilarityScorer {
    token_pattern: Regex,
}

impl SimilarityScorer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            token_pattern: Regex::new(TOKEN_PATTERN)?,
        })
    }

    /// One similarity in [0, 1] per resume, in input order.
    pub fn score(&self, job_description: &str, resumes: &[String]) -> Result<Vec<f64>, RankError> {
        if job_description.trim().is_empty() {
            return Err(RankError::InvalidInput(
                "job_description is required".to_string(),
            ));
        }

        let mut documents = Vec::with_capacity(resumes.len() + 1);
        documents.push(self.term_counts(job_description));
        documents.extend(resumes.iter().map(|r| self.term_counts(r)));

        let vectors = weigh(documents);
        let (jd, rest) = vectors.split_first().ok_or_else(|| {
            RankError::InvalidInput("empty document set".to_string())
        })?;

        Ok(rest.iter().map(|v| dot(jd, v).clamp(0.0, 1.0)).collect())
    }

    fn term_counts(&self, text: &str) -> SparseVector {
        let words: Vec<String> = self
            .token_pattern
            .find_iter(&text.to_lowercase())
            .map(|m| m.as_str().to_string())
            .collect();

        let mut counts = SparseVector::new();
        for word in &words {
            *counts.entry(word.clone()).or_insert(0.0) += 1.0;
        }
        for pair in words.windows(2) {
            *counts.entry(format!("{} {}", pair[0], pair[1])).or_insert(0.0) += 1.0;
        }
        counts
    }
}

/// Applies smoothed idf and l2 normalisation to raw counts.
fn weigh(documents: Vec<SparseVector>) -> Vec<SparseVector> {
    let n = documents.len() as f64;

    let mut df: BTreeMap<String, f64> = BTreeMap::new();
    for doc in &documents {
        for term in doc.keys() {
            *df.entry(term.clone()).or_insert(0.0) += 1.0;
        }
    }

    documents
        .into_iter()
        .map(|mut doc| {
            for (term, weight) in doc.iter_mut() {
                let idf = ((1.0 + n) / (1.0 + df[term])).ln() + 1.0;
                *weight *= idf;
            }
            let norm = doc.values().map(|w| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                doc.values_mut().for_each(|w| *w /= norm);
            }
            doc
        })
        .collect()
}

/// Dot product of two sparse vectors; zero when either is empty.
fn dot(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, w)| large.get(term).map(|v| w * v))
        .fold(0.0, |acc, x| acc + x)
}
