//! Ranking Orchestrator — scores every resume in a table against one job description.
//!
//! Pipeline per request:
//! 1. resolve text / id / category columns
//! 2. normalize the JD and every resume
//! 3. TF-IDF cosine similarity across the whole corpus (one vector space)
//! 4. skill extraction on the raw JD and raw resumes, then matched / missing diff
//! 5. stable sort by score descending, truncate to `top_k`

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::RankError;
use crate::nlp::Pipeline;
use crate::ranking::normalizer::normalize;
use crate::ranking::similarity::SimilarityScorer;
use crate::ranking::skills::{SkillExtractor, SkillVocabulary};
use crate::ranking::table::{resolve_columns, Cell, Table};

pub const DEFAULT_TOP_K: i64 = 10;

/// Per-request ranking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankOptions {
    /// Maximum results returned. Values ≤ 0 yield an empty ranking.
    pub top_k: i64,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// One ranked resume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    /// 0-based position in the input table.
    pub row_index: usize,
    pub similarity: f64, // 0.0 – 1.0
    pub score: f64,      // similarity × 100, 2 decimals
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(rename = "Category", skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
}

pub struct Ranker {
    pipeline: Arc<Pipeline>,
    skills: SkillExtractor,
    scorer: SimilarityScorer,
}

impl Ranker {
    pub fn new(pipeline: Arc<Pipeline>, vocabulary: Arc<SkillVocabulary>) -> Result<Self, regex::Error> {
        Ok(Self {
            skills: SkillExtractor::new(pipeline.clone(), vocabulary),
            pipeline,
            scorer: SimilarityScorer::new()?,
        })
    }

    /// Parses CSV bytes, then ranks. Unparseable input fails before anything else runs.
    pub fn rank_csv(
        &self,
        csv_bytes: &[u8],
        job_description: &str,
        options: &RankOptions,
    ) -> Result<Vec<RankedResult>, RankError> {
        let table = Table::from_csv(csv_bytes)?;
        self.rank(&table, job_description, options)
    }

    pub fn rank(
        &self,
        table: &Table,
        job_description: &str,
        options: &RankOptions,
    ) -> Result<Vec<RankedResult>, RankError> {
        if job_description.trim().is_empty() {
            return Err(RankError::InvalidInput(
                "job_description is required".to_string(),
            ));
        }

        let columns = resolve_columns(table)?;
        debug!(
            "Resolved columns: text={:?} id={:?} category={:?} ({} rows)",
            table.headers()[columns.text],
            columns.id.map(|i| &table.headers()[i]),
            columns.category.map(|i| &table.headers()[i]),
            table.row_count()
        );

        let stopwords = self.pipeline.stopwords();
        let resumes_raw: Vec<String> = table.column(columns.text).map(Cell::as_text).collect();
        let resumes_clean: Vec<String> = resumes_raw.iter().map(|t| normalize(t, stopwords)).collect();
        let jd_clean = normalize(job_description, stopwords);

        let similarities = self.scorer.score(&jd_clean, &resumes_clean)?;

        let jd_skills = self.skills.extract(job_description);
        debug!(
            "Job description skills: {} found via {:?} pipeline",
            jd_skills.len(),
            self.pipeline.kind()
        );

        let ids: Option<Vec<&Cell>> = columns.id.map(|i| table.column(i).collect());
        let categories: Option<Vec<&Cell>> = columns.category.map(|i| table.column(i).collect());

        let mut results: Vec<RankedResult> = resumes_raw
            .iter()
            .zip(similarities)
            .enumerate()
            .map(|(row_index, (raw_text, similarity))| {
                let resume_skills = self.skills.extract(raw_text);
                RankedResult {
                    row_index,
                    similarity,
                    score: to_score(similarity),
                    matched_skills: jd_skills.intersection(&resume_skills).cloned().collect(),
                    missing_skills: jd_skills.difference(&resume_skills).cloned().collect(),
                    id: ids.as_ref().map(|c| c[row_index].to_json()),
                    category: categories.as_ref().map(|c| c[row_index].to_json()),
                }
            })
            .collect();

        // sort_by is stable: equal scores keep input order
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(usize::try_from(options.top_k).unwrap_or(0));

        info!(
            "Ranked {} resumes, returning {}",
            table.row_count(),
            results.len()
        );
        Ok(results)
    }
}

/// similarity × 100 rounded to 2 decimals, ties to even.
fn to_score(similarity: f64) -> f64 {
    (similarity * 100.0 * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::ModelKind;

    fn ranker() -> Ranker {
        Ranker::new(
            Arc::new(Pipeline::new(ModelKind::EnglishRules)),
            Arc::new(SkillVocabulary::default()),
        )
        .unwrap()
    }

    fn text_table(header: &str, resumes: &[&str]) -> Table {
        Table::new(
            vec![header.to_string()],
            resumes.iter().map(|r| vec![Cell::parse(r)]).collect(),
        )
        .unwrap()
    }

    fn top(k: i64) -> RankOptions {
        RankOptions { top_k: k }
    }

    const JD: &str = "We need Python, SQL, and Git.";

    #[test]
    fn test_scenario_python_sql_git() {
        let table = text_table(
            "Resume_str",
            &["Expert in Python and SQL.", "No relevant experience.", ""],
        );
        let results = ranker().rank(&table, JD, &top(2)).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].row_index, 0);
        assert!(results[0].score > 0.0);
        assert_eq!(results[0].matched_skills, vec!["python", "sql"]);
        assert_eq!(results[0].missing_skills, vec!["git"]);
        // rows 1 and 2 tie at zero; input order decides
        assert_eq!(results[1].row_index, 1);
        assert_eq!(results[1].similarity, 0.0);
        assert_eq!(results[1].missing_skills, vec!["git", "python", "sql"]);
    }

    #[test]
    fn test_identical_text_matches_everything() {
        let jd = "Senior engineer: Python, Docker, Kubernetes, machine learning on AWS.";
        let table = text_table("text", &[jd, "Java developer"]);
        let results = ranker().rank(&table, jd, &RankOptions::default()).unwrap();

        assert_eq!(results[0].row_index, 0);
        assert!((results[0].similarity - 1.0).abs() < 1e-9);
        assert_eq!(results[0].score, 100.0);
        assert_eq!(
            results[0].matched_skills,
            vec!["aws", "docker", "kubernetes", "machine learning", "python"]
        );
        assert!(results[0].missing_skills.is_empty());
    }

    #[test]
    fn test_blank_job_description_is_invalid_input() {
        let table = text_table("text", &["python"]);
        for jd in ["", "   \n\t"] {
            let err = ranker().rank(&table, jd, &top(5)).unwrap_err();
            assert!(matches!(err, RankError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_blank_job_description_checked_before_columns() {
        let table = Table::new(vec!["n".to_string()], vec![vec![Cell::Integer(1)]]).unwrap();
        let err = ranker().rank(&table, " ", &top(5)).unwrap_err();
        assert!(matches!(err, RankError::InvalidInput(_)));
    }

    #[test]
    fn test_numeric_only_table_is_missing_column() {
        let table = Table::new(
            vec!["n".to_string(), "m".to_string()],
            vec![vec![Cell::Integer(1), Cell::Float(2.5)]],
        )
        .unwrap();
        let err = ranker().rank(&table, JD, &top(5)).unwrap_err();
        assert!(matches!(err, RankError::MissingColumn(_)));
    }

    #[test]
    fn test_malformed_csv_is_parse_error() {
        let err = ranker().rank_csv(b"a,b\n1,2,3\n", JD, &top(5)).unwrap_err();
        assert!(matches!(err, RankError::Parse(_)));
    }

    #[test]
    fn test_top_k_bounds() {
        let table = text_table("text", &["python", "sql", "git", "java"]);
        let r = ranker();
        assert_eq!(r.rank(&table, JD, &top(2)).unwrap().len(), 2);
        assert_eq!(r.rank(&table, JD, &top(4)).unwrap().len(), 4);
        assert_eq!(r.rank(&table, JD, &top(100)).unwrap().len(), 4);
        assert!(r.rank(&table, JD, &top(0)).unwrap().is_empty());
        assert!(r.rank(&table, JD, &top(-3)).unwrap().is_empty());
    }

    #[test]
    fn test_scores_sorted_bounded_and_rounded() {
        let table = text_table(
            "resume",
            &[
                "Git only",
                "Python SQL Git expert",
                "",
                "Python developer",
                "SQL analyst with Git",
            ],
        );
        let results = ranker().rank(&table, JD, &RankOptions::default()).unwrap();

        assert_eq!(results.len(), 5);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                assert!(pair[0].row_index < pair[1].row_index);
            }
        }
        for r in &results {
            assert!((0.0..=100.0).contains(&r.score));
            assert_eq!(r.score, to_score(r.similarity));
        }
        assert_eq!(results[0].row_index, 1);
    }

    #[test]
    fn test_skill_sets_partition_job_skills() {
        let table = text_table("text", &["Python and Docker", "git, sql", "nothing here"]);
        let jd = "Python, SQL, Git and Docker required";
        let results = ranker().rank(&table, jd, &RankOptions::default()).unwrap();

        let jd_skills = vec!["docker", "git", "python", "sql"];
        for r in &results {
            let mut all: Vec<&str> = r
                .matched_skills
                .iter()
                .chain(&r.missing_skills)
                .map(String::as_str)
                .collect();
            all.sort();
            assert_eq!(all, jd_skills, "row {}", r.row_index);
            assert!(r.matched_skills.iter().all(|s| !r.missing_skills.contains(s)));
        }
    }

    #[test]
    fn test_id_and_category_echoed_when_present() {
        let table = Table::from_csv(
            b"ID,Category,Resume_str\n17,HR,Python recruiter\n,ENGINEERING,SQL engineer\n",
        )
        .unwrap();
        let results = ranker().rank(&table, JD, &RankOptions::default()).unwrap();

        let row0 = results.iter().find(|r| r.row_index == 0).unwrap();
        assert_eq!(row0.id, Some(Value::from(17)));
        assert_eq!(row0.category, Some(Value::from("HR")));
        let row1 = results.iter().find(|r| r.row_index == 1).unwrap();
        assert_eq!(row1.id, Some(Value::Null));
    }

    #[test]
    fn test_optional_fields_omitted_from_json() {
        let table = text_table("text", &["python"]);
        let results = ranker().rank(&table, JD, &RankOptions::default()).unwrap();
        let json = serde_json::to_value(&results[0]).unwrap();
        assert!(json.get("ID").is_none());
        assert!(json.get("Category").is_none());
        assert_eq!(json["matched_skills"], serde_json::json!(["python"]));
    }

    #[test]
    fn test_to_score_rounds_to_two_decimals() {
        assert_eq!(to_score(0.123456), 12.35);
        assert_eq!(to_score(0.0), 0.0);
        assert_eq!(to_score(1.0), 100.0);
    }

    #[test]
    fn test_to_score_ties_round_to_even() {
        // 1/32 × 10⁴ = 312.5 and 3/32 × 10⁴ = 937.5, both exact in binary
        assert_eq!(to_score(0.03125), 3.12);
        assert_eq!(to_score(0.09375), 9.38);
    }

    #[test]
    fn test_zero_similarity_serializes_as_positive_zero() {
        let table = text_table(
            "Resume_str",
            &["Expert in Python and SQL.", "No relevant experience.", ""],
        );
        let results = ranker().rank(&table, JD, &RankOptions::default()).unwrap();
        let json = serde_json::to_string(&results).unwrap();

        assert!(!json.contains("-0.0"), "{json}");
        assert!(json.contains(r#""row_index":1,"similarity":0.0,"score":0.0"#), "{json}");
    }

    #[test]
    fn test_short_csv_row_is_ranked_with_empty_text() {
        let results = ranker()
            .rank_csv(
                b"ID,Category,Resume_str\n1,DATA,Python SQL\n2,HR\n",
                JD,
                &RankOptions::default(),
            )
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].row_index, 0);
        let short = &results[1];
        assert_eq!(short.row_index, 1);
        assert_eq!(short.score, 0.0);
        assert_eq!(short.category, Some(Value::from("HR")));
    }

    #[test]
    fn test_na_markers_in_numeric_column_do_not_capture_resume_text() {
        let results = ranker()
            .rank_csv(
                b"score,body\nNA,Python SQL developer\n3,Java\n",
                "Python SQL",
                &RankOptions::default(),
            )
            .unwrap();

        assert_eq!(results[0].row_index, 0);
        assert!(results[0].score > 0.0);
        assert_eq!(results[0].matched_skills, vec!["python", "sql"]);
    }

    #[test]
    fn test_na_identifier_echoed_as_null() {
        let table = Table::from_csv(b"ID,Resume_str\nNA,Python\nN/A,SQL\n").unwrap();
        let results = ranker().rank(&table, JD, &RankOptions::default()).unwrap();
        assert!(results.iter().all(|r| r.id == Some(Value::Null)));
    }
}
