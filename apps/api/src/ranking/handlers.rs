//! Axum route handlers for the Ranking API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::ranking::ranker::{RankOptions, RankedResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub count: usize,
    pub results: Vec<RankedResult>,
}

/// POST /rank-csv
///
/// Multipart form: `file` (CSV), `job_description`, optional `top_k`.
/// Ranking is CPU-bound, so it runs on the blocking pool.
pub async fn handle_rank_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RankResponse>, AppError> {
    let mut csv_bytes: Option<Vec<u8>> = None;
    let mut job_description: Option<String> = None;
    let mut top_k: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => csv_bytes = Some(field.bytes().await.map_err(invalid_form)?.to_vec()),
            "job_description" => job_description = Some(field.text().await.map_err(invalid_form)?),
            "top_k" => top_k = Some(field.text().await.map_err(invalid_form)?),
            _ => {}
        }
    }

    let csv_bytes = csv_bytes.ok_or_else(|| AppError::Validation("file is required".to_string()))?;
    let job_description = job_description
        .ok_or_else(|| AppError::Validation("job_description is required".to_string()))?;
    let options = RankOptions {
        top_k: match top_k {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|_| AppError::Validation(format!("top_k must be an integer, got '{raw}'")))?,
            None => state.config.default_top_k,
        },
    };

    let ranker = state.ranker.clone();
    let results = tokio::task::spawn_blocking(move || {
        ranker.rank_csv(&csv_bytes, &job_description, &options)
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))??;

    Ok(Json(RankResponse {
        count: results.len(),
        results,
    }))
}

fn invalid_form(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart form: {e}"))
}
