use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pipeline::{AnalysisOutcome, ResultEntry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::metrics::{MetricsSnapshot, RequestOutcome, TimedOperation};
use crate::state::AppState;

pub const MISSING_FIELDS: &str = "URL and query are required";
pub const INVALID_URL: &str = "URL is not valid";
pub const NOT_CONFIGURED: &str = "API keys are not configured";
pub const FETCH_FAILED: &str = "Content could not be fetched. Please check the URL.";
pub const NO_ENTRIES: &str = "No relevant entries were found.";
pub const ANALYSIS_FAILED: &str = "An error occurred during analysis";

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

/// The three top-level states of an analysis.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalyzeResponse {
    Success { results: Vec<ResultEntry> },
    Empty { message: String, results: Vec<ResultEntry> },
    Error { message: String },
}

impl AnalyzeResponse {
    fn error(message: &str) -> Self {
        AnalyzeResponse::Error {
            message: message.to_string(),
        }
    }

    fn request_outcome(&self) -> RequestOutcome {
        match self {
            AnalyzeResponse::Success { .. } => RequestOutcome::Success,
            AnalyzeResponse::Empty { .. } => RequestOutcome::Empty,
            AnalyzeResponse::Error { .. } => RequestOutcome::Failed,
        }
    }
}

impl From<AnalysisOutcome> for AnalyzeResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::Empty => AnalyzeResponse::Empty {
                message: NO_ENTRIES.to_string(),
                results: Vec::new(),
            },
            AnalysisOutcome::Success(results) => AnalyzeResponse::Success { results },
        }
    }
}

impl IntoResponse for AnalyzeResponse {
    fn into_response(self) -> Response {
        let status = match self {
            AnalyzeResponse::Error { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::OK,
        };
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationError {
    pub error: &'static str,
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

fn validate(payload: Result<Json<AnalyzeRequest>, JsonRejection>) -> Result<(Url, String), ValidationError> {
    let Ok(Json(request)) = payload else {
        return Err(ValidationError { error: MISSING_FIELDS });
    };

    let non_blank = |field: Option<String>| field.filter(|value| !value.trim().is_empty());
    let (Some(url), Some(query)) = (non_blank(request.url), non_blank(request.query)) else {
        return Err(ValidationError { error: MISSING_FIELDS });
    };

    match Url::parse(url.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok((url, query)),
        _ => Err(ValidationError { error: INVALID_URL }),
    }
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    let (url, query) = match validate(payload) {
        Ok(valid) => valid,
        Err(rejection) => {
            state.metrics.record_request(RequestOutcome::Rejected);
            return rejection.into_response();
        }
    };

    let Some(analyzer) = state.analyzer.clone() else {
        tracing::error!("Analysis requested but API credentials are not configured");
        state.metrics.record_request(RequestOutcome::Failed);
        return AnalyzeResponse::error(NOT_CONFIGURED).into_response();
    };

    let timer = TimedOperation::start();
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("analyze", %request_id, %url);

    // A panic inside the pipeline surfaces as a JoinError instead of tearing down the connection
    let task = tokio::spawn(
        async move { analyzer.analyze(&url, &query).await }.instrument(span),
    );

    let response = match task.await {
        Ok(Ok(outcome)) => AnalyzeResponse::from(outcome),
        Ok(Err(e)) => {
            tracing::error!(%request_id, error = %e, "Analysis aborted");
            AnalyzeResponse::error(FETCH_FAILED)
        }
        Err(e) => {
            tracing::error!(%request_id, error = %e, "Analysis task failed");
            AnalyzeResponse::error(ANALYSIS_FAILED)
        }
    };

    let entries: &[ResultEntry] = match &response {
        AnalyzeResponse::Success { results } => results.as_slice(),
        _ => &[],
    };
    state.metrics.record_request(response.request_outcome());
    state.metrics.record_analysis(timer.elapsed(), entries);

    response.into_response()
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub credentials: &'static str,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        credentials: if state.analyzer.is_some() {
            "configured"
        } else {
            "missing"
        },
    })
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
