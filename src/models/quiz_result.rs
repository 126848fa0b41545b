// src/models/quiz_result.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// A stored result joined with its score, as returned by the listing endpoint.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct QuizResultSummary {
    pub id: i64,
    pub email: String,
    pub quiz_id: i64,
    pub quiz_title: String,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    pub session_duration: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,

    // Score columns come from a LEFT JOIN.
    pub correct_answers: Option<i64>,
    pub total_questions: Option<i64>,
    pub percentage: Option<f64>,
    pub grade: Option<String>,
}

/// Query parameters for listing stored results.
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Only results submitted by this email.
    pub email: Option<String>,

    /// Only results for this quiz.
    pub quiz_id: Option<i64>,

    #[validate(range(min = 1, max = 1000, message = "limit must be between 1 and 1000"))]
    #[param(default = 100)]
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "offset must not be negative"))]
    #[param(default = 0)]
    pub offset: Option<i64>,
}

impl ListParams {
    pub const DEFAULT_LIMIT: i64 = 100;

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }

    /// `email=` with no value does not filter.
    pub fn email_filter(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }

    /// `quizId=0` does not filter.
    pub fn quiz_id_filter(&self) -> Option<i64> {
        self.quiz_id.filter(|id| *id != 0)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<QuizResultSummary>,
}
