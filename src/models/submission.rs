// src/models/submission.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One client-reported quiz completion, as accepted by `POST /api/quiz-results`.
///
/// Only built by `validation::validate_submission`, so every instance has at
/// least one answer and a non-negative `session_duration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[schema(example = "student@example.com")]
    pub email: String,

    /// Identifier of the quiz definition; opaque to this service.
    #[schema(example = 1)]
    pub quiz_id: i64,

    #[schema(example = "Rust basics")]
    pub quiz_title: String,

    pub score: Score,

    /// Answers in the order the participant gave them.
    pub answers: Vec<AnswerDetail>,

    /// ISO 8601 timestamp, stored as sent.
    #[schema(example = "2025-01-15T10:00:00Z")]
    pub completed_at: String,

    /// Seconds spent on the quiz.
    #[schema(example = 120)]
    pub session_duration: i64,
}

/// Score as computed by the client. Not checked against `answers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Score {
    #[schema(example = 8)]
    pub correct: i64,
    #[schema(example = 10)]
    pub total: i64,
    #[schema(example = 80.0)]
    pub percentage: f64,
    #[schema(example = "B")]
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDetail {
    pub question_id: i64,
    pub question_title: String,
    pub answer_id: i64,
    pub answer_text: String,
    pub is_correct: bool,
}

/// Body returned once a submission is committed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub result_id: i64,
}
