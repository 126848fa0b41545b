// src/handlers/quiz_results.rs

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use validator::Validate;

use crate::{
    db::pool::DbPool,
    error::AppError,
    models::{
        quiz_result::{ListParams, ListResponse, QuizResultSummary},
        submission::{Submission, SubmitResponse},
    },
    services::{notification::Notifier, result_writer},
    validation::{SubmissionPolicy, validate_submission},
};

/// Records a completed quiz.
///
/// * Validates the body structurally (first violation wins), then applies the
///   optional score consistency check.
/// * Stores result, score and answers in one transaction.
/// * Hands the stored result to the notifier in the background; its outcome
///   never changes the response.
#[utoipa::path(
    post,
    path = "/api/quiz-results",
    tag = "Quiz Results",
    request_body = Submission,
    responses(
        (status = 201, description = "Result stored", body = SubmitResponse),
        (status = 400, description = "Invalid submission, names the offending field"),
        (status = 500, description = "Result could not be stored")
    )
)]
pub async fn submit_result(
    State(pool): State<DbPool>,
    State(notifier): State<Notifier>,
    State(policy): State<SubmissionPolicy>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    let submission = validate_submission(&payload).inspect_err(|e| {
        tracing::warn!(field = %e.field(), "Rejected quiz result: {}", e);
    })?;
    policy.check(&submission).inspect_err(|e| {
        tracing::warn!("Rejected inconsistent quiz result: {}", e);
    })?;

    let result_id = result_writer::persist(&pool, &submission).await?;

    tokio::spawn(async move {
        let outcome = notifier.notify(&submission, result_id).await;
        tracing::debug!(result_id, ?outcome, "Result notification finished");
    });

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            success: true,
            message: "Quiz results saved successfully".to_string(),
            result_id,
        }),
    ))
}

/// Lists stored results, newest completion first.
///
/// An empty `email` or a zero `quizId` means no filter on that column.
#[utoipa::path(
    get,
    path = "/api/quiz-results",
    tag = "Quiz Results",
    params(ListParams),
    responses(
        (status = 200, description = "Matching results", body = ListResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 500, description = "Results could not be read")
    )
)]
pub async fn list_results(
    State(pool): State<DbPool>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    params.validate()?;

    let results = sqlx::query_as::<_, QuizResultSummary>(
        r#"
        SELECT
            qr.id, qr.email, qr.quiz_id, qr.quiz_title,
            qr.completed_at, qr.session_duration, qr.created_at,
            qs.correct_answers, qs.total_questions, qs.percentage, qs.grade
        FROM quiz_results qr
        LEFT JOIN quiz_scores qs ON qr.id = qs.result_id
        WHERE ($1::TEXT IS NULL OR qr.email = $1)
          AND ($2::BIGINT IS NULL OR qr.quiz_id = $2)
        ORDER BY qr.completed_at DESC, qr.id DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(params.email_filter())
    .bind(params.quiz_id_filter())
    .bind(params.limit())
    .bind(params.offset())
    .fetch_all(pool.as_pg_pool())
    .await?;

    Ok(Json(ListResponse {
        success: true,
        count: results.len(),
        data: results,
    }))
}
