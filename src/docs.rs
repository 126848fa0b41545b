// src/docs.rs

use utoipa::OpenApi;

use crate::{
    handlers::{health, quiz_results},
    models::{
        quiz_result::{ListResponse, QuizResultSummary},
        submission::{AnswerDetail, Score, Submission, SubmitResponse},
    },
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quiz Results API",
        version = "1.0.0",
        description = "Receives and stores quiz results sent by the quiz client"
    ),
    paths(
        quiz_results::submit_result,
        quiz_results::list_results,
        health::health
    ),
    components(schemas(
        Submission,
        Score,
        AnswerDetail,
        SubmitResponse,
        QuizResultSummary,
        ListResponse,
        health::HealthResponse
    )),
    tags(
        (name = "Quiz Results", description = "Submission and retrieval of quiz results"),
        (name = "Health", description = "Service status")
    )
)]
pub struct ApiDoc;
