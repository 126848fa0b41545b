// src/services/result_writer.rs

use sqlx::{Connection, PgConnection};

use crate::{
    db::pool::{DbPool, PoolError},
    models::submission::Submission,
};

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Refusing to store a submission without answers")]
    NoAnswers,

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("Failed to {step}: {source}")]
    Database {
        step: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

fn db_step(step: &'static str) -> impl FnOnce(sqlx::Error) -> PersistError {
    move |source| PersistError::Database { step, source }
}

/// Stores a submission as one `quiz_results` row, its `quiz_scores` row and one
/// `quiz_answers` row per answer, all in a single transaction.
///
/// Returns the generated result id. On any failure the transaction is rolled
/// back, so no partial aggregate is ever visible. The connection goes back to
/// the pool on every path.
pub async fn persist(pool: &DbPool, submission: &Submission) -> Result<i64, PersistError> {
    if submission.answers.is_empty() {
        return Err(PersistError::NoAnswers);
    }

    let mut conn = pool.acquire().await?;
    let result = write_aggregate(&mut conn, submission).await;
    pool.release(conn);

    let result_id = result?;
    tracing::info!(
        result_id,
        email = %submission.email,
        quiz = %submission.quiz_title,
        answers = submission.answers.len(),
        "Quiz result saved successfully"
    );
    Ok(result_id)
}

async fn write_aggregate(
    conn: &mut PgConnection,
    submission: &Submission,
) -> Result<i64, PersistError> {
    let mut tx = conn.begin().await.map_err(db_step("begin transaction"))?;

    match insert_rows(&mut tx, submission).await {
        Ok(result_id) => {
            tx.commit().await.map_err(db_step("commit transaction"))?;
            Ok(result_id)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!("Failed to roll back quiz result transaction: {:?}", rollback_err);
            }
            Err(e)
        }
    }
}

async fn insert_rows(conn: &mut PgConnection, submission: &Submission) -> Result<i64, PersistError> {
    // completed_at is cast by the database, inside the transaction.
    let result_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO quiz_results (email, quiz_id, quiz_title, completed_at, session_duration)
        VALUES ($1, $2, $3, $4::TIMESTAMPTZ, $5)
        RETURNING id
        "#,
    )
    .bind(&submission.email)
    .bind(submission.quiz_id)
    .bind(&submission.quiz_title)
    .bind(&submission.completed_at)
    .bind(submission.session_duration)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_step("insert quiz result"))?;

    sqlx::query(
        r#"
        INSERT INTO quiz_scores (result_id, correct_answers, total_questions, percentage, grade)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(result_id)
    .bind(submission.score.correct)
    .bind(submission.score.total)
    .bind(submission.score.percentage)
    .bind(&submission.score.grade)
    .execute(&mut *conn)
    .await
    .map_err(db_step("insert quiz score"))?;

    for answer in &submission.answers {
        sqlx::query(
            r#"
            INSERT INTO quiz_answers
                (result_id, question_id, question_title, answer_id, answer_text, is_correct)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(result_id)
        .bind(answer.question_id)
        .bind(&answer.question_title)
        .bind(answer.answer_id)
        .bind(&answer.answer_text)
        .bind(answer.is_correct)
        .execute(&mut *conn)
        .await
        .map_err(db_step("insert quiz answer"))?;
    }

    Ok(result_id)
}
