// src/validation.rs

use serde_json::{Map, Value};

use crate::models::submission::{AnswerDetail, Score, Submission};

/// First structural problem found in a submission body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Invalid or missing {0}")]
    Field(&'static str),

    #[error("Invalid score structure: score.{0}")]
    Score(&'static str),

    #[error("Invalid or missing answers: at least one answer is required")]
    EmptyAnswers,

    #[error("Invalid answer structure: answers[{index}].{field}")]
    Answer { index: usize, field: &'static str },
}

impl ValidationError {
    /// Path of the offending field, e.g. `score.grade` or `answers[2].isCorrect`.
    pub fn field(&self) -> String {
        match self {
            ValidationError::NotAnObject => String::new(),
            ValidationError::Field(name) => (*name).to_string(),
            ValidationError::Score(name) => format!("score.{name}"),
            ValidationError::EmptyAnswers => "answers".to_string(),
            ValidationError::Answer { index, field } => format!("answers[{index}].{field}"),
        }
    }
}

/// Checks the shape of an untyped submission and builds the typed value.
///
/// Top-level fields are checked first, in a fixed order; answers are only
/// inspected once all of them pass, one by one, stopping at the first bad
/// element. Nothing beyond types and presence is checked: `correct <= total`,
/// the email format and the `completedAt` date are all taken as sent.
pub fn validate_submission(payload: &Value) -> Result<Submission, ValidationError> {
    let body = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    let email = non_empty_str(body, "email").ok_or(ValidationError::Field("email"))?;

    let quiz_id = int(body, "quizId")
        .filter(|id| *id != 0)
        .ok_or(ValidationError::Field("quizId"))?;

    let quiz_title = non_empty_str(body, "quizTitle").ok_or(ValidationError::Field("quizTitle"))?;

    let score = body
        .get("score")
        .and_then(Value::as_object)
        .ok_or(ValidationError::Field("score"))?;
    let score = validate_score(score)?;

    let answers = body
        .get("answers")
        .and_then(Value::as_array)
        .ok_or(ValidationError::Field("answers"))?;
    if answers.is_empty() {
        return Err(ValidationError::EmptyAnswers);
    }

    let completed_at =
        non_empty_str(body, "completedAt").ok_or(ValidationError::Field("completedAt"))?;

    let session_duration = int(body, "sessionDuration")
        .filter(|secs| *secs >= 0)
        .ok_or(ValidationError::Field("sessionDuration"))?;

    let answers = answers
        .iter()
        .enumerate()
        .map(|(index, answer)| validate_answer(index, answer))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Submission {
        email: email.to_string(),
        quiz_id,
        quiz_title: quiz_title.to_string(),
        score,
        answers,
        completed_at: completed_at.to_string(),
        session_duration,
    })
}

fn validate_score(score: &Map<String, Value>) -> Result<Score, ValidationError> {
    let correct = int(score, "correct").ok_or(ValidationError::Score("correct"))?;
    let total = int(score, "total").ok_or(ValidationError::Score("total"))?;
    let percentage = score
        .get("percentage")
        .and_then(Value::as_f64)
        .ok_or(ValidationError::Score("percentage"))?;
    let grade = str_field(score, "grade").ok_or(ValidationError::Score("grade"))?;

    Ok(Score {
        correct,
        total,
        percentage,
        grade: grade.to_string(),
    })
}

fn validate_answer(index: usize, answer: &Value) -> Result<AnswerDetail, ValidationError> {
    let invalid = |field| ValidationError::Answer { index, field };

    let answer = answer.as_object().ok_or(invalid("questionId"))?;

    Ok(AnswerDetail {
        question_id: int(answer, "questionId").ok_or(invalid("questionId"))?,
        question_title: str_field(answer, "questionTitle")
            .ok_or(invalid("questionTitle"))?
            .to_string(),
        answer_id: int(answer, "answerId").ok_or(invalid("answerId"))?,
        answer_text: str_field(answer, "answerText")
            .ok_or(invalid("answerText"))?
            .to_string(),
        is_correct: answer
            .get("isCorrect")
            .and_then(Value::as_bool)
            .ok_or(invalid("isCorrect"))?,
    })
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)?.as_str()
}

fn non_empty_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    str_field(obj, key).filter(|s| !s.is_empty())
}

fn int(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    obj.get(key)?.as_i64()
}

/// Disagreement between the declared score and the submitted answers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyError {
    #[error("score.correct is {declared} but {actual} answers are marked correct")]
    Correct { declared: i64, actual: i64 },

    #[error("score.total is {declared} but {actual} answers were submitted")]
    Total { declared: i64, actual: i64 },
}

/// Checks applied on top of the structural validation.
///
/// Off by default; `STRICT_SCORE_CHECK=true` turns on the score/answer
/// consistency check.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionPolicy {
    pub strict_scores: bool,
}

impl SubmissionPolicy {
    pub fn check(&self, submission: &Submission) -> Result<(), ConsistencyError> {
        if self.strict_scores {
            check_consistency(submission)?;
        }
        Ok(())
    }
}

/// Declared `correct`/`total` must match the submitted answers.
pub fn check_consistency(submission: &Submission) -> Result<(), ConsistencyError> {
    let correct = submission.answers.iter().filter(|a| a.is_correct).count() as i64;
    if submission.score.correct != correct {
        return Err(ConsistencyError::Correct {
            declared: submission.score.correct,
            actual: correct,
        });
    }

    let total = submission.answers.len() as i64;
    if submission.score.total != total {
        return Err(ConsistencyError::Total {
            declared: submission.score.total,
            actual: total,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "email": "a@b.com",
            "quizId": 1,
            "quizTitle": "T",
            "score": {"correct": 1, "total": 2, "percentage": 50, "grade": "C"},
            "answers": [{
                "questionId": 1,
                "questionTitle": "Q1",
                "answerId": 1,
                "answerText": "X",
                "isCorrect": true
            }],
            "completedAt": "2025-01-15T10:00:00Z",
            "sessionDuration": 120
        })
    }

    fn reject(body: Value) -> ValidationError {
        validate_submission(&body).unwrap_err()
    }

    #[test]
    fn test_accepts_minimal_submission() {
        let submission = validate_submission(&valid_body()).unwrap();
        assert_eq!(submission.email, "a@b.com");
        assert_eq!(submission.quiz_id, 1);
        assert_eq!(submission.score.percentage, 50.0);
        assert_eq!(submission.answers.len(), 1);
        assert!(submission.answers[0].is_correct);
        assert_eq!(submission.completed_at, "2025-01-15T10:00:00Z");
        assert_eq!(submission.session_duration, 120);
    }

    #[test]
    fn test_accepts_boundary_values() {
        for percentage in [json!(0), json!(100), json!(66.67)] {
            let mut body = valid_body();
            body["sessionDuration"] = json!(0);
            body["score"]["percentage"] = percentage.clone();
            let submission = validate_submission(&body).unwrap();
            assert_eq!(submission.session_duration, 0);
            assert_eq!(Some(submission.score.percentage), percentage.as_f64());
        }
    }

    #[test]
    fn test_rejects_non_object_body() {
        assert_eq!(reject(json!([1, 2])), ValidationError::NotAnObject);
    }

    #[test]
    fn test_rejects_empty_answers() {
        let mut body = valid_body();
        body["answers"] = json!([]);
        let err = reject(body);
        assert_eq!(err, ValidationError::EmptyAnswers);
        assert_eq!(err.field(), "answers");
    }

    #[test]
    fn test_rejects_missing_answers() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("answers");
        assert_eq!(reject(body), ValidationError::Field("answers"));
    }

    #[test]
    fn test_rejects_each_missing_score_field() {
        for field in ["correct", "total", "percentage", "grade"] {
            let mut body = valid_body();
            body["score"].as_object_mut().unwrap().remove(field);
            let err = reject(body);
            assert_eq!(err, ValidationError::Score(field));
            assert_eq!(err.to_string(), format!("Invalid score structure: score.{field}"));
        }
    }

    #[test]
    fn test_rejects_answer_without_is_correct() {
        let mut body = valid_body();
        body["answers"][0].as_object_mut().unwrap().remove("isCorrect");
        let err = reject(body);
        assert_eq!(err.field(), "answers[0].isCorrect");
    }

    #[test]
    fn test_rejects_non_string_email() {
        let mut body = valid_body();
        body["email"] = json!(42);
        let err = reject(body);
        assert_eq!(err, ValidationError::Field("email"));
        assert_eq!(err.to_string(), "Invalid or missing email");
    }

    #[test]
    fn test_rejects_bad_session_duration() {
        for value in [json!("120"), json!(-1), json!(null)] {
            let mut body = valid_body();
            body["sessionDuration"] = value;
            assert_eq!(reject(body), ValidationError::Field("sessionDuration"));
        }
    }

    #[test]
    fn test_top_level_fields_are_checked_in_order() {
        let body = json!({"quizId": "x", "answers": []});
        assert_eq!(reject(body), ValidationError::Field("email"));

        let body = json!({"email": "a@b.com", "quizTitle": 3});
        assert_eq!(reject(body), ValidationError::Field("quizId"));

        let mut body = valid_body();
        body["score"] = json!("A");
        body["answers"] = json!([]);
        assert_eq!(reject(body), ValidationError::Field("score"));
    }

    #[test]
    fn test_top_level_checks_run_before_answer_elements() {
        let mut body = valid_body();
        body["answers"] = json!([{"questionId": "bad"}]);
        body["sessionDuration"] = json!(-5);
        assert_eq!(reject(body), ValidationError::Field("sessionDuration"));
    }

    #[test]
    fn test_stops_at_first_invalid_answer() {
        let mut body = valid_body();
        let good = body["answers"][0].clone();
        body["answers"] = json!([good, {"questionId": 2, "questionTitle": 5}, {}]);
        assert_eq!(
            reject(body),
            ValidationError::Answer { index: 1, field: "questionTitle" }
        );
    }

    #[test]
    fn test_no_semantic_checks() {
        let mut body = valid_body();
        body["email"] = json!("not-an-email");
        body["completedAt"] = json!("yesterday");
        body["score"]["correct"] = json!(10);
        body["score"]["total"] = json!(2);
        assert!(validate_submission(&body).is_ok());
    }

    #[test]
    fn test_consistency_check_is_opt_in() {
        let submission = validate_submission(&valid_body()).unwrap();
        // Declares total 2 for a single answer: accepted by default.
        assert_eq!(
            check_consistency(&submission),
            Err(ConsistencyError::Total { declared: 2, actual: 1 })
        );

        let mut consistent = submission.clone();
        consistent.score.total = 1;
        assert_eq!(check_consistency(&consistent), Ok(()));

        consistent.answers[0].is_correct = false;
        assert_eq!(
            check_consistency(&consistent),
            Err(ConsistencyError::Correct { declared: 1, actual: 0 })
        );
    }

    #[test]
    fn test_policy_only_checks_scores_when_strict() {
        let submission = validate_submission(&valid_body()).unwrap();

        assert!(SubmissionPolicy::default().check(&submission).is_ok());

        let strict = SubmissionPolicy { strict_scores: true };
        assert_eq!(
            strict.check(&submission),
            Err(ConsistencyError::Total { declared: 2, actual: 1 })
        );
    }
}
