use crate::{db::pool::DbPool, services::notification::Notifier, validation::SubmissionPolicy};
use axum::extract::FromRef;

/// Process-scoped state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub notifier: Notifier,
    pub policy: SubmissionPolicy,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Notifier {
    fn from_ref(state: &AppState) -> Self {
        state.notifier.clone()
    }
}

impl FromRef<AppState> for SubmissionPolicy {
    fn from_ref(state: &AppState) -> Self {
        state.policy
    }
}
