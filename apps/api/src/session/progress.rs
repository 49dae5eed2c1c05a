use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::engine::QueryResult;
use crate::grading::{FailureCategory, Verdict};

/// One graded submission.
#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    pub id: Uuid,
    pub query: String,
    pub timestamp: DateTime<Utc>,
    /// Whether the verdict passed, not merely whether the query ran.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FailureCategory>,
    /// Database diagnostic when execution failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub execution_time_ms: u64,
}

impl Attempt {
    pub fn new(query: &str, result: &QueryResult, verdict: &Verdict, execution_time_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            query: query.to_string(),
            timestamp: Utc::now(),
            success: verdict.passed,
            category: verdict.category,
            error: result.error_message().map(str::to_string),
            execution_time_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChallengeProgress {
    pub challenge_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub completed: bool,
    pub attempts: Vec<Attempt>,
    /// Seconds from start until completion, or until now while unsolved.
    pub time_spent_secs: i64,
}

impl ChallengeProgress {
    pub fn new(challenge_id: &str) -> Self {
        Self {
            challenge_id: challenge_id.to_string(),
            started_at: Utc::now(),
            completed_at: None,
            completed: false,
            attempts: Vec::new(),
            time_spent_secs: 0,
        }
    }

    /// Appends `attempt`. The first passing attempt completes the challenge;
    /// later attempts are still recorded but never reopen or move it.
    pub fn record(&mut self, attempt: Attempt) {
        if attempt.success && !self.completed {
            self.completed = true;
            self.completed_at = Some(attempt.timestamp);
        }
        self.attempts.push(attempt);
        self.refresh(Utc::now());
    }

    pub fn refresh(&mut self, now: DateTime<Utc>) {
        let end = self.completed_at.unwrap_or(now);
        self.time_spent_secs = (end - self.started_at).num_seconds().max(0);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::engine::{ExecutionFailure, ResultSet};

    fn attempt(passed: bool) -> Attempt {
        let verdict = if passed {
            Verdict::pass()
        } else {
            Verdict::fail(FailureCategory::EmptyResult, "none")
        };
        Attempt::new(
            "SELECT 1",
            &QueryResult::Success(ResultSet::default()),
            &verdict,
            3,
        )
    }

    #[test]
    fn test_first_pass_completes() {
        let mut progress = ChallengeProgress::new("challenge-1");
        progress.record(attempt(false));
        assert!(!progress.completed);

        let passing = attempt(true);
        let at = passing.timestamp;
        progress.record(passing);
        progress.record(attempt(false));

        assert!(progress.completed);
        assert_eq!(progress.completed_at, Some(at));
        assert_eq!(progress.attempts.len(), 3);
    }

    #[test]
    fn test_attempt_keeps_execution_error() {
        let failed = QueryResult::Failure(ExecutionFailure::from_message("no such table: t"));
        let verdict = Verdict::fail(FailureCategory::ExecutionError, "no such table: t");
        let a = Attempt::new("SELECT * FROM t", &failed, &verdict, 1);
        assert!(!a.success);
        assert_eq!(a.error.as_deref(), Some("no such table: t"));
        assert_eq!(a.category, Some(FailureCategory::ExecutionError));
    }

    #[test]
    fn test_time_spent_stops_at_completion() {
        let mut progress = ChallengeProgress::new("challenge-1");
        progress.started_at = Utc::now() - Duration::seconds(90);
        progress.completed = true;
        progress.completed_at = Some(progress.started_at + Duration::seconds(30));

        progress.refresh(Utc::now() + Duration::hours(1));
        assert_eq!(progress.time_spent_secs, 30);
    }

    #[test]
    fn test_time_spent_runs_while_open() {
        let mut progress = ChallengeProgress::new("challenge-1");
        let now = progress.started_at + Duration::seconds(42);
        progress.refresh(now);
        assert_eq!(progress.time_spent_secs, 42);
    }
}
