// Challenge sessions
// One session per learner per challenge. A session owns its seeded database,
// serializes submissions and keeps the attempt history.

pub mod handlers;
pub mod progress;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::catalog::{SeedDataset, SqlChallenge};
use crate::engine::{DatabaseHandle, ExecutionFailure, InitError, QueryResult};
use crate::grading::{validate, ChallengeSpec, PredicateRegistry, Verdict};

pub use progress::{Attempt, ChallengeProgress};
pub use store::{SessionLimitReached, SessionStore};

#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub result: QueryResult,
    pub verdict: Verdict,
    pub attempt: Attempt,
}

pub struct ChallengeSession {
    id: Uuid,
    challenge: Arc<SqlChallenge>,
    spec: ChallengeSpec,
    seed: SeedDataset,
    handle: DatabaseHandle,
    progress: ChallengeProgress,
    query_timeout: Option<Duration>,
    last_active: Instant,
}

impl ChallengeSession {
    /// Seeds a private database and checks that every table and column the
    /// challenge shows the learner actually exists. No session is returned
    /// if either step fails.
    pub async fn start(
        challenge: Arc<SqlChallenge>,
        seed: SeedDataset,
        query_timeout: Option<Duration>,
    ) -> Result<Self, InitError> {
        let mut handle = DatabaseHandle::initialize(seed.schema, seed.data).await?;

        if let Err(e) = verify_tables(&mut handle, &challenge).await {
            handle.close().await;
            return Err(e);
        }

        let id = Uuid::new_v4();
        info!(session_id = %id, challenge_id = %challenge.id, "Challenge session started");

        Ok(Self {
            id,
            spec: challenge.spec(),
            progress: ChallengeProgress::new(&challenge.id),
            challenge,
            seed,
            handle,
            query_timeout,
            last_active: Instant::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Time since the learner last created, polled or submitted to this
    /// session.
    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }

    pub fn progress(&mut self) -> ChallengeProgress {
        self.last_active = Instant::now();
        let mut snapshot = self.progress.clone();
        snapshot.refresh(chrono::Utc::now());
        snapshot
    }

    /// Executes `query`, grades the result and records the attempt.
    pub async fn submit(&mut self, query: &str, predicates: &PredicateRegistry) -> Submission {
        let started = Instant::now();
        self.last_active = started;

        let result = match self.query_timeout {
            Some(limit) => {
                let outcome = tokio::time::timeout(limit, self.handle.execute(query)).await;
                match outcome {
                    Ok(result) => result,
                    Err(_) => {
                        let limit_ms = limit.as_millis() as u64;
                        warn!(session_id = %self.id, limit_ms, "Query timed out; reseeding database");
                        self.handle.interrupter().interrupt();
                        self.reset_database().await;
                        QueryResult::Failure(ExecutionFailure::timeout(limit_ms))
                    }
                }
            }
            None => self.handle.execute(query).await,
        };

        let execution_time_ms = started.elapsed().as_millis() as u64;
        self.last_active = Instant::now();
        let verdict = validate(&result, &self.spec, predicates);
        let attempt = Attempt::new(query, &result, &verdict, execution_time_ms);

        info!(
            session_id = %self.id,
            challenge_id = %self.challenge.id,
            executed = result.is_success(),
            passed = verdict.passed,
            category = ?verdict.category,
            execution_time_ms,
            "Submission graded"
        );

        self.progress.record(attempt.clone());
        Submission {
            result,
            verdict,
            attempt,
        }
    }

    /// Swaps in a freshly seeded database after a timed-out query. The old
    /// handle has already been interrupted and can no longer run statements.
    async fn reset_database(&mut self) {
        match DatabaseHandle::initialize(self.seed.schema, self.seed.data).await {
            Ok(fresh) => {
                let stale = std::mem::replace(&mut self.handle, fresh);
                // Closed in the background so the submission does not wait
                // on the interrupted statement to unwind.
                tokio::spawn(stale.close());
            }
            Err(e) => error!(session_id = %self.id, "Failed to reseed database: {e}"),
        }
    }

    pub async fn close(self) {
        info!(session_id = %self.id, "Challenge session closed");
        self.handle.close().await;
    }
}

async fn verify_tables(handle: &mut DatabaseHandle, challenge: &SqlChallenge) -> Result<(), InitError> {
    for table in &challenge.tables {
        let actual = handle
            .table_columns(&table.name)
            .await
            .map_err(InitError::Schema)?;

        let missing: Vec<String> = table
            .columns
            .iter()
            .filter(|c| !actual.contains(&c.name))
            .map(|c| format!("{}.{}", table.name, c.name))
            .collect();

        if !missing.is_empty() {
            return Err(InitError::SchemaMismatch(format!(
                "challenge {} lists {} which the seeded database lacks",
                challenge.id,
                missing.join(", ")
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::{ColumnSchema, TableSchema};
    use crate::catalog::Catalog;
    use crate::engine::ExecutionErrorKind;
    use crate::grading::FailureCategory;

    const SOLUTION: &str = "SELECT employee_id, first_name, last_name, department, salary, hire_date \
         FROM employees WHERE department='Engineering' AND salary>100000 AND hire_date>'2021-12-31'";

    async fn session(timeout: Option<Duration>) -> (ChallengeSession, PredicateRegistry) {
        let catalog = Catalog::builtin();
        let challenge = catalog.get("challenge-1").unwrap();
        let session = ChallengeSession::start(challenge, catalog.seed(), timeout)
            .await
            .expect("session starts");
        (session, catalog.predicate_registry())
    }

    #[tokio::test]
    async fn test_passing_submission_completes() {
        let (mut s, predicates) = session(None).await;
        let submission = s.submit(SOLUTION, &predicates).await;

        assert!(submission.verdict.passed);
        assert!(submission.attempt.success);
        let progress = s.progress();
        assert!(progress.completed);
        assert_eq!(progress.attempts.len(), 1);
        assert_eq!(progress.challenge_id, "challenge-1");
        s.close().await;
    }

    #[tokio::test]
    async fn test_failures_are_recorded() {
        let (mut s, predicates) = session(None).await;

        let bad = s.submit("SELECT * FROM nowhere", &predicates).await;
        assert_eq!(bad.verdict.category, Some(FailureCategory::ExecutionError));
        assert!(bad.attempt.error.as_deref().unwrap().contains("no such table"));

        let empty = s
            .submit("SELECT * FROM employees WHERE department='NonExistent'", &predicates)
            .await;
        assert_eq!(empty.verdict.category, Some(FailureCategory::EmptyResult));
        assert_eq!(empty.attempt.error, None);

        let progress = s.progress();
        assert!(!progress.completed);
        assert_eq!(progress.attempts.len(), 2);
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_state() {
        let (mut a, predicates) = session(None).await;
        let (mut b, _) = session(None).await;

        a.submit("DELETE FROM employees", &predicates).await;
        assert!(!a.submit(SOLUTION, &predicates).await.verdict.passed);
        assert!(b.submit(SOLUTION, &predicates).await.verdict.passed);
    }

    #[tokio::test]
    async fn test_timeout_reseeds_database() {
        let (mut s, predicates) = session(Some(Duration::from_millis(10))).await;
        s.submit("DELETE FROM employees", &predicates).await;
        let stale = s.handle.interrupter();

        let slow = "WITH RECURSIVE r(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM r) \
                    SELECT COUNT(*) AS n FROM r";
        let timed_out = s.submit(slow, &predicates).await;
        match &timed_out.result {
            QueryResult::Failure(f) => assert_eq!(f.kind, ExecutionErrorKind::Timeout),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(timed_out.verdict.category, Some(FailureCategory::ExecutionError));

        // The runaway statement is aborted, not left spinning; the new
        // handle is untouched.
        assert!(stale.is_interrupted());
        assert!(!s.handle.interrupter().is_interrupted());

        // Fresh seed: the earlier DELETE is gone.
        s.query_timeout = Some(Duration::from_secs(30));
        assert!(s.submit(SOLUTION, &predicates).await.verdict.passed);
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_setup_error() {
        let catalog = Catalog::builtin();
        let mut challenge = (*catalog.get("challenge-1").unwrap()).clone();
        challenge.tables.push(TableSchema::new(
            "employees",
            vec![ColumnSchema::new("bonus", "INTEGER")],
        ));

        let err = ChallengeSession::start(Arc::new(challenge), catalog.seed(), None)
            .await
            .err()
            .expect("content mismatch must fail");
        match err {
            InitError::SchemaMismatch(msg) => assert!(msg.contains("employees.bonus")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_activity_resets_idle_time() {
        let (mut s, predicates) = session(None).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(s.idle_for() >= Duration::from_millis(30));

        s.submit("SELECT 1 AS one", &predicates).await;
        assert!(s.idle_for() < Duration::from_millis(30));
    }
}
