use serde::Serialize;

use crate::engine::{QueryResult, ResultSet};
use crate::grading::rules::PredicateRegistry;
use crate::grading::verdict::{FailureCategory, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn label(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderingRequirement {
    pub column: String,
    pub direction: SortDirection,
}

impl OrderingRequirement {
    pub fn ascending(column: &str) -> Self {
        Self {
            column: column.to_string(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: &str) -> Self {
        Self {
            column: column.to_string(),
            direction: SortDirection::Descending,
        }
    }
}

/// The shape a correct answer must have. Every field is optional; an absent
/// field means that check does not apply. The semantic predicate is looked
/// up by `challenge_id` in a [`PredicateRegistry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChallengeSpec {
    pub challenge_id: String,
    /// Order-insensitive.
    pub expected_columns: Option<Vec<String>>,
    pub expected_rows: Option<usize>,
    pub ordering: Option<OrderingRequirement>,
}

/// Classifies `result` against `spec`. Checks run in a fixed order and the
/// first failure wins:
///
/// 1. execution error
/// 2. empty result
/// 3. missing columns, then extra columns
/// 4. row count
/// 5. ordering (non-strict)
/// 6. semantic predicate
pub fn validate(
    result: &QueryResult,
    spec: &ChallengeSpec,
    predicates: &PredicateRegistry,
) -> Verdict {
    let set = match result {
        QueryResult::Failure(failure) => {
            return Verdict::fail(FailureCategory::ExecutionError, failure.message.clone())
        }
        QueryResult::Success(set) => set,
    };

    if set.rows.is_empty() {
        return Verdict::fail(
            FailureCategory::EmptyResult,
            "Query executed successfully but returned no results. Check your WHERE conditions.",
        );
    }

    if let Some(expected) = &spec.expected_columns {
        if let Some(verdict) = check_columns(set, expected) {
            return verdict;
        }
    }

    if let Some(expected) = spec.expected_rows {
        let actual = set.row_count();
        if actual != expected {
            return Verdict::fail(
                FailureCategory::RowCountMismatch,
                format!("Row count mismatch: expected {expected}, got {actual}."),
            );
        }
    }

    if let Some(ordering) = &spec.ordering {
        if let Some(verdict) = check_ordering(set, ordering) {
            return verdict;
        }
    }

    if let Some(predicate) = predicates.get(&spec.challenge_id) {
        if let Err(message) = predicate.check(&set.rows) {
            return Verdict::fail(FailureCategory::SemanticViolation, message);
        }
    }

    Verdict::pass()
}

fn check_columns(set: &ResultSet, expected: &[String]) -> Option<Verdict> {
    let missing: Vec<&str> = expected
        .iter()
        .filter(|col| !set.has_column(col))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Some(Verdict::fail(
            FailureCategory::MissingColumns,
            format!("Missing expected columns: {}", missing.join(", ")),
        ));
    }

    let extra: Vec<&str> = set
        .columns
        .iter()
        .filter(|col| !expected.contains(col))
        .map(String::as_str)
        .collect();
    if !extra.is_empty() {
        return Some(Verdict::fail(
            FailureCategory::ExtraColumns,
            format!(
                "Unexpected columns found: {}. Only include the required columns.",
                extra.join(", ")
            ),
        ));
    }

    None
}

fn check_ordering(set: &ResultSet, ordering: &OrderingRequirement) -> Option<Verdict> {
    let column = &ordering.column;
    let direction = ordering.direction.label();

    if !set.has_column(column) {
        return Some(Verdict::fail(
            FailureCategory::OrderingViolation,
            format!(
                "Results should be ordered by {column} in {direction} order, but {column} is not in the result."
            ),
        ));
    }

    for (i, pair) in set.rows.windows(2).enumerate() {
        let (Some(current), Some(next)) = (pair[0].get(column), pair[1].get(column)) else {
            continue;
        };
        let ord = current.sql_cmp(next);
        let violated = match ordering.direction {
            SortDirection::Ascending => ord.is_gt(),
            SortDirection::Descending => ord.is_lt(),
        };
        if violated {
            return Some(Verdict::fail(
                FailureCategory::OrderingViolation,
                format!(
                    "Results should be ordered by {column} in {direction} order (row {} has {current}, row {} has {next}).",
                    i + 1,
                    i + 2
                ),
            ));
        }
    }

    None
}
