//! Semantic predicates: row-level and set-level checks that go beyond
//! result shape.
//!
//! Challenge content authors a declarative [`SemanticRule`] per test case.
//! The [`PredicateRegistry`] maps challenge ids to predicates and is the only
//! place the validator looks them up, so adding a challenge never means
//! touching validator code.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::{Row, ScalarValue};

/// How many offending row numbers a message lists before truncating.
const MAX_REPORTED_ROWS: usize = 5;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// A pure check over the full row set. `Err` carries the learner-facing
/// explanation of what failed.
pub trait SemanticPredicate: Send + Sync {
    fn check(&self, rows: &[Row]) -> Result<(), String>;
}

// ────────────────────────────────────────────────────────────────────────────
// Declarative rules
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    fn holds(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
        }
    }
}

/// `column <op> value`. A missing or NULL cell never satisfies a condition.
#[derive(Debug, Clone, PartialEq)]
pub struct RowCondition {
    pub column: String,
    pub op: CompareOp,
    pub value: ScalarValue,
}

impl RowCondition {
    pub fn new(column: &str, op: CompareOp, value: impl Into<ScalarValue>) -> Self {
        Self {
            column: column.to_string(),
            op,
            value: value.into(),
        }
    }

    fn holds(&self, row: &Row) -> bool {
        match row.get(&self.column) {
            None | Some(ScalarValue::Null) => false,
            Some(actual) => self.op.holds(actual.sql_cmp(&self.value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SemanticRule {
    /// Every returned row must satisfy all conditions.
    EveryRow {
        conditions: Vec<RowCondition>,
        guidance: String,
    },
    /// The multiset of values in `column` must equal `expected`, order-free.
    KeySet {
        column: String,
        expected: Vec<ScalarValue>,
        guidance: String,
    },
    /// `column` must take at least `min` distinct non-null values.
    DistinctAtLeast {
        column: String,
        min: usize,
        guidance: String,
    },
    /// All nested rules, reporting the first failure.
    AllOf(Vec<SemanticRule>),
}

impl SemanticRule {
    pub fn every_row(conditions: Vec<RowCondition>, guidance: &str) -> Self {
        SemanticRule::EveryRow {
            conditions,
            guidance: guidance.to_string(),
        }
    }

    pub fn key_set<V: Into<ScalarValue>>(
        column: &str,
        expected: impl IntoIterator<Item = V>,
        guidance: &str,
    ) -> Self {
        SemanticRule::KeySet {
            column: column.to_string(),
            expected: expected.into_iter().map(Into::into).collect(),
            guidance: guidance.to_string(),
        }
    }

    pub fn distinct_at_least(column: &str, min: usize, guidance: &str) -> Self {
        SemanticRule::DistinctAtLeast {
            column: column.to_string(),
            min,
            guidance: guidance.to_string(),
        }
    }
}

impl SemanticPredicate for SemanticRule {
    fn check(&self, rows: &[Row]) -> Result<(), String> {
        match self {
            SemanticRule::EveryRow {
                conditions,
                guidance,
            } => check_every_row(rows, conditions, guidance),
            SemanticRule::KeySet {
                column,
                expected,
                guidance,
            } => check_key_set(rows, column, expected, guidance),
            SemanticRule::DistinctAtLeast {
                column,
                min,
                guidance,
            } => check_distinct(rows, column, *min, guidance),
            SemanticRule::AllOf(rules) => rules.iter().try_for_each(|r| r.check(rows)),
        }
    }
}

fn check_every_row(rows: &[Row], conditions: &[RowCondition], guidance: &str) -> Result<(), String> {
    let failing: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !conditions.iter().all(|c| c.holds(row)))
        .map(|(i, _)| i + 1)
        .collect();

    if failing.is_empty() {
        return Ok(());
    }

    let noun = if failing.len() == 1 { "row" } else { "rows" };
    Err(format!(
        "Your query returned {} {noun} that don't meet the criteria (row {}). {guidance}",
        failing.len(),
        join_truncated(failing.iter().map(|n| n.to_string()).collect())
    ))
}

fn check_key_set(
    rows: &[Row],
    column: &str,
    expected: &[ScalarValue],
    guidance: &str,
) -> Result<(), String> {
    let mut actual = Vec::with_capacity(rows.len());
    for row in rows {
        match row.get(column) {
            Some(v) => actual.push(v.clone()),
            None => return Err(format!("Result must include the {column} column. {guidance}")),
        }
    }

    let mut expected = expected.to_vec();
    actual.sort_by(|a, b| a.sql_cmp(b));
    expected.sort_by(|a, b| a.sql_cmp(b));

    let same = actual.len() == expected.len()
        && actual
            .iter()
            .zip(&expected)
            .all(|(a, e)| a.sql_cmp(e) == Ordering::Equal);
    if same {
        return Ok(());
    }

    let missing = multiset_difference(&expected, &actual);
    let unexpected = multiset_difference(&actual, &expected);

    let mut details = Vec::new();
    if !missing.is_empty() {
        details.push(format!("missing {column} {}", join_values(&missing)));
    }
    if !unexpected.is_empty() {
        details.push(format!("unexpected {column} {}", join_values(&unexpected)));
    }

    Err(format!(
        "Expected {column} values {} but got {} ({}). {guidance}",
        join_values(&expected),
        join_values(&actual),
        details.join("; ")
    ))
}

fn check_distinct(rows: &[Row], column: &str, min: usize, guidance: &str) -> Result<(), String> {
    let mut values: Vec<&ScalarValue> = rows
        .iter()
        .filter_map(|r| r.get(column))
        .filter(|v| !v.is_null())
        .collect();
    values.sort_by(|a, b| a.sql_cmp(b));
    values.dedup_by(|a, b| a.sql_cmp(b) == Ordering::Equal);

    if values.len() >= min {
        Ok(())
    } else {
        Err(format!(
            "Expected at least {min} distinct {column} values, got {}. {guidance}",
            values.len()
        ))
    }
}

/// Elements of sorted `left` not matched one-for-one in sorted `right`.
fn multiset_difference(left: &[ScalarValue], right: &[ScalarValue]) -> Vec<ScalarValue> {
    let mut out = Vec::new();
    let mut j = 0;
    for value in left {
        while j < right.len() && right[j].sql_cmp(value) == Ordering::Less {
            j += 1;
        }
        if j < right.len() && right[j].sql_cmp(value) == Ordering::Equal {
            j += 1;
        } else {
            out.push(value.clone());
        }
    }
    out
}

fn join_values(values: &[ScalarValue]) -> String {
    if values.is_empty() {
        return "(none)".to_string();
    }
    join_truncated(values.iter().map(|v| v.to_string()).collect())
}

fn join_truncated(items: Vec<String>) -> String {
    if items.len() <= MAX_REPORTED_ROWS {
        return items.join(", ");
    }
    format!(
        "{}, … (+{} more)",
        items[..MAX_REPORTED_ROWS].join(", "),
        items.len() - MAX_REPORTED_ROWS
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

/// Challenge id → predicate. Built once at startup and shared read-only.
#[derive(Default, Clone)]
pub struct PredicateRegistry {
    predicates: HashMap<String, Arc<dyn SemanticPredicate>>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the predicate for `challenge_id`.
    pub fn register(&mut self, challenge_id: &str, predicate: Arc<dyn SemanticPredicate>) {
        self.predicates.insert(challenge_id.to_string(), predicate);
    }

    pub fn get(&self, challenge_id: &str) -> Option<&dyn SemanticPredicate> {
        self.predicates.get(challenge_id).map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(id: i64, dept: &str, salary: i64, hired: &str) -> Row {
        [
            ("employee_id", ScalarValue::Integer(id)),
            ("department", ScalarValue::from(dept)),
            ("salary", ScalarValue::Integer(salary)),
            ("hire_date", ScalarValue::from(hired)),
        ]
        .into_iter()
        .collect()
    }

    fn engineering_rule() -> SemanticRule {
        SemanticRule::every_row(
            vec![
                RowCondition::new("department", CompareOp::Eq, "Engineering"),
                RowCondition::new("salary", CompareOp::Gt, 100000_i64),
                RowCondition::new("hire_date", CompareOp::Gt, "2021-12-31"),
            ],
            "Filter on department, salary and hire date.",
        )
    }

    #[test]
    fn test_every_row_passes() {
        let rows = vec![
            employee(1, "Engineering", 120000, "2022-01-15"),
            employee(9, "Engineering", 115000, "2022-03-10"),
        ];
        assert!(engineering_rule().check(&rows).is_ok());
    }

    #[test]
    fn test_every_row_reports_failing_rows() {
        let rows = vec![
            employee(1, "Engineering", 120000, "2022-01-15"),
            employee(6, "Engineering", 130000, "2020-09-01"),
            employee(3, "Sales", 90000, "2020-11-10"),
        ];
        let msg = engineering_rule().check(&rows).unwrap_err();
        assert!(msg.contains("returned 2 rows"), "{msg}");
        assert!(msg.contains("row 2, 3"), "{msg}");
    }

    #[test]
    fn test_null_never_satisfies_condition() {
        let row: Row = [("salary", ScalarValue::Null)].into_iter().collect();
        assert!(!RowCondition::new("salary", CompareOp::Ne, 0_i64).holds(&row));
    }

    #[test]
    fn test_key_set_order_insensitive() {
        let rows = vec![
            employee(9, "Engineering", 1, "x"),
            employee(1, "Engineering", 1, "x"),
        ];
        let rule = SemanticRule::key_set("employee_id", [1_i64, 9], "");
        assert!(rule.check(&rows).is_ok());
    }

    #[test]
    fn test_key_set_lists_missing_and_unexpected() {
        let rows = vec![
            employee(1, "Engineering", 1, "x"),
            employee(6, "Engineering", 1, "x"),
        ];
        let rule = SemanticRule::key_set("employee_id", [1_i64, 2, 4], "");
        let msg = rule.check(&rows).unwrap_err();
        assert!(msg.contains("missing employee_id 2, 4"), "{msg}");
        assert!(msg.contains("unexpected employee_id 6"), "{msg}");
    }

    #[test]
    fn test_key_set_detects_duplicates() {
        let rows = vec![
            employee(1, "Engineering", 1, "x"),
            employee(1, "Engineering", 1, "x"),
        ];
        let rule = SemanticRule::key_set("employee_id", [1_i64], "");
        let msg = rule.check(&rows).unwrap_err();
        assert!(msg.contains("unexpected employee_id 1"), "{msg}");
    }

    #[test]
    fn test_key_set_requires_column() {
        let row: Row = [("name", ScalarValue::from("a"))].into_iter().collect();
        let rule = SemanticRule::key_set("customer_id", [1_i64], "");
        assert!(rule.check(&[row]).unwrap_err().contains("customer_id column"));
    }

    #[test]
    fn test_distinct_at_least() {
        let rows: Vec<Row> = ["Electronics", "Furniture", "Electronics"]
            .into_iter()
            .map(|c| [("category", ScalarValue::from(c))].into_iter().collect())
            .collect();
        assert!(SemanticRule::distinct_at_least("category", 2, "").check(&rows).is_ok());
        let msg = SemanticRule::distinct_at_least("category", 3, "")
            .check(&rows)
            .unwrap_err();
        assert!(msg.contains("got 2"), "{msg}");
    }

    #[test]
    fn test_all_of_reports_first_failure() {
        let rows = vec![employee(6, "Engineering", 130000, "2020-09-01")];
        let rule = SemanticRule::AllOf(vec![
            engineering_rule(),
            SemanticRule::key_set("employee_id", [1_i64], "keys"),
        ]);
        let msg = rule.check(&rows).unwrap_err();
        assert!(msg.contains("don't meet the criteria"), "{msg}");
    }

    #[test]
    fn test_truncates_long_lists() {
        let items: Vec<String> = (1..=8).map(|n| n.to_string()).collect();
        assert_eq!(join_truncated(items), "1, 2, 3, 4, 5, … (+3 more)");
    }

    struct AlwaysFails;

    impl SemanticPredicate for AlwaysFails {
        fn check(&self, _rows: &[Row]) -> Result<(), String> {
            Err("never right".to_string())
        }
    }

    #[test]
    fn test_registry_lookup_and_replace() {
        let mut registry = PredicateRegistry::new();
        assert!(registry.is_empty());
        registry.register("challenge-x", Arc::new(SemanticRule::AllOf(vec![])));
        assert!(registry.get("challenge-x").unwrap().check(&[]).is_ok());

        registry.register("challenge-x", Arc::new(AlwaysFails));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("challenge-x").unwrap().check(&[]).is_err());
        assert!(registry.get("challenge-y").is_none());
    }
}
