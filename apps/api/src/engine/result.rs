use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::value::ScalarValue;

/// One result row keyed by column name. A column that is present with a
/// `NULL` value is distinct from a column that is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    values: BTreeMap<String, ScalarValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: ScalarValue) {
        self.values.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&ScalarValue> {
        self.values.get(column)
    }
}

impl<K: Into<String>> FromIterator<(K, ScalarValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, ScalarValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Rectangular output of a successful statement. `columns` keeps the order
/// the database reported; `rows` keeps the order the database produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionErrorKind {
    Syntax,
    UnknownTable,
    UnknownColumn,
    Constraint,
    Timeout,
    Other,
}

impl ExecutionErrorKind {
    /// Coarse classification of a SQLite diagnostic.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("syntax error") || lower.contains("incomplete input") {
            ExecutionErrorKind::Syntax
        } else if lower.contains("no such table") {
            ExecutionErrorKind::UnknownTable
        } else if lower.contains("no such column") || lower.contains("ambiguous column") {
            ExecutionErrorKind::UnknownColumn
        } else if lower.contains("constraint failed") {
            ExecutionErrorKind::Constraint
        } else {
            ExecutionErrorKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionFailure {
    pub kind: ExecutionErrorKind,
    /// Database diagnostic, verbatim.
    pub message: String,
}

impl ExecutionFailure {
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: ExecutionErrorKind::classify(&message),
            message,
        }
    }

    pub fn timeout(limit_ms: u64) -> Self {
        Self {
            kind: ExecutionErrorKind::Timeout,
            message: format!("Query exceeded the {limit_ms} ms execution limit"),
        }
    }
}

/// Output of [`DatabaseHandle::execute`](crate::engine::DatabaseHandle::execute).
/// Created per execution and handed straight to the validator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryResult {
    Success(ResultSet),
    Failure(ExecutionFailure),
}

impl QueryResult {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryResult::Success(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            QueryResult::Failure(f) => Some(&f.message),
            QueryResult::Success(_) => None,
        }
    }
}
