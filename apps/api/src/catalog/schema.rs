use serde::Serialize;

use crate::grading::{ChallengeSpec, OrderingRequirement, SemanticRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    pub primary_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKey>,
}

impl ColumnSchema {
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable: false,
            primary_key: false,
            foreign_key: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn references(mut self, table: &str, column: &str) -> Self {
        self.foreign_key = Some(ForeignKey {
            table: table.to_string(),
            column: column.to_string(),
        });
        self
    }
}

/// Table as shown to the learner. May list a subset of the real columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(name: &str, columns: Vec<ColumnSchema>) -> Self {
        Self {
            name: name.to_string(),
            columns,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestCase {
    pub id: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<OrderingRequirement>,
    /// Answer key; never sent to clients.
    #[serde(skip_serializing)]
    pub semantic: Option<SemanticRule>,
}

impl TestCase {
    pub fn new(id: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            expected_columns: None,
            expected_rows: None,
            ordering: None,
            semantic: None,
        }
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.expected_columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn rows(mut self, rows: usize) -> Self {
        self.expected_rows = Some(rows);
        self
    }

    pub fn ordered(mut self, ordering: OrderingRequirement) -> Self {
        self.ordering = Some(ordering);
        self
    }

    pub fn semantic(mut self, rule: SemanticRule) -> Self {
        self.semantic = Some(rule);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SqlChallenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub test_cases: Vec<TestCase>,
    pub tables: Vec<TableSchema>,
}

impl SqlChallenge {
    /// The graded test case. The first one wins when several are authored.
    pub fn primary_test_case(&self) -> Option<&TestCase> {
        self.test_cases.first()
    }

    /// Shape requirements for the validator. A challenge without test cases
    /// accepts any non-empty result.
    pub fn spec(&self) -> ChallengeSpec {
        let mut spec = ChallengeSpec {
            challenge_id: self.id.clone(),
            ..Default::default()
        };
        if let Some(case) = self.primary_test_case() {
            spec.expected_columns = case.expected_columns.clone();
            spec.expected_rows = case.expected_rows;
            spec.ordering = case.ordering.clone();
        }
        spec
    }
}
