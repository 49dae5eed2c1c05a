use serde::Serialize;

/// Why a submission failed. Only the first failing check is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureCategory {
    ExecutionError,
    EmptyResult,
    MissingColumns,
    ExtraColumns,
    RowCountMismatch,
    OrderingViolation,
    SemanticViolation,
}

impl FailureCategory {
    /// Shape problems the learner can usually fix by trimming or widening the
    /// query are warnings; everything else is an error.
    pub fn severity(self) -> Severity {
        match self {
            FailureCategory::EmptyResult
            | FailureCategory::ExtraColumns
            | FailureCategory::RowCountMismatch => Severity::Warning,
            FailureCategory::ExecutionError
            | FailureCategory::MissingColumns
            | FailureCategory::OrderingViolation
            | FailureCategory::SemanticViolation => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FailureCategory>,
    pub severity: Severity,
    pub message: String,
}

pub const PASS_MESSAGE: &str =
    "Great job! Your query looks correct and returns the expected results.";

impl Verdict {
    pub fn pass() -> Self {
        Self {
            passed: true,
            category: None,
            severity: Severity::Success,
            message: PASS_MESSAGE.to_string(),
        }
    }

    pub fn fail(category: FailureCategory, message: impl Into<String>) -> Self {
        Self {
            passed: false,
            category: Some(category),
            severity: category.severity(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_has_no_category() {
        let v = Verdict::pass();
        assert!(v.passed);
        assert_eq!(v.category, None);
        assert_eq!(v.severity, Severity::Success);
    }

    #[test]
    fn test_fail_takes_category_severity() {
        let v = Verdict::fail(FailureCategory::EmptyResult, "nothing");
        assert!(!v.passed);
        assert_eq!(v.severity, Severity::Warning);
        let v = Verdict::fail(FailureCategory::MissingColumns, "salary");
        assert_eq!(v.severity, Severity::Error);
    }

    #[test]
    fn test_category_wire_names() {
        let json = serde_json::to_value(Verdict::fail(FailureCategory::RowCountMismatch, "x")).unwrap();
        assert_eq!(json["category"], "ROW_COUNT_MISMATCH");
        assert_eq!(json["severity"], "warning");
        assert!(serde_json::to_value(Verdict::pass()).unwrap().get("category").is_none());
    }
}
