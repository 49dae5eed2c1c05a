// Result Validator
// Classifies a QueryResult against a ChallengeSpec: shape checks first,
// semantic predicates last, first failure reported.

pub mod rules;
pub mod validator;
pub mod verdict;

pub use rules::{CompareOp, PredicateRegistry, RowCondition, SemanticRule};
pub use validator::{validate, ChallengeSpec, OrderingRequirement};
pub use verdict::{FailureCategory, Verdict};
