use serde::{Deserialize, Serialize};

/// Outcome of a multi-step mutation against a store without cross-table
/// transactions. The primary record is committed in both variants; a
/// partially committed outcome carries the dependent-step failures as
/// warnings instead of pretending the whole operation was atomic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum SagaOutcome<T> {
    Committed { value: T },
    PartiallyCommitted { value: T, warnings: Vec<String> },
}

impl<T> SagaOutcome<T> {
    pub fn from_warnings(value: T, warnings: Vec<String>) -> Self {
        if warnings.is_empty() {
            SagaOutcome::Committed { value }
        } else {
            SagaOutcome::PartiallyCommitted { value, warnings }
        }
    }

    pub fn value(&self) -> &T {
        match self {
            SagaOutcome::Committed { value } => value,
            SagaOutcome::PartiallyCommitted { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            SagaOutcome::Committed { value } => value,
            SagaOutcome::PartiallyCommitted { value, .. } => value,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            SagaOutcome::Committed { .. } => &[],
            SagaOutcome::PartiallyCommitted { warnings, .. } => warnings,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, SagaOutcome::PartiallyCommitted { .. })
    }
}
