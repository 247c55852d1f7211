//! Shared domain enums

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// LoanStatus
// ---------------------------------------------------------------------------

/// Loan status as reported by the backend.
///
/// The backend sends a free-form string. The four known values are matched
/// exactly (case-sensitive); anything else is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoanStatus {
    Borrowed,
    Renewed,
    Overdue,
    Returned,
    Other(String),
}

impl LoanStatus {
    pub fn as_str(&self) -> &str {
        match self {
            LoanStatus::Borrowed => "borrowed",
            LoanStatus::Renewed => "renewed",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Returned => "returned",
            LoanStatus::Other(s) => s,
        }
    }

    /// Borrowed, renewed or overdue: the book has not come back yet.
    pub fn is_active_borrow(&self) -> bool {
        matches!(
            self,
            LoanStatus::Borrowed | LoanStatus::Renewed | LoanStatus::Overdue
        )
    }
}

impl From<&str> for LoanStatus {
    fn from(s: &str) -> Self {
        match s {
            "borrowed" => LoanStatus::Borrowed,
            "renewed" => LoanStatus::Renewed,
            "overdue" => LoanStatus::Overdue,
            "returned" => LoanStatus::Returned,
            other => LoanStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for LoanStatus {
    fn from(s: String) -> Self {
        match LoanStatus::from(s.as_str()) {
            LoanStatus::Other(_) => LoanStatus::Other(s),
            known => known,
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for LoanStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LoanStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(LoanStatus::from)
    }
}

// ---------------------------------------------------------------------------
// DisplayCategory
// ---------------------------------------------------------------------------

/// User-facing classification of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisplayCategory {
    Active,
    Overdue,
    Returned,
    Unknown,
}

impl std::fmt::Display for DisplayCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DisplayCategory::Active => "Active",
            DisplayCategory::Overdue => "Overdue",
            DisplayCategory::Returned => "Returned",
            DisplayCategory::Unknown => "Unknown",
        };
        write!(f, "{}", label)
    }
}
