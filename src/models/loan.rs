//! Loan (borrow) model and related types

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use serde_with::{serde_as, DefaultOnError};
use utoipa::ToSchema;

use super::enums::{DisplayCategory, LoanStatus};

/// Naive timestamp layouts accepted in date fields, read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Book identifier, textual or numeric depending on the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum BookId {
    Number(i64),
    Text(String),
}

impl BookId {
    /// Numbers that do not fit an `i64` (fractional, too large) are kept as text.
    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => Some(
                n.as_i64()
                    .map(BookId::Number)
                    .unwrap_or_else(|| BookId::Text(n.to_string())),
            ),
            Value::String(s) => Some(BookId::Text(s)),
            Value::Bool(b) => Some(BookId::Text(b.to_string())),
            other => {
                tracing::warn!("Ignoring non-scalar book id: {}", other);
                None
            }
        }
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookId::Number(n) => write!(f, "{}", n),
            BookId::Text(s) => write!(f, "{}", s),
        }
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<BookId>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(BookId::from_json))
}

/// Keeps any non-null value as text; non-strings then fail to parse as dates.
fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Integers and integer strings; anything else counts as absent.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    let count = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(_) => None,
    };
    if count.is_none() {
        tracing::warn!("Ignoring malformed renew_count");
    }
    Ok(count)
}

/// Raw borrow record, as received from the backend or read from cached history.
///
/// Every field is optional and a malformed value decodes as absent (or, for
/// dates, as an unparseable string) instead of rejecting the record. The
/// camelCase aliases let a serialized [`NormalizedLoan`] be read back.
#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BorrowRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    #[schema(value_type = Option<String>)]
    pub id: Option<BookId>,
    #[serde(default, alias = "bookId", deserialize_with = "lenient_id")]
    #[schema(value_type = Option<String>)]
    pub book_id: Option<BookId>,
    #[serde(default, alias = "borrowId", deserialize_with = "lenient_id")]
    #[schema(value_type = Option<String>)]
    pub borrow_id: Option<BookId>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub title: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub author: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub cover: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "borrowed")]
    pub status: Option<LoanStatus>,
    #[serde(default, alias = "renewCount", deserialize_with = "lenient_count")]
    pub renew_count: Option<i32>,
    #[serde(default, alias = "borrowDate", deserialize_with = "lenient_date")]
    pub borrow_date: Option<String>,
    #[serde(default, alias = "dueDate", deserialize_with = "lenient_date")]
    pub due_date: Option<String>,
    #[serde(default, alias = "returnDate", deserialize_with = "lenient_date")]
    pub return_date: Option<String>,
}

/// A parsed date field.
///
/// A string that could not be parsed is kept as `Invalid`; every
/// computation against it yields no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanDate {
    Valid(DateTime<Utc>),
    Invalid(String),
}

impl LoanDate {
    /// Parse an optional raw date. Absent and empty strings give `None`.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let raw = raw.filter(|s| !s.is_empty())?;
        match parse_instant(raw) {
            Some(instant) => Some(LoanDate::Valid(instant)),
            None => {
                tracing::warn!("Unparseable loan date: {:?}", raw);
                Some(LoanDate::Invalid(raw.to_string()))
            }
        }
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            LoanDate::Valid(instant) => Some(*instant),
            LoanDate::Invalid(_) => None,
        }
    }
}

impl Serialize for LoanDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LoanDate::Valid(instant) => {
                serializer.serialize_str(&instant.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            LoanDate::Invalid(raw) => serializer.serialize_str(raw),
        }
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Borrow record with parsed dates and defaults applied
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedLoan {
    #[schema(value_type = Option<String>)]
    pub id: Option<BookId>,
    #[schema(value_type = Option<String>)]
    pub borrow_id: Option<BookId>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover: Option<String>,
    #[schema(value_type = Option<String>)]
    pub status: Option<LoanStatus>,
    pub renew_count: i32,
    #[schema(value_type = Option<String>)]
    pub borrow_date: Option<LoanDate>,
    #[schema(value_type = Option<String>)]
    pub due_date: Option<LoanDate>,
    #[schema(value_type = Option<String>)]
    pub return_date: Option<LoanDate>,
}

impl NormalizedLoan {
    pub fn status_is(&self, status: &LoanStatus) -> bool {
        self.status.as_ref() == Some(status)
    }

    pub fn is_active_borrow(&self) -> bool {
        self.status
            .as_ref()
            .map(LoanStatus::is_active_borrow)
            .unwrap_or(false)
    }

    /// Due date as an instant, if present and valid
    pub fn due_instant(&self) -> Option<DateTime<Utc>> {
        self.due_date.as_ref().and_then(LoanDate::instant)
    }

    pub fn return_instant(&self) -> Option<DateTime<Utc>> {
        self.return_date.as_ref().and_then(LoanDate::instant)
    }
}

impl From<&BorrowRecord> for NormalizedLoan {
    fn from(raw: &BorrowRecord) -> Self {
        Self {
            id: raw.id.clone().or_else(|| raw.book_id.clone()),
            borrow_id: raw.borrow_id.clone(),
            title: raw.title.clone(),
            author: raw.author.clone(),
            cover: raw.cover.clone(),
            status: raw.status.clone(),
            renew_count: raw.renew_count.unwrap_or(0),
            borrow_date: LoanDate::parse(raw.borrow_date.as_deref()),
            due_date: LoanDate::parse(raw.due_date.as_deref()),
            return_date: LoanDate::parse(raw.return_date.as_deref()),
        }
    }
}

/// Normalize a raw borrow record. Never fails.
pub fn normalize(raw: &BorrowRecord) -> NormalizedLoan {
    NormalizedLoan::from(raw)
}

/// Display label for a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct LoanDisplay {
    pub category: DisplayCategory,
    /// Days remaining (active) or days overdue (overdue)
    pub days: Option<i64>,
}

/// Time-dependent facts about a loan at a given instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanAssessment {
    pub days_left: Option<i64>,
    pub is_overdue: bool,
    pub is_active_borrow: bool,
    pub can_extend: bool,
    pub display: LoanDisplay,
}

/// Loan as handed to the presentation layer
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    #[serde(flatten)]
    pub loan: NormalizedLoan,
    #[serde(flatten)]
    pub assessment: LoanAssessment,
    /// Cover image, or the configured default
    pub cover_url: String,
}

/// Per-category totals for a shelf
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ShelfCounts {
    pub active: usize,
    pub overdue: usize,
    pub extendable: usize,
    pub returned: usize,
    pub unknown: usize,
}

/// A user's loans split into current borrows and history
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Shelf {
    pub current: Vec<LoanView>,
    pub history: Vec<LoanView>,
    pub counts: ShelfCounts,
}
