//! Data models for Shelfmark

pub mod enums;
pub mod loan;

// Re-export commonly used types
pub use enums::{DisplayCategory, LoanStatus};
pub use loan::{normalize, BookId, BorrowRecord, LoanAssessment, LoanView, NormalizedLoan, Shelf};
