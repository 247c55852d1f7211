//! Loan lifecycle evaluation
//!
//! Pure computations over a [`NormalizedLoan`] and an evaluation instant:
//! remaining days, renewal eligibility and display status. Results depend on
//! the instant, so they are recomputed on every read and never stored.

use chrono::{DateTime, Utc};

use crate::{
    config::LoanPolicy,
    models::{
        enums::{DisplayCategory, LoanStatus},
        loan::{LoanAssessment, LoanDisplay, NormalizedLoan},
    },
};

const DAY_MS: i64 = 86_400_000;

/// Whole days from `now` until `due`, rounded up.
///
/// A due date exactly at `now` gives 0; one millisecond past it also gives 0.
pub fn days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (due - now).num_milliseconds();
    let days = ms.div_euclid(DAY_MS);
    if ms.rem_euclid(DAY_MS) != 0 {
        days + 1
    } else {
        days
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoanEvaluator {
    policy: LoanPolicy,
}

impl LoanEvaluator {
    pub fn new(policy: LoanPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    /// Days until the loan is due; negative once overdue.
    ///
    /// `None` when the due date is missing or unparseable.
    pub fn days_left(&self, loan: &NormalizedLoan, now: DateTime<Utc>) -> Option<i64> {
        loan.due_instant().map(|due| days_until(due, now))
    }

    pub fn is_overdue(&self, loan: &NormalizedLoan, now: DateTime<Utc>) -> bool {
        self.days_left(loan, now).map(|d| d < 0).unwrap_or(false)
    }

    /// Whether the loan has used up its renewals
    pub fn is_renewed(&self, loan: &NormalizedLoan) -> bool {
        loan.status_is(&LoanStatus::Renewed) || loan.renew_count >= self.policy.max_renewals
    }

    /// Whether the loan may be renewed at `now`.
    ///
    /// Overdue loans stay eligible however late they are.
    pub fn can_extend(&self, loan: &NormalizedLoan, now: DateTime<Utc>) -> bool {
        if loan.due_date.is_none() || loan.status_is(&LoanStatus::Returned) {
            return false;
        }
        if self.is_renewed(loan) {
            return false;
        }

        match self.days_left(loan, now) {
            Some(days) => days <= self.policy.renewal_window_days,
            None => false,
        }
    }

    /// Derive the user-facing status.
    ///
    /// Returned wins over overdue; an unrecognized status falls through to
    /// `Unknown` unless the due date has passed.
    pub fn display_status(&self, loan: &NormalizedLoan, now: DateTime<Utc>) -> LoanDisplay {
        let days_left = self.days_left(loan, now);

        if loan.status_is(&LoanStatus::Returned) {
            return LoanDisplay {
                category: DisplayCategory::Returned,
                days: None,
            };
        }

        match days_left {
            Some(days) if days < 0 => LoanDisplay {
                category: DisplayCategory::Overdue,
                days: Some(days.abs()),
            },
            _ if loan.is_active_borrow() => LoanDisplay {
                category: DisplayCategory::Active,
                days: days_left,
            },
            _ => LoanDisplay {
                category: DisplayCategory::Unknown,
                days: None,
            },
        }
    }

    /// All time-dependent facts about the loan at `now`
    pub fn assess(&self, loan: &NormalizedLoan, now: DateTime<Utc>) -> LoanAssessment {
        let days_left = self.days_left(loan, now);
        let assessment = LoanAssessment {
            days_left,
            is_overdue: days_left.map(|d| d < 0).unwrap_or(false),
            is_active_borrow: loan.is_active_borrow(),
            can_extend: self.can_extend(loan, now),
            display: self.display_status(loan, now),
        };

        tracing::debug!(
            id = ?loan.id,
            category = %assessment.display.category,
            days_left = ?assessment.days_left,
            can_extend = assessment.can_extend,
            "Assessed loan"
        );

        assessment
    }

    pub fn can_extend_now(&self, loan: &NormalizedLoan) -> bool {
        self.can_extend(loan, Utc::now())
    }

    pub fn assess_now(&self, loan: &NormalizedLoan) -> LoanAssessment {
        self.assess(loan, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::loan::{normalize, BorrowRecord};
    use chrono::{Duration, SecondsFormat, TimeZone};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 9, 30, 0).unwrap()
    }

    fn iso(instant: DateTime<Utc>) -> String {
        instant.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn loan(value: serde_json::Value) -> NormalizedLoan {
        let record: BorrowRecord = serde_json::from_value(value).unwrap();
        normalize(&record)
    }

    fn due_in(status: &str, offset: Duration, renew_count: i32) -> NormalizedLoan {
        loan(json!({
            "id": 1,
            "status": status,
            "due_date": iso(now() + offset),
            "renew_count": renew_count
        }))
    }

    #[test]
    fn test_days_until_rounds_up() {
        assert_eq!(days_until(now(), now()), 0);
        assert_eq!(days_until(now() + Duration::hours(1), now()), 1);
        assert_eq!(days_until(now() + Duration::days(2), now()), 2);
        assert_eq!(days_until(now() - Duration::milliseconds(1), now()), 0);
        assert_eq!(days_until(now() - Duration::hours(25), now()), -1);
        assert_eq!(days_until(now() - Duration::days(3), now()), -3);
    }

    #[test]
    fn test_extend_window() {
        let evaluator = LoanEvaluator::default();
        for n in 0..=10 {
            let l = due_in("borrowed", Duration::days(n), 0);
            assert_eq!(evaluator.can_extend(&l, now()), n <= 3, "due in {} days", n);
        }
    }

    #[test]
    fn test_returned_never_extends() {
        let evaluator = LoanEvaluator::default();
        for n in [-20, -1, 0, 2, 30] {
            let l = due_in("returned", Duration::days(n), 0);
            assert!(!evaluator.can_extend(&l, now()));
        }
    }

    #[test]
    fn test_renewed_never_extends() {
        let evaluator = LoanEvaluator::default();
        assert!(!evaluator.can_extend(&due_in("renewed", Duration::days(1), 0), now()));
        assert!(!evaluator.can_extend(&due_in("overdue", Duration::days(-4), 1), now()));
        assert!(!evaluator.can_extend(&due_in("borrowed", Duration::days(2), 1), now()));
    }

    #[test]
    fn test_missing_or_invalid_due_date() {
        let evaluator = LoanEvaluator::default();

        let l = loan(json!({ "id": 1, "status": "borrowed" }));
        assert_eq!(evaluator.days_left(&l, now()), None);
        assert!(!evaluator.can_extend(&l, now()));
        assert!(!evaluator.is_overdue(&l, now()));
        assert_eq!(
            evaluator.display_status(&l, now()),
            LoanDisplay { category: DisplayCategory::Active, days: None }
        );

        let l = loan(json!({ "id": 1, "status": "borrowed", "due_date": "soon" }));
        assert_eq!(evaluator.days_left(&l, now()), None);
        assert!(!evaluator.can_extend(&l, now()));
    }

    #[test]
    fn test_due_exactly_now() {
        let evaluator = LoanEvaluator::default();
        let a = evaluator.assess(&due_in("borrowed", Duration::zero(), 0), now());
        assert_eq!(a.days_left, Some(0));
        assert!(!a.is_overdue);
        assert_eq!(a.display.category, DisplayCategory::Active);
        assert!(a.can_extend);
    }

    #[test]
    fn test_scenario_due_in_ten_days() {
        let a = LoanEvaluator::default().assess(&due_in("borrowed", Duration::days(10), 0), now());
        assert_eq!(a.days_left, Some(10));
        assert_eq!(a.display, LoanDisplay { category: DisplayCategory::Active, days: Some(10) });
        assert!(!a.can_extend);
    }

    #[test]
    fn test_scenario_due_in_two_days() {
        let a = LoanEvaluator::default().assess(&due_in("borrowed", Duration::days(2), 0), now());
        assert_eq!(a.days_left, Some(2));
        assert_eq!(a.display.category, DisplayCategory::Active);
        assert!(a.can_extend);
    }

    #[test]
    fn test_scenario_overdue() {
        let a = LoanEvaluator::default().assess(&due_in("overdue", Duration::days(-3), 0), now());
        assert_eq!(a.days_left, Some(-3));
        assert!(a.is_overdue);
        assert_eq!(a.display, LoanDisplay { category: DisplayCategory::Overdue, days: Some(3) });
        assert!(a.can_extend);
    }

    #[test]
    fn test_scenario_renewed() {
        let a = LoanEvaluator::default().assess(&due_in("renewed", Duration::days(1), 1), now());
        assert_eq!(a.display.category, DisplayCategory::Active);
        assert!(!a.can_extend);
    }

    #[test]
    fn test_scenario_returned_past_due() {
        let l = loan(json!({ "id": 1, "status": "returned", "due_date": iso(now() - Duration::days(5)) }));
        let a = LoanEvaluator::default().assess(&l, now());
        assert_eq!(a.display.category, DisplayCategory::Returned);
        assert!(!a.is_active_borrow);
        assert!(!a.can_extend);
    }

    #[test]
    fn test_stale_status_shows_overdue() {
        let a = LoanEvaluator::default().assess(&due_in("borrowed", Duration::days(-1), 0), now());
        assert_eq!(a.display, LoanDisplay { category: DisplayCategory::Overdue, days: Some(1) });
    }

    #[test]
    fn test_unknown_status() {
        let evaluator = LoanEvaluator::default();
        let l = due_in("lost", Duration::days(4), 0);
        assert_eq!(evaluator.display_status(&l, now()).category, DisplayCategory::Unknown);

        let l = loan(json!({ "id": 1 }));
        assert_eq!(evaluator.display_status(&l, now()).category, DisplayCategory::Unknown);

        let l = due_in("lost", Duration::days(-4), 0);
        assert_eq!(evaluator.display_status(&l, now()).category, DisplayCategory::Overdue);
    }

    #[test]
    fn test_custom_policy() {
        let evaluator = LoanEvaluator::new(LoanPolicy {
            renewal_window_days: 7,
            max_renewals: 2,
        });
        assert!(evaluator.can_extend(&due_in("borrowed", Duration::days(6), 1), now()));
        assert!(!evaluator.can_extend(&due_in("borrowed", Duration::days(6), 2), now()));
        assert!(!evaluator.can_extend(&due_in("borrowed", Duration::days(8), 0), now()));
    }

    #[test]
    fn test_wall_clock_variants_match_explicit_now() {
        let evaluator = LoanEvaluator::default();
        let due = |days| {
            loan(json!({
                "id": 1,
                "status": "borrowed",
                "due_date": iso(Utc::now() + Duration::days(days) - Duration::hours(12))
            }))
        };

        let soon = due(2);
        assert!(evaluator.can_extend_now(&soon));
        assert_eq!(evaluator.assess_now(&soon), evaluator.assess(&soon, Utc::now()));
        assert_eq!(evaluator.assess_now(&soon).days_left, Some(2));

        let later = due(10);
        assert!(!evaluator.can_extend_now(&later));
        assert_eq!(evaluator.assess_now(&later).display.days, Some(10));
    }

    #[test]
    fn test_later_now_changes_days_not_identity() {
        let evaluator = LoanEvaluator::default();
        let l = due_in("borrowed", Duration::days(2), 0);
        let later = now() + Duration::days(5);
        assert_eq!(evaluator.days_left(&l, now()), Some(2));
        assert_eq!(evaluator.days_left(&l, later), Some(-3));
        assert!(evaluator.is_overdue(&l, later));
    }
}
