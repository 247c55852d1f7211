//! Loan presentation service

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::{
    config::{AssetsConfig, LoanPolicy},
    models::{
        enums::{DisplayCategory, LoanStatus},
        loan::{normalize, BorrowRecord, LoanView, Shelf, ShelfCounts},
    },
};

use super::evaluator::LoanEvaluator;

#[derive(Clone)]
pub struct LoansService {
    evaluator: LoanEvaluator,
    assets: AssetsConfig,
}

impl LoansService {
    pub fn new(policy: LoanPolicy, assets: AssetsConfig) -> Self {
        Self {
            evaluator: LoanEvaluator::new(policy),
            assets,
        }
    }

    pub fn evaluator(&self) -> &LoanEvaluator {
        &self.evaluator
    }

    pub fn assets(&self) -> &AssetsConfig {
        &self.assets
    }

    /// Normalize and assess a single record
    pub fn view(&self, record: &BorrowRecord, now: DateTime<Utc>) -> LoanView {
        let loan = normalize(record);
        let assessment = self.evaluator.assess(&loan, now);
        let cover_url = loan
            .cover
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.assets.default_cover_url.clone());

        LoanView {
            loan,
            assessment,
            cover_url,
        }
    }

    /// Views for a batch of records, in input order
    pub fn evaluate(&self, records: &[BorrowRecord], now: DateTime<Utc>) -> Vec<LoanView> {
        records.iter().map(|r| self.view(r, now)).collect()
    }

    /// Split records into current borrows and history
    pub fn shelf(&self, records: &[BorrowRecord], now: DateTime<Utc>) -> Shelf {
        let mut current = Vec::new();
        let mut history = Vec::new();
        let mut counts = ShelfCounts::default();

        for view in self.evaluate(records, now) {
            if view.loan.status_is(&LoanStatus::Returned) {
                counts.returned += 1;
                history.push(view);
            } else if view.assessment.is_active_borrow {
                counts.active += 1;
                if view.assessment.display.category == DisplayCategory::Overdue {
                    counts.overdue += 1;
                }
                if view.assessment.can_extend {
                    counts.extendable += 1;
                }
                current.push(view);
            } else {
                counts.unknown += 1;
            }
        }

        // Soonest due first; no usable due date last
        current.sort_by(|a, b| {
            none_last(a.loan.due_instant(), b.loan.due_instant(), |x, y| x.cmp(&y))
        });
        // Most recently returned first
        history.sort_by(|a, b| {
            none_last(a.loan.return_instant(), b.loan.return_instant(), |x, y| y.cmp(&x))
        });

        tracing::debug!(
            active = counts.active,
            overdue = counts.overdue,
            returned = counts.returned,
            unknown = counts.unknown,
            "Built shelf"
        );

        Shelf {
            current,
            history,
            counts,
        }
    }
}

fn none_last<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::loan::BookId;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap()
    }

    fn service() -> LoansService {
        LoansService::new(LoanPolicy::default(), AssetsConfig::default())
    }

    fn records(value: serde_json::Value) -> Vec<BorrowRecord> {
        serde_json::from_value(value).unwrap()
    }

    fn ids(views: &[LoanView]) -> Vec<BookId> {
        views.iter().filter_map(|v| v.loan.id.clone()).collect()
    }

    #[test]
    fn test_cover_falls_back_to_default() {
        let service = service();
        let batch = records(json!([
            { "id": 1, "cover": "https://covers.example/1.jpg" },
            { "id": 2, "cover": "" },
            { "id": 3 }
        ]));

        let views = service.evaluate(&batch, now());
        assert_eq!(views[0].cover_url, "https://covers.example/1.jpg");
        assert_eq!(views[1].cover_url, AssetsConfig::default().default_cover_url);
        assert_eq!(views[2].cover_url, AssetsConfig::default().default_cover_url);
        assert_eq!(views[1].loan.cover, Some(String::new()));
    }

    #[test]
    fn test_shelf_split_and_order() {
        let batch = records(json!([
            { "id": 1, "status": "borrowed", "due_date": "2024-06-20" },
            { "id": 2, "status": "returned", "due_date": "2024-05-01", "return_date": "2024-04-28" },
            { "id": 3, "status": "overdue", "due_date": "2024-06-07" },
            { "id": 4, "status": "renewed", "renew_count": 1 },
            { "id": 5, "status": "returned", "return_date": "2024-06-01" },
            { "id": 6, "status": "lost", "due_date": "2024-06-01" },
            { "id": 7, "status": "borrowed", "due_date": "2024-06-12" }
        ]));

        let shelf = service().shelf(&batch, now());
        assert_eq!(
            ids(&shelf.current),
            vec![BookId::Number(3), BookId::Number(7), BookId::Number(1), BookId::Number(4)]
        );
        assert_eq!(ids(&shelf.history), vec![BookId::Number(5), BookId::Number(2)]);
        assert_eq!(
            shelf.counts,
            ShelfCounts {
                active: 4,
                overdue: 1,
                extendable: 2,
                returned: 2,
                unknown: 1,
            }
        );
    }
}
