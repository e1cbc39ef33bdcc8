//! Circulation rules
//!
//! Pure checks applied before any loan state change is persisted: the
//! due-date window and the borrower eligibility limits.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::error::ErrorCode;
use crate::models::book_instance::BookInstance;

/// Maximum number of copies a borrower may hold at once
pub const MAX_ACTIVE_LOANS: usize = 3;

/// Borrowing stops once more than this many of the borrower's loans are overdue
pub const MAX_OVERDUE_LOANS: usize = 1;

/// Width of the allowed due-date window, counted from today
pub const LOAN_WINDOW_WEEKS: i64 = 4;

/// Loan length proposed when the caller does not supply a due date
pub const DEFAULT_LOAN_WEEKS: i64 = 3;

/// A circulation rule that refused an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoanRuleViolation {
    #[error("Invalid date: due date is in the past")]
    DateInPast,
    #[error("Invalid date: due date is more than 4 weeks ahead")]
    DateTooFarFuture,
    #[error("Copy is not available for loan")]
    InstanceUnavailable,
    #[error("Copy is not currently on loan")]
    InstanceNotBorrowed,
    #[error("Borrower already has 3 copies on loan")]
    BorrowLimitExceeded,
    #[error("Borrower has more than 1 overdue copy")]
    OverdueLimitExceeded,
}

impl LoanRuleViolation {
    /// Stable API error code for this violation
    pub fn code(&self) -> ErrorCode {
        match self {
            LoanRuleViolation::DateInPast => ErrorCode::DateInPast,
            LoanRuleViolation::DateTooFarFuture => ErrorCode::DateTooFarFuture,
            LoanRuleViolation::InstanceUnavailable => ErrorCode::InstanceUnavailable,
            LoanRuleViolation::InstanceNotBorrowed => ErrorCode::InstanceNotBorrowed,
            LoanRuleViolation::BorrowLimitExceeded => ErrorCode::BorrowLimitExceeded,
            LoanRuleViolation::OverdueLimitExceeded => ErrorCode::OverdueLimitExceeded,
        }
    }

    /// Form field the violation concerns, when it concerns a single field
    pub fn field(&self) -> Option<&'static str> {
        match self {
            LoanRuleViolation::DateInPast | LoanRuleViolation::DateTooFarFuture => {
                Some("due_back")
            }
            _ => None,
        }
    }
}

/// Snapshot of one outstanding loan, as much of it as the rules need
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveLoan {
    pub due_back: Option<NaiveDate>,
}

impl ActiveLoan {
    /// Whether the scheduled return date has passed. A loan due today is
    /// not yet overdue.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_back.map(|d| d < today).unwrap_or(false)
    }
}

impl From<&BookInstance> for ActiveLoan {
    fn from(instance: &BookInstance) -> Self {
        Self {
            due_back: instance.due_back,
        }
    }
}

/// Latest due date accepted as of `today` (inclusive)
pub fn latest_due_date(today: NaiveDate) -> NaiveDate {
    today + Duration::weeks(LOAN_WINDOW_WEEKS)
}

/// Due date proposed for loans and renewals when none is supplied
pub fn default_due_date(today: NaiveDate) -> NaiveDate {
    today + Duration::weeks(DEFAULT_LOAN_WEEKS)
}

/// Check a proposed due date against the allowed window and return it.
///
/// Both bounds are inclusive: `today` itself and exactly four weeks out
/// are accepted.
pub fn validate_due_date(
    due_back: NaiveDate,
    today: NaiveDate,
) -> Result<NaiveDate, LoanRuleViolation> {
    if due_back < today {
        return Err(LoanRuleViolation::DateInPast);
    }
    if due_back > latest_due_date(today) {
        return Err(LoanRuleViolation::DateTooFarFuture);
    }
    Ok(due_back)
}

/// Check the copy can be lent out
pub fn validate_borrow_precondition(instance: &BookInstance) -> Result<(), LoanRuleViolation> {
    if instance.status.is_available() {
        Ok(())
    } else {
        Err(LoanRuleViolation::InstanceUnavailable)
    }
}

/// Check the copy is actually out on loan
pub fn validate_return_precondition(instance: &BookInstance) -> Result<(), LoanRuleViolation> {
    if instance.status.is_borrowed() {
        Ok(())
    } else {
        Err(LoanRuleViolation::InstanceNotBorrowed)
    }
}

/// Decide whether a borrower may take another copy right now.
///
/// The decision is made over the loan records supplied by the caller;
/// nothing is read from storage here. The loan-count limit is checked
/// before the overdue limit.
pub fn check_eligibility(
    loans: &[ActiveLoan],
    today: NaiveDate,
) -> Result<(), LoanRuleViolation> {
    if loans.len() >= MAX_ACTIVE_LOANS {
        return Err(LoanRuleViolation::BorrowLimitExceeded);
    }

    let overdue = loans.iter().filter(|l| l.is_overdue(today)).count();
    if overdue > MAX_OVERDUE_LOANS {
        return Err(LoanRuleViolation::OverdueLimitExceeded);
    }

    Ok(())
}

/// Boolean view of [`check_eligibility`], for profile display
pub fn can_borrow(loans: &[ActiveLoan], today: NaiveDate) -> bool {
    check_eligibility(loans, today).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn loan_due(due_back: NaiveDate) -> ActiveLoan {
        ActiveLoan {
            due_back: Some(due_back),
        }
    }

    #[test]
    fn test_due_date_window_is_inclusive() {
        let today = today();

        assert_eq!(validate_due_date(today, today), Ok(today));
        assert_eq!(
            validate_due_date(today + Duration::days(28), today),
            Ok(today + Duration::days(28))
        );
        assert_eq!(
            validate_due_date(today - Duration::days(1), today),
            Err(LoanRuleViolation::DateInPast)
        );
        assert_eq!(
            validate_due_date(today + Duration::days(29), today),
            Err(LoanRuleViolation::DateTooFarFuture)
        );
    }

    #[test]
    fn test_loan_limit_applies_regardless_of_overdue_count() {
        let today = today();
        let overdue = loan_due(today - Duration::days(10));

        let at_limit = vec![overdue, overdue, overdue];
        assert_eq!(
            check_eligibility(&at_limit, today),
            Err(LoanRuleViolation::BorrowLimitExceeded)
        );
        assert!(!can_borrow(&at_limit, today));
    }

    #[test]
    fn test_under_loan_limit_tolerates_one_overdue() {
        let today = today();
        let loans = vec![
            loan_due(today - Duration::days(3)),
            loan_due(today + Duration::days(7)),
        ];

        assert_eq!(check_eligibility(&loans, today), Ok(()));
        assert!(can_borrow(&loans, today));
    }

    #[test]
    fn test_more_than_one_overdue_blocks_borrowing() {
        let today = today();
        let loans = vec![
            loan_due(today - Duration::days(3)),
            loan_due(today - Duration::days(1)),
        ];

        assert_eq!(
            check_eligibility(&loans, today),
            Err(LoanRuleViolation::OverdueLimitExceeded)
        );
        assert!(!can_borrow(&loans, today));
    }

    #[test]
    fn test_loan_due_today_is_not_overdue() {
        let today = today();
        let loans = vec![loan_due(today), loan_due(today)];

        assert_eq!(check_eligibility(&loans, today), Ok(()));
    }

    #[test]
    fn test_no_loans_can_borrow() {
        assert!(can_borrow(&[], today()));
    }

    #[test]
    fn test_date_violations_attach_to_the_date_field() {
        assert_eq!(LoanRuleViolation::DateInPast.field(), Some("due_back"));
        assert_eq!(LoanRuleViolation::DateTooFarFuture.field(), Some("due_back"));
        assert_eq!(LoanRuleViolation::BorrowLimitExceeded.field(), None);
        assert_eq!(LoanRuleViolation::InstanceUnavailable.field(), None);
    }
}
