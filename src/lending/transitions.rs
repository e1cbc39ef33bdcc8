//! Loan state transitions
//!
//! Pure transitions over a `BookInstance` value. Every rule is checked
//! before the instance is touched, so a failed call leaves it unchanged.

use chrono::NaiveDate;

use crate::models::book_instance::{BookInstance, LoanStatus};

use super::rules::{self, ActiveLoan, LoanRuleViolation};

/// Lend a copy to a borrower.
///
/// Checks, in order: the copy is available, the borrower is under the
/// loan and overdue limits, the due date falls inside the allowed window.
pub fn apply_borrow(
    instance: &mut BookInstance,
    borrower_id: i32,
    borrower_loans: &[ActiveLoan],
    due_back: NaiveDate,
    today: NaiveDate,
) -> Result<(), LoanRuleViolation> {
    rules::validate_borrow_precondition(instance)?;
    rules::check_eligibility(borrower_loans, today)?;
    let due_back = rules::validate_due_date(due_back, today)?;

    instance.status = LoanStatus::Borrowed;
    instance.borrower_id = Some(borrower_id);
    instance.due_back = Some(due_back);
    Ok(())
}

/// Move the scheduled return date of a copy.
///
/// Only the date window is checked: renewal does not require the copy to
/// be on loan, and it never changes the status or the borrower.
pub fn apply_renewal(
    instance: &mut BookInstance,
    due_back: NaiveDate,
    today: NaiveDate,
) -> Result<(), LoanRuleViolation> {
    let due_back = rules::validate_due_date(due_back, today)?;

    instance.due_back = Some(due_back);
    Ok(())
}

/// Take a copy back and make it available again.
pub fn apply_return(instance: &mut BookInstance) -> Result<(), LoanRuleViolation> {
    rules::validate_return_precondition(instance)?;

    instance.status = LoanStatus::Available;
    instance.borrower_id = None;
    instance.due_back = None;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn copy_with_status(status: LoanStatus) -> BookInstance {
        BookInstance {
            id: Uuid::new_v4(),
            book_id: Some(1),
            imprint: "Planeta DeAgostini, 2001".to_string(),
            language_id: Some(1),
            status,
            due_back: None,
            borrower_id: None,
        }
    }

    fn available_copy() -> BookInstance {
        copy_with_status(LoanStatus::Available)
    }

    fn assert_untouched(instance: &BookInstance, original: &BookInstance) {
        assert_eq!(instance.status, original.status);
        assert_eq!(instance.borrower_id, original.borrower_id);
        assert_eq!(instance.due_back, original.due_back);
    }

    #[test]
    fn test_borrow_due_today_with_no_loans() {
        let today = today();
        let mut copy = available_copy();

        assert_eq!(apply_borrow(&mut copy, 7, &[], today, today), Ok(()));
        assert_eq!(copy.status, LoanStatus::Borrowed);
        assert_eq!(copy.borrower_id, Some(7));
        assert_eq!(copy.due_back, Some(today));
    }

    #[test]
    fn test_borrow_accepts_the_latest_allowed_date() {
        let today = today();
        let mut copy = available_copy();
        let latest = today + Duration::days(28);

        assert_eq!(apply_borrow(&mut copy, 7, &[], latest, today), Ok(()));
        assert_eq!(copy.due_back, Some(latest));
    }

    #[test]
    fn test_borrow_rejects_copy_that_is_not_available() {
        let today = today();

        for status in [
            LoanStatus::Maintenance,
            LoanStatus::Borrowed,
            LoanStatus::Reserved,
        ] {
            let mut copy = copy_with_status(status);
            let before = copy.clone();

            assert_eq!(
                apply_borrow(&mut copy, 7, &[], today, today),
                Err(LoanRuleViolation::InstanceUnavailable)
            );
            assert_untouched(&copy, &before);
        }
    }

    #[test]
    fn test_borrow_rejects_borrower_at_loan_limit() {
        let today = today();
        let mut copy = available_copy();
        let before = copy.clone();
        let loans = vec![
            ActiveLoan {
                due_back: Some(today + Duration::days(7))
            };
            3
        ];

        assert_eq!(
            apply_borrow(&mut copy, 7, &loans, today, today),
            Err(LoanRuleViolation::BorrowLimitExceeded)
        );
        assert_untouched(&copy, &before);
    }

    #[test]
    fn test_borrow_rejects_borrower_with_two_overdue_loans() {
        let today = today();
        let mut copy = available_copy();
        let before = copy.clone();
        let loans = vec![
            ActiveLoan {
                due_back: Some(today - Duration::days(2))
            };
            2
        ];

        assert_eq!(
            apply_borrow(&mut copy, 7, &loans, today, today),
            Err(LoanRuleViolation::OverdueLimitExceeded)
        );
        assert_untouched(&copy, &before);
    }

    #[test]
    fn test_borrow_and_renewal_reject_a_past_date() {
        let today = today();
        let yesterday = today - Duration::days(1);

        let mut copy = available_copy();
        let before = copy.clone();
        assert_eq!(
            apply_borrow(&mut copy, 7, &[], yesterday, today),
            Err(LoanRuleViolation::DateInPast)
        );
        assert_untouched(&copy, &before);

        let mut copy = copy_with_status(LoanStatus::Borrowed);
        let before = copy.clone();
        assert_eq!(
            apply_renewal(&mut copy, yesterday, today),
            Err(LoanRuleViolation::DateInPast)
        );
        assert_untouched(&copy, &before);
    }

    #[test]
    fn test_borrow_and_renewal_reject_a_date_past_the_window() {
        let today = today();
        let too_far = today + Duration::days(29);

        let mut copy = available_copy();
        assert_eq!(
            apply_borrow(&mut copy, 7, &[], too_far, today),
            Err(LoanRuleViolation::DateTooFarFuture)
        );

        let mut copy = copy_with_status(LoanStatus::Borrowed);
        assert_eq!(
            apply_renewal(&mut copy, too_far, today),
            Err(LoanRuleViolation::DateTooFarFuture)
        );
    }

    #[test]
    fn test_renewal_ignores_the_copy_status() {
        // Renewal moves the date for a copy in any state, even one sitting
        // in maintenance, and leaves the rest of the record alone.
        let today = today();
        let new_date = today + Duration::weeks(3);

        for status in [
            LoanStatus::Maintenance,
            LoanStatus::Borrowed,
            LoanStatus::Available,
            LoanStatus::Reserved,
        ] {
            let mut copy = copy_with_status(status);
            assert_eq!(apply_renewal(&mut copy, new_date, today), Ok(()));
            assert_eq!(copy.due_back, Some(new_date));
            assert_eq!(copy.status, status);
            assert_eq!(copy.borrower_id, None);
        }
    }

    #[test]
    fn test_return_rejects_copy_not_on_loan() {
        for status in [
            LoanStatus::Maintenance,
            LoanStatus::Available,
            LoanStatus::Reserved,
        ] {
            let mut copy = copy_with_status(status);
            let before = copy.clone();

            assert_eq!(
                apply_return(&mut copy),
                Err(LoanRuleViolation::InstanceNotBorrowed)
            );
            assert_untouched(&copy, &before);
        }
    }

    #[test]
    fn test_borrow_then_return_round_trip() {
        let today = today();
        let mut copy = available_copy();

        assert_eq!(
            apply_borrow(&mut copy, 7, &[], today + Duration::weeks(2), today),
            Ok(())
        );
        assert_eq!(apply_return(&mut copy), Ok(()));

        assert_eq!(copy.status, LoanStatus::Available);
        assert_eq!(copy.borrower_id, None);
        assert_eq!(copy.due_back, None);
    }
}
