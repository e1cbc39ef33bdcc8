//! Loan lifecycle rules and transitions
//!
//! This module holds the circulation core: the due-date window, the borrower
//! eligibility checks, and the state transitions they guard. Everything here
//! is pure; callers load the copy and the borrower's outstanding loans and
//! pass them in.

pub mod rules;
pub mod transitions;

pub use rules::{ActiveLoan, LoanRuleViolation};
