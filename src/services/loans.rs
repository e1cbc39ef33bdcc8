//! Circulation service
//!
//! Orchestrates the borrow / renew / return flows: load the copy, run the
//! lending rules, persist the new state. Rule checks live in
//! [`crate::lending`]; this service owns the storage round trips.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    lending::{rules, transitions, ActiveLoan},
    models::{book_instance::BookInstanceDetails, PageQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Lend a copy to the requesting user.
    ///
    /// When no due date is supplied, the default loan length of three weeks
    /// is proposed and then checked like any caller-supplied date.
    pub async fn borrow(
        &self,
        instance_id: Uuid,
        user_id: i32,
        due_back: Option<NaiveDate>,
    ) -> AppResult<BookInstanceDetails> {
        let mut instance = self.repository.instances.get_by_id(instance_id).await?;

        let today = Utc::now().date_naive();
        let due_back = due_back.unwrap_or_else(|| rules::default_due_date(today));

        let borrower_loans: Vec<ActiveLoan> = self
            .repository
            .instances
            .get_loans_for(user_id)
            .await?
            .iter()
            .map(ActiveLoan::from)
            .collect();

        transitions::apply_borrow(&mut instance, user_id, &borrower_loans, due_back, today)?;

        self.repository.instances.save_circulation(&instance).await?;

        tracing::info!(
            "Copy {} borrowed by user {} until {}",
            instance.id,
            user_id,
            due_back
        );

        self.repository.instances.get_details(instance_id).await
    }

    /// Return a copy. Allowed for the current borrower and for librarians.
    pub async fn return_copy(
        &self,
        instance_id: Uuid,
        user_id: i32,
        is_librarian: bool,
    ) -> AppResult<BookInstanceDetails> {
        let mut instance = self.repository.instances.get_by_id(instance_id).await?;

        if !is_librarian && instance.borrower_id != Some(user_id) {
            return Err(AppError::Authorization(
                "Only the borrower or a librarian can return this copy".to_string(),
            ));
        }

        transitions::apply_return(&mut instance)?;

        self.repository.instances.save_circulation(&instance).await?;

        tracing::info!("Copy {} returned by user {}", instance.id, user_id);

        self.repository.instances.get_details(instance_id).await
    }

    /// Move the due date of a copy. The caller is expected to hold the
    /// "mark returned" grant; no status precondition applies.
    pub async fn renew(
        &self,
        instance_id: Uuid,
        due_back: Option<NaiveDate>,
    ) -> AppResult<BookInstanceDetails> {
        let mut instance = self.repository.instances.get_by_id(instance_id).await?;

        let today = Utc::now().date_naive();
        let due_back = due_back.unwrap_or_else(|| rules::default_due_date(today));

        transitions::apply_renewal(&mut instance, due_back, today)?;

        self.repository.instances.save_circulation(&instance).await?;

        tracing::info!("Copy {} renewed until {}", instance.id, due_back);

        self.repository.instances.get_details(instance_id).await
    }

    /// Copies currently on loan to a user, ordered by due date
    pub async fn get_user_loans(
        &self,
        user_id: i32,
        query: &PageQuery,
    ) -> AppResult<(Vec<BookInstanceDetails>, i64)> {
        self.repository.instances.list_borrowed_by(user_id, query).await
    }

    /// All copies on loan, ordered by due date
    pub async fn get_all_loans(
        &self,
        query: &PageQuery,
    ) -> AppResult<(Vec<BookInstanceDetails>, i64)> {
        self.repository.instances.list_all_borrowed(query).await
    }
}
