//! Loan management service: borrowed-copy lists and due-date renewal

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    forms::{RenewBookForm, RenewalFormView},
    models::{BookInstance, BookInstanceView},
    repository::{InstanceFilter, PageRequest, Repository},
};

use super::{Page, PAGE_SIZE};

/// Result of a renewal submission
#[derive(Debug, Clone)]
pub enum RenewOutcome {
    /// Due date updated
    Renewed(BookInstance),
    /// Submitted date refused; the form comes back with its error
    Rejected(RenewalFormView),
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl LoansService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Copies on loan to one user, soonest due first
    pub async fn borrowed_by(&self, user_id: i32, page: i64) -> AppResult<Page<BookInstanceView>> {
        self.on_loan(Some(user_id), page).await
    }

    /// Every copy on loan, soonest due first
    pub async fn all_borrowed(&self, page: i64) -> AppResult<Page<BookInstanceView>> {
        self.on_loan(None, page).await
    }

    async fn on_loan(&self, borrower_id: Option<i32>, page: i64) -> AppResult<Page<BookInstanceView>> {
        let request = PageRequest::new(page, PAGE_SIZE);
        let (records, total) = self
            .repository
            .book_instances
            .list(&InstanceFilter::on_loan(borrower_id), request)
            .await?;

        let today = self.clock.today();
        Ok(Page::new(records, total, request)?.map(|record| BookInstanceView::new(record, today)))
    }

    async fn instance_view(&self, id: Uuid) -> AppResult<BookInstanceView> {
        let record = self
            .repository
            .book_instances
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))?;
        Ok(BookInstanceView::new(record, self.clock.today()))
    }

    /// Renewal form pre-filled with the default date
    pub async fn renewal_form(&self, id: Uuid) -> AppResult<RenewalFormView> {
        let view = self.instance_view(id).await?;
        Ok(RenewalFormView::initial(view, self.clock.today()))
    }

    /// Validate the submitted date and store it as the new `due_back`.
    ///
    /// Only the due date changes; status and borrower are left as they are.
    pub async fn renew(&self, id: Uuid, form: RenewBookForm) -> AppResult<RenewOutcome> {
        let view = self.instance_view(id).await?;
        let today = self.clock.today();

        let due_back = match form.clean(today) {
            Ok(date) => date,
            Err(error) => {
                tracing::debug!("Renewal of {} rejected: {}", id, error);
                return Ok(RenewOutcome::Rejected(RenewalFormView::rejected(view, form, error)));
            }
        };

        let instance = self
            .repository
            .book_instances
            .set_due_back(id, due_back)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))?;

        tracing::info!("Book instance {} renewed until {}", id, due_back);
        Ok(RenewOutcome::Renewed(instance))
    }
}
