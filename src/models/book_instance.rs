//! Book instance (loanable copy) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::enums::LoanStatus;

/// A specific physical copy of a book that can be borrowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    /// Unique ID for this particular copy across the whole library
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

impl BookInstance {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        is_overdue(self.due_back, today)
    }
}

/// A copy is overdue when it has a due date strictly before today
pub fn is_overdue(due_back: Option<NaiveDate>, today: NaiveDate) -> bool {
    matches!(due_back, Some(due) if due < today)
}

/// Natural copy order: id, status, due date
pub fn instance_order(a: &BookInstance, b: &BookInstance) -> std::cmp::Ordering {
    (a.id, a.status.code(), a.due_back).cmp(&(b.id, b.status.code(), b.due_back))
}

/// Loan list order: due date ascending (undated last), then id
pub fn loan_order(a: &BookInstance, b: &BookInstance) -> std::cmp::Ordering {
    let key = |i: &BookInstance| (i.due_back.is_none(), i.due_back, i.id);
    key(a).cmp(&key(b))
}

/// Copy joined with the titles needed to display it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInstanceRecord {
    pub instance: BookInstance,
    pub book_title: Option<String>,
    pub borrower_username: Option<String>,
}

impl std::fmt::Display for BookInstanceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.book_title {
            Some(title) => write!(f, "{} ({})", self.instance.id, title),
            None => write!(f, "{}", self.instance.id),
        }
    }
}

/// Copy as returned by loan lists, detail pages and the renewal form
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookInstanceView {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub book_title: Option<String>,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
    pub borrower_username: Option<String>,
    pub is_overdue: bool,
}

impl BookInstanceView {
    pub fn new(record: BookInstanceRecord, today: NaiveDate) -> Self {
        let is_overdue = record.instance.is_overdue(today);
        Self {
            id: record.instance.id,
            book_id: record.instance.book_id,
            book_title: record.book_title,
            due_back: record.instance.due_back,
            status: record.instance.status,
            borrower_id: record.instance.borrower_id,
            borrower_username: record.borrower_username,
            is_overdue,
        }
    }
}

/// Create or update copy request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BookInstanceInput {
    /// Generated when omitted on create; ignored on update
    pub id: Option<Uuid>,
    pub book_id: Option<i32>,
    pub due_back: Option<NaiveDate>,
    #[serde(default)]
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}
