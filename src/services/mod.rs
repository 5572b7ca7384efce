//! Business logic services

pub mod admin;
pub mod catalog;
pub mod loans;

#[cfg(test)]
pub(crate) mod fixtures;

use std::sync::Arc;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    repository::{PageRequest, Repository},
};

/// Page size of public lists
pub const PAGE_SIZE: i64 = 10;

/// Page size of admin change lists
pub const ADMIN_PAGE_SIZE: i64 = 100;

/// One page of results with the figures needed to navigate
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl<T> Page<T> {
    /// Fetched rows become a page, provided the page exists.
    ///
    /// Page 1 always exists, even for an empty list.
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> AppResult<Self> {
        if request.page < 1 || request.page > num_pages(total, request.per_page) {
            return Err(AppError::NotFound(format!("Invalid page ({})", request.page)));
        }
        Ok(Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
        })
    }

    pub fn num_pages(&self) -> i64 {
        num_pages(self.total, self.per_page)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

fn num_pages(total: i64, per_page: i64) -> i64 {
    if total <= 0 || per_page <= 0 {
        1
    } else {
        (total + per_page - 1) / per_page
    }
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub admin: admin::AdminService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        let catalog = catalog::CatalogService::new(repository.clone(), clock.clone());
        Self {
            loans: loans::LoansService::new(repository.clone(), clock.clone()),
            admin: admin::AdminService::new(repository, clock, catalog.clone()),
            catalog,
        }
    }
}
