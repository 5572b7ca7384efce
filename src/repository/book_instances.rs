//! Book instances (copies) repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgRow, Pool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{BookInstance, BookInstanceInput, BookInstanceRecord, LoanStatus},
};

use super::{BookInstanceRepository, DueBackBound, InstanceFilter, InstanceOrder, PageRequest};

const INSTANCE_COLUMNS: &str = "id, book_id, due_back, status, borrower_id";

const RECORD_SELECT: &str = r#"
    SELECT bi.id, bi.book_id, bi.due_back, bi.status, bi.borrower_id,
           b.title AS book_title, u.username AS borrower_username
    FROM book_instances bi
    LEFT JOIN books b ON b.id = bi.book_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

fn record_from_row(row: &PgRow) -> Result<BookInstanceRecord, sqlx::Error> {
    Ok(BookInstanceRecord {
        instance: BookInstance {
            id: row.try_get("id")?,
            book_id: row.try_get("book_id")?,
            due_back: row.try_get("due_back")?,
            status: row.try_get("status")?,
            borrower_id: row.try_get("borrower_id")?,
        },
        book_title: row.try_get("book_title")?,
        borrower_username: row.try_get("borrower_username")?,
    })
}

fn push_filter<'a>(query: &mut QueryBuilder<'a, Postgres>, filter: &InstanceFilter) {
    query.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        query.push(" AND bi.status = ").push_bind(status);
    }
    if let Some(borrower_id) = filter.borrower_id {
        query.push(" AND bi.borrower_id = ").push_bind(borrower_id);
    }
    match filter.due_back {
        Some(DueBackBound::Between { from, until }) => {
            query
                .push(" AND bi.due_back >= ")
                .push_bind(from)
                .push(" AND bi.due_back < ")
                .push_bind(until);
        }
        Some(DueBackBound::IsNull) => {
            query.push(" AND bi.due_back IS NULL");
        }
        Some(DueBackBound::NotNull) => {
            query.push(" AND bi.due_back IS NOT NULL");
        }
        None => {}
    }
}

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookInstanceRepository for BookInstancesRepository {
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<BookInstanceRecord>> {
        let row = sqlx::query(&format!("{} WHERE bi.id = $1", RECORD_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(record_from_row).transpose()?)
    }

    async fn list_by_book(&self, book_id: i32) -> AppResult<Vec<BookInstanceRecord>> {
        let rows = sqlx::query(&format!(
            "{} WHERE bi.book_id = $1 ORDER BY bi.id, bi.status, bi.due_back",
            RECORD_SELECT
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn list(
        &self,
        filter: &InstanceFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<BookInstanceRecord>, i64)> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM book_instances bi");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut query = QueryBuilder::<Postgres>::new(RECORD_SELECT);
        push_filter(&mut query, filter);
        query.push(match filter.order {
            InstanceOrder::Natural => " ORDER BY bi.id, bi.status, bi.due_back",
            InstanceOrder::DueBack => " ORDER BY bi.due_back ASC NULLS LAST, bi.id",
        });
        query
            .push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = query.build().fetch_all(&self.pool).await?;
        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((records, total))
    }

    async fn create(&self, input: &BookInstanceInput) -> AppResult<BookInstance> {
        let instance = sqlx::query_as::<_, BookInstance>(&format!(
            r#"
            INSERT INTO book_instances (id, book_id, due_back, status, borrower_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            INSTANCE_COLUMNS
        ))
        .bind(input.id.unwrap_or_else(Uuid::new_v4))
        .bind(input.book_id)
        .bind(input.due_back)
        .bind(input.status)
        .bind(input.borrower_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(instance)
    }

    async fn update(&self, id: Uuid, input: &BookInstanceInput) -> AppResult<Option<BookInstance>> {
        let instance = sqlx::query_as::<_, BookInstance>(&format!(
            r#"
            UPDATE book_instances
            SET book_id = $1, due_back = $2, status = $3, borrower_id = $4
            WHERE id = $5
            RETURNING {}
            "#,
            INSTANCE_COLUMNS
        ))
        .bind(input.book_id)
        .bind(input.due_back)
        .bind(input.status)
        .bind(input.borrower_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(instance)
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<Option<BookInstance>> {
        let instance = sqlx::query_as::<_, BookInstance>(&format!(
            "UPDATE book_instances SET due_back = $1 WHERE id = $2 RETURNING {}",
            INSTANCE_COLUMNS
        ))
        .bind(due_back)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(instance)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
