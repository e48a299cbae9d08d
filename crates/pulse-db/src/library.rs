//! Library repositories: books and loans
//!
//! Loan creation counts open loans inside the transaction so available
//! copies can never go negative, even under concurrent borrowing.

use chrono::NaiveDate;
use pulse_core::pagination::{Paginated, Pagination};
use pulse_core::traits::Id;
use pulse_models::library::{Book, BookLoan};
use sqlx::PgPool;

use crate::repository::{RepositoryError, RepositoryResult};

const BOOK_COLUMNS: &str = "id, title, author, isbn, shelf, copies, created_at, updated_at";
const LOAN_COLUMNS: &str = "id, book_id, borrower_id, loaned_on, due_on, returned_on";

#[derive(Debug, Clone)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub shelf: Option<String>,
    pub copies: i32,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub shelf: Option<String>,
    pub copies: Option<i32>,
}

pub struct LibraryRepository {
    pool: PgPool,
}

impl LibraryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_book(&self, id: Id) -> RepositoryResult<Option<Book>> {
        let row = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_books(
        &self,
        query: Option<&str>,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<Book>> {
        let pattern = query.map(|q| format!("%{}%", q));

        let items = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books \
             WHERE ($1::text IS NULL OR title ILIKE $1 OR author ILIKE $1) \
             ORDER BY title ASC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(pagination.limit())
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM books \
             WHERE ($1::text IS NULL OR title ILIKE $1 OR author ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(Paginated::new(items, total, pagination))
    }

    pub async fn create_book(&self, dto: CreateBook) -> RepositoryResult<Book> {
        let row = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books (title, author, isbn, shelf, copies, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) \
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(&dto.author)
        .bind(&dto.isbn)
        .bind(&dto.shelf)
        .bind(dto.copies)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_book(&self, id: Id, dto: UpdateBook) -> RepositoryResult<Book> {
        let row = sqlx::query_as::<_, Book>(&format!(
            "UPDATE books SET \
                 title = COALESCE($1, title), \
                 author = COALESCE($2, author), \
                 isbn = COALESCE($3, isbn), \
                 shelf = COALESCE($4, shelf), \
                 copies = COALESCE($5, copies), \
                 updated_at = NOW() \
             WHERE id = $6 \
             RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(&dto.author)
        .bind(&dto.isbn)
        .bind(&dto.shelf)
        .bind(dto.copies)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Book", id))?;

        Ok(row)
    }

    pub async fn delete_book(&self, id: Id) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM book_loans WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Book", id));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn count_open_loans(&self, book_id: Id) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM book_loans WHERE book_id = $1 AND returned_on IS NULL",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Borrow a copy. The book row is locked while open loans are counted
    /// so two concurrent borrows cannot both take the last copy.
    pub async fn create_loan(
        &self,
        book_id: Id,
        borrower_id: Id,
        due_on: Option<NaiveDate>,
    ) -> RepositoryResult<BookLoan> {
        let mut tx = self.pool.begin().await?;

        let copies = sqlx::query_scalar::<_, i32>(
            "SELECT copies FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Book", book_id))?;

        let open = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM book_loans WHERE book_id = $1 AND returned_on IS NULL",
        )
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        if open >= i64::from(copies) {
            return Err(RepositoryError::Conflict(format!(
                "No copies of book {} available",
                book_id
            )));
        }

        let loan = sqlx::query_as::<_, BookLoan>(&format!(
            "INSERT INTO book_loans (book_id, borrower_id, loaned_on, due_on) \
             VALUES ($1, $2, CURRENT_DATE, $3) \
             RETURNING {LOAN_COLUMNS}"
        ))
        .bind(book_id)
        .bind(borrower_id)
        .bind(due_on)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(loan)
    }

    pub async fn return_loan(&self, loan_id: Id) -> RepositoryResult<BookLoan> {
        let row = sqlx::query_as::<_, BookLoan>(&format!(
            "UPDATE book_loans SET returned_on = CURRENT_DATE \
             WHERE id = $1 AND returned_on IS NULL \
             RETURNING {LOAN_COLUMNS}"
        ))
        .bind(loan_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            RepositoryError::Conflict(format!("Loan {} is missing or already returned", loan_id))
        })?;

        Ok(row)
    }

    pub async fn list_loans(&self, book_id: Id) -> RepositoryResult<Vec<BookLoan>> {
        let rows = sqlx::query_as::<_, BookLoan>(&format!(
            "SELECT {LOAN_COLUMNS} FROM book_loans WHERE book_id = $1 ORDER BY loaned_on DESC"
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
