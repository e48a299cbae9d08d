//! Library handlers: books and loans

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use pulse_core::pagination::Paginated;
use pulse_core::traits::Id;
use pulse_db::library::{CreateBook, LibraryRepository, UpdateBook};
use pulse_models::library::{Book, BookLoan};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, Page};

/// GET /api/library/books?q=
pub async fn list_books(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<BookQuery>,
    page: Page,
) -> ApiResult<Json<Paginated<Book>>> {
    let repo = LibraryRepository::new(state.pool.clone());
    Ok(Json(repo.list_books(query.q.as_deref(), *page).await?))
}

/// GET /api/library/books/:id — book with availability and loan history
pub async fn get_book(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<BookDetail>> {
    let repo = LibraryRepository::new(state.pool.clone());

    let book = repo
        .find_book(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Book", id))?;
    let open_loans = repo.count_open_loans(id).await?;
    let loans = repo.list_loans(id).await?;
    let available = book.available(open_loans);

    Ok(Json(BookDetail {
        book,
        available,
        loans,
    }))
}

/// POST /api/library/books
pub async fn create_book(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(dto): Json<CreateBookRequest>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let mut errors = pulse_core::error::ValidationErrors::new();
    if dto.title.trim().is_empty() {
        errors.add("title", "is required");
    }
    if dto.copies < 1 {
        errors.add("copies", "must be at least 1");
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let repo = LibraryRepository::new(state.pool.clone());
    let book = repo
        .create_book(CreateBook {
            title: dto.title,
            author: dto.author,
            isbn: dto.isbn,
            shelf: dto.shelf,
            copies: dto.copies,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(book)))
}

/// PATCH /api/library/books/:id
pub async fn update_book(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<UpdateBookRequest>,
) -> ApiResult<Json<Book>> {
    let repo = LibraryRepository::new(state.pool.clone());
    let book = repo
        .update_book(
            id,
            UpdateBook {
                title: dto.title,
                author: dto.author,
                isbn: dto.isbn,
                shelf: dto.shelf,
                copies: dto.copies,
            },
        )
        .await?;
    Ok(Json(book))
}

/// DELETE /api/library/books/:id
pub async fn delete_book(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = LibraryRepository::new(state.pool.clone());
    repo.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/library/books/:id/loans — 409 when no copies are available
pub async fn create_loan(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<CreateLoanRequest>,
) -> ApiResult<(StatusCode, Json<BookLoan>)> {
    let repo = LibraryRepository::new(state.pool.clone());
    let borrower = dto.borrower_id.unwrap_or(user.id);
    let loan = repo.create_loan(id, borrower, dto.due_on).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// POST /api/library/loans/:id/return
pub async fn return_loan(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<BookLoan>> {
    let repo = LibraryRepository::new(state.pool.clone());
    Ok(Json(repo.return_loan(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct BookQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub available: i64,
    pub loans: Vec<BookLoan>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub shelf: Option<String>,
    #[serde(default = "default_copies")]
    pub copies: i32,
}

fn default_copies() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub shelf: Option<String>,
    pub copies: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoanRequest {
    pub borrower_id: Option<Id>,
    pub due_on: Option<NaiveDate>,
}
