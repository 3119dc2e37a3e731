use axum::{
    extract::Query,
    http::header,
    response::IntoResponse,
    Extension,
};
use sqlx::SqlitePool;

use crate::{
    models::book::{list_books, BookFilter},
    services::csv_export::write_books_csv,
    AppError,
};

#[axum::debug_handler]
pub async fn download_book_csv(
    Extension(pool): Extension<SqlitePool>,
    Query(filter): Query<BookFilter>,
) -> Result<impl IntoResponse, AppError> {
    let books = list_books(&pool, filter).await?;
    let csv = write_books_csv(&books)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"books.csv\""),
        ],
        csv,
    ))
}
