use askama::Template;
use axum::{debug_handler, extract::Path, Extension};
use sqlx::SqlitePool;

use crate::{
    models::{
        book::{get_book, Book},
        ModelError,
    },
    AppError,
};

#[derive(Template)]
#[template(path = "book-details.html")]
pub struct BookDetailsTemplate {
    book: Book,
}

#[debug_handler]
pub async fn view_book_details(
    Extension(pool): Extension<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<BookDetailsTemplate, AppError> {
    let book = match get_book(&pool, id).await? {
        Some(book) => book,
        None => return Err(ModelError::NotFound("book").into()),
    };
    Ok(BookDetailsTemplate { book })
}
