use askama::Template;
use axum::{extract::Query, Extension};
use sqlx::SqlitePool;

use crate::{
    models::book::{list_books, Book, BookFilter},
    AppError,
};

#[derive(Template)]
#[template(path = "book-list.html")]
pub struct BookList {
    books: Vec<Book>,
    export_url: String,
    filtered: bool,
}

#[axum::debug_handler]
pub async fn view_book_list(
    Extension(pool): Extension<SqlitePool>,
    Query(filter): Query<BookFilter>,
) -> Result<BookList, AppError> {
    let books = list_books(&pool, filter).await?;
    Ok(BookList {
        books,
        export_url: format!("/book-list/export{}", filter.query_string()),
        filtered: filter.author.is_some() || filter.category.is_some(),
    })
}
