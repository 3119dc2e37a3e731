use axum::{extract::Path, http::StatusCode, Extension, Json};
use axum_extra::extract::WithRejection;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::models::{
    book::{self, Book, BookFilter, NewBook},
    entity::NameInput,
    ModelError,
};

use super::{ApiError, ApiJson, ApiPath};

/// Request body for create and update. A client-sent `id` is ignored.
#[derive(Debug, Deserialize)]
pub struct BookInput {
    title: String,
    published_date: NaiveDate,
    #[serde(default)]
    categories: Vec<NameInput>,
    #[serde(default)]
    authors: Vec<NameInput>,
}

impl From<BookInput> for NewBook {
    fn from(input: BookInput) -> Self {
        NewBook {
            title: input.title,
            published_date: input.published_date,
            authors: input.authors.into_iter().map(|a| a.name).collect(),
            categories: input.categories.into_iter().map(|c| c.name).collect(),
        }
    }
}

pub async fn list_books(Extension(pool): Extension<SqlitePool>) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(book::list_books(&pool, BookFilter::default()).await?))
}

pub async fn create_book(
    Extension(pool): Extension<SqlitePool>,
    WithRejection(Json(input), _): ApiJson<BookInput>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let created = book::create_book(&pool, &input.into()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_book(
    Extension(pool): Extension<SqlitePool>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> Result<Json<Book>, ApiError> {
    let found = book::get_book(&pool, id)
        .await?
        .ok_or(ModelError::NotFound("book"))?;
    Ok(Json(found))
}

pub async fn update_book(
    Extension(pool): Extension<SqlitePool>,
    WithRejection(Path(id), _): ApiPath<i64>,
    WithRejection(Json(input), _): ApiJson<BookInput>,
) -> Result<Json<Book>, ApiError> {
    Ok(Json(book::update_book(&pool, id, &input.into()).await?))
}

pub async fn delete_book(
    Extension(pool): Extension<SqlitePool>,
    WithRejection(Path(id), _): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    book::delete_book(&pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
