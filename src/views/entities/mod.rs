use axum::{
    extract::Path,
    routing::{get, MethodRouter},
    Extension,
};
use axum_extra::extract::Form;
use sqlx::SqlitePool;

use crate::models::{
    book::BookFilter,
    entity::{EntityKind, NameInput},
};

mod details;
mod list;
mod register;

/// Books linked to one author or category.
pub fn book_filter(kind: EntityKind, id: i64) -> BookFilter {
    match kind {
        EntityKind::Author => BookFilter {
            author: Some(id),
            category: None,
        },
        EntityKind::Category => BookFilter {
            author: None,
            category: Some(id),
        },
    }
}

pub fn list_route(kind: EntityKind) -> MethodRouter {
    get(move |Extension(pool): Extension<SqlitePool>| list::view_entity_list(pool, kind))
}

pub fn details_route(kind: EntityKind) -> MethodRouter {
    get(
        move |Extension(pool): Extension<SqlitePool>, Path(id): Path<i64>| {
            details::view_entity_details(pool, kind, id)
        },
    )
    .post(
        move |Extension(pool): Extension<SqlitePool>,
              Path(id): Path<i64>,
              Form(input): Form<NameInput>| {
            details::post_entity_details(pool, kind, id, input)
        },
    )
}

pub fn register_route(kind: EntityKind) -> MethodRouter {
    get(move |Extension(pool): Extension<SqlitePool>| register::view_entity_register(pool, kind))
        .post(
            move |Extension(pool): Extension<SqlitePool>, Form(input): Form<NameInput>| {
                register::post_entity_register(pool, kind, input)
            },
        )
}
