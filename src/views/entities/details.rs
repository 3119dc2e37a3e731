use askama::Template;
use sqlx::SqlitePool;

use crate::{
    models::{
        book::{list_books, Book},
        entity::{get_entity, rename_entity, Entity, EntityKind, NameInput},
        ModelError,
    },
    views::{outcome_message, Message, UPDATE_SUCCESSFUL},
    AppError,
};

use super::book_filter;

#[derive(Template)]
#[template(path = "entity-details.html")]
pub struct EntityDetails {
    kind: EntityKind,
    entity: Entity,
    books: Vec<Book>,
    messages: Vec<Message>,
}

pub async fn view_entity_details(
    pool: SqlitePool,
    kind: EntityKind,
    id: i64,
) -> Result<EntityDetails, AppError> {
    let entity = get_entity(&pool, kind, id)
        .await?
        .ok_or(ModelError::NotFound(kind.label()))?;
    let books = list_books(&pool, book_filter(kind, id)).await?;
    Ok(EntityDetails {
        kind,
        entity,
        books,
        messages: Vec::new(),
    })
}

pub async fn post_entity_details(
    pool: SqlitePool,
    kind: EntityKind,
    id: i64,
    input: NameInput,
) -> Result<EntityDetails, AppError> {
    let message = outcome_message(
        rename_entity(&pool, kind, id, &input.name).await,
        UPDATE_SUCCESSFUL,
    )?;
    let mut page = view_entity_details(pool, kind, id).await?;
    page.messages.push(message);
    Ok(page)
}
