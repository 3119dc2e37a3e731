use askama::Template;
use sqlx::SqlitePool;

use crate::{
    models::entity::{create_entity, list_entities, Entity, EntityKind, NameInput},
    views::{outcome_message, Message, SUBMISSION_SUCCESSFUL},
    AppError,
};

#[derive(Template)]
#[template(path = "entity-register.html")]
pub struct EntityRegister {
    kind: EntityKind,
    entities: Vec<Entity>,
    messages: Vec<Message>,
}

pub async fn view_entity_register(
    pool: SqlitePool,
    kind: EntityKind,
) -> Result<EntityRegister, AppError> {
    let entities = list_entities(&pool, kind).await?;
    Ok(EntityRegister {
        kind,
        entities,
        messages: Vec::new(),
    })
}

pub async fn post_entity_register(
    pool: SqlitePool,
    kind: EntityKind,
    input: NameInput,
) -> Result<EntityRegister, AppError> {
    let message = outcome_message(
        create_entity(&pool, kind, &input.name).await,
        SUBMISSION_SUCCESSFUL,
    )?;
    let mut page = view_entity_register(pool, kind).await?;
    page.messages.push(message);
    Ok(page)
}
