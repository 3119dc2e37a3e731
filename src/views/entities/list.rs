use askama::Template;
use sqlx::SqlitePool;

use crate::{
    models::entity::{list_entities, Entity, EntityKind},
    AppError,
};

#[derive(Template)]
#[template(path = "entity-list.html")]
pub struct EntityList {
    kind: EntityKind,
    entities: Vec<Entity>,
}

pub async fn view_entity_list(pool: SqlitePool, kind: EntityKind) -> Result<EntityList, AppError> {
    let entities = list_entities(&pool, kind).await?;
    Ok(EntityList { kind, entities })
}
