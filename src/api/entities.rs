use axum::{http::StatusCode, Json};
use sqlx::SqlitePool;

use crate::models::{
    entity::{self, Entity, EntityKind, NameInput},
    ModelError,
};

use super::ApiError;

pub async fn list(pool: SqlitePool, kind: EntityKind) -> Result<Json<Vec<Entity>>, ApiError> {
    Ok(Json(entity::list_entities(&pool, kind).await?))
}

pub async fn create(
    pool: SqlitePool,
    kind: EntityKind,
    input: NameInput,
) -> Result<(StatusCode, Json<Entity>), ApiError> {
    let created = entity::create_entity(&pool, kind, &input.name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get(pool: SqlitePool, kind: EntityKind, id: i64) -> Result<Json<Entity>, ApiError> {
    let found = entity::get_entity(&pool, kind, id)
        .await?
        .ok_or(ModelError::NotFound(kind.label()))?;
    Ok(Json(found))
}

pub async fn update(
    pool: SqlitePool,
    kind: EntityKind,
    id: i64,
    input: NameInput,
) -> Result<Json<Entity>, ApiError> {
    Ok(Json(entity::rename_entity(&pool, kind, id, &input.name).await?))
}

pub async fn delete(pool: SqlitePool, kind: EntityKind, id: i64) -> Result<StatusCode, ApiError> {
    entity::delete_entity(&pool, kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
